//! Image type with physical metadata.
//!
//! This module provides the Image struct which represents medical images
//! with tensor data and physical space metadata (origin, spacing, direction).

use burn::tensor::{Tensor, TensorData};
use burn::tensor::backend::Backend;
use crate::error::{PreprocessError, Result};
use crate::image::ImageMetadata;
use crate::spatial::{Point, Spacing, Direction};

/// Medical image with physical metadata.
///
/// The Image type combines tensor data with physical space metadata that
/// describes how image indices map to physical coordinates.
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) for tensor operations
/// * `D` - The dimensionality of the image (2 or 3)
///
/// # Axis Order
/// Tensor axes are stored slowest-first: `[Z, Y, X]` for volumes and
/// `[Y, X]` for slices. Origin, spacing and direction are indexed in
/// physical `(x, y, z)` order.
///
/// # Examples
/// ```rust
/// use winsor_core::Image;
/// use winsor_core::spatial::{Point3, Spacing3, Direction3};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 3>::zeros([10, 10, 10], &device);
/// let origin = Point3::new([0.0, 0.0, 0.0]);
/// let spacing = Spacing3::new([1.0, 1.0, 1.0]);
/// let direction = Direction3::identity();
/// let image = Image::new(data, origin, spacing, direction);
/// assert_eq!(image.shape(), [10, 10, 10]);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    /// The voxel data.
    data: Tensor<B, D>,
    /// Physical coordinate of the first voxel (index 0,0,0).
    origin: Point<D>,
    /// Physical distance between voxels along each axis.
    spacing: Spacing<D>,
    /// Orientation of the image axes.
    direction: Direction<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image with the given data and metadata.
    ///
    /// # Arguments
    /// * `data` - The image data as a tensor
    /// * `origin` - Physical coordinate of the first voxel
    /// * `spacing` - Physical distance between voxels along each axis
    /// * `direction` - Orientation matrix of the image axes
    pub fn new(
        data: Tensor<B, D>,
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
    ) -> Self {
        Self {
            data,
            origin,
            spacing,
            direction,
        }
    }

    /// Create an image from data and a metadata bundle.
    pub fn from_metadata(data: Tensor<B, D>, metadata: ImageMetadata<D>) -> Self {
        Self::new(
            data,
            *metadata.origin(),
            *metadata.spacing(),
            *metadata.direction(),
        )
    }

    /// Create an image from a flat voxel buffer laid out slowest-axis first.
    ///
    /// # Arguments
    /// * `voxels` - Row-major voxel values, `shape.iter().product()` long
    /// * `shape` - Tensor shape, e.g. `[Z, Y, X]`
    /// * `metadata` - Physical metadata of the image
    /// * `device` - Device to allocate the tensor on
    pub fn from_voxels(
        voxels: Vec<f32>,
        shape: [usize; D],
        metadata: ImageMetadata<D>,
        device: &B::Device,
    ) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if voxels.len() != expected {
            return Err(PreprocessError::tensor_data(format!(
                "{} voxels do not fill shape {:?}",
                voxels.len(),
                shape
            )));
        }
        let data = Tensor::<B, D>::from_data(TensorData::new(voxels, shape), device);
        Ok(Self::from_metadata(data, metadata))
    }

    /// Get the image data tensor.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Get the origin (physical coordinate of first voxel).
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing (physical distance between voxels).
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction (orientation matrix).
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Physical metadata of the image.
    pub fn metadata(&self) -> ImageMetadata<D> {
        ImageMetadata::new(self.origin, self.spacing, self.direction)
    }

    /// Get the image shape as an array.
    pub fn shape(&self) -> [usize; D] {
        self.data.dims()
    }

    /// New image with `data` and this image's metadata.
    pub fn with_data(&self, data: Tensor<B, D>) -> Self {
        Self::new(data, self.origin, self.spacing, self.direction)
    }

    /// Copy the voxel values out as a flat `f32` buffer, slowest axis first.
    pub fn to_voxels(&self) -> Result<Vec<f32>> {
        self.data
            .to_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| PreprocessError::tensor_data(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type Backend = NdArray<f32>;
    type Point3 = Point<3>;
    type Spacing3 = Spacing<3>;
    type Direction3 = Direction<3>;

    #[test]
    fn test_image_creation() {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::zeros([4, 5, 6], &device);
        let origin = Point3::new([1.0, 2.0, 3.0]);
        let spacing = Spacing3::new([0.5, 1.0, 2.0]);
        let direction = Direction3::identity();

        let image = Image::new(data, origin, spacing, direction);

        assert_eq!(image.shape(), [4, 5, 6]);
        assert_eq!(image.origin(), &origin);
        assert_eq!(image.spacing(), &spacing);
        assert_eq!(image.direction(), &direction);
    }

    #[test]
    fn test_from_voxels_preserves_order() {
        let device = Default::default();
        let voxels: Vec<f32> = (0..6).map(|v| v as f32).collect();
        let image = Image::<Backend, 2>::from_voxels(
            voxels.clone(),
            [2, 3],
            ImageMetadata::default(),
            &device,
        )
        .unwrap();

        assert_eq!(image.shape(), [2, 3]);
        assert_eq!(image.to_voxels().unwrap(), voxels);
    }

    #[test]
    fn test_from_voxels_rejects_wrong_length() {
        let device = Default::default();
        let result = Image::<Backend, 2>::from_voxels(
            vec![0.0; 5],
            [2, 3],
            ImageMetadata::default(),
            &device,
        );
        assert!(matches!(result, Err(PreprocessError::TensorData(_))));
    }

    #[test]
    fn test_with_data_keeps_metadata() {
        let device = Default::default();
        let metadata = ImageMetadata::new(
            Point3::new([10.0, 20.0, 30.0]),
            Spacing3::new([2.0, 2.0, 3.0]),
            Direction3::identity(),
        );
        let image = Image::<Backend, 3>::from_metadata(
            Tensor::zeros([2, 2, 2], &device),
            metadata,
        );

        let replaced = image.with_data(Tensor::ones([2, 2, 2], &device));
        assert_eq!(replaced.metadata(), metadata);
        assert_eq!(replaced.to_voxels().unwrap(), vec![1.0; 8]);
    }
}
