//! NIfTI-1 reading and writing.
//!
//! Voxel data is stored on disk with `x` varying fastest. Images keep their
//! tensors slowest-axis first (`[Z, Y, X]`), so axes are reversed on the way
//! in and on the way out. Compression follows the file extension.

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use ndarray::{ArrayD, Axis, IxDyn};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;
use winsor_core::image::{Image, ImageMetadata};
use winsor_core::spatial::{Direction, Point, Spacing, Vector};

/// NIfTI `xyzt_units` code for millimetres.
const UNITS_MM: u8 = 2;

/// Read a NIfTI file as a `D`-dimensional `f32` image.
///
/// # Arguments
/// * `path` - `.nii` or `.nii.gz` file
/// * `device` - Device to allocate the image tensor on
///
/// # Errors
/// Fails if the file cannot be read or decoded, or if it has more than `D`
/// axes of extent greater than one.
pub fn read_nifti<B: Backend, const D: usize, P: AsRef<Path>>(
    path: P,
    device: &B::Device,
) -> Result<Image<B, D>> {
    let path = path.as_ref();
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI file {}", path.display()))?;
    let header = obj.header().clone();

    let metadata = metadata_from_affine::<D>(&header_affine(&header));
    if !metadata.direction().is_orthogonal() {
        tracing::warn!(
            "{} has a sheared affine; its direction is not orthogonal",
            path.display()
        );
    }

    // Scaled by scl_slope / scl_inter during conversion.
    let volume = obj
        .into_volume()
        .into_ndarray::<f32>()
        .with_context(|| format!("Failed to convert {} to f32 voxels", path.display()))?;
    let volume = conform_axes::<D>(volume)
        .with_context(|| format!("Unsupported axis layout in {}", path.display()))?;

    // Reversing the axes turns the on-disk [X, Y, Z] order into [Z, Y, X].
    let volume = volume.reversed_axes();
    let shape: [usize; D] = volume
        .shape()
        .try_into()
        .context("Volume rank does not match the image dimension")?;
    let voxels: Vec<f32> = volume.iter().copied().collect();

    tracing::debug!(
        "Read {} with shape {:?} and spacing {:?}",
        path.display(),
        shape,
        metadata.spacing().to_vec()
    );

    Ok(Image::from_voxels(voxels, shape, metadata, device)?)
}

/// Number of axes a NIfTI file declares in `dim[0]`, read from the header
/// alone.
pub fn read_nifti_rank<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let header = NiftiHeader::from_file(path)
        .with_context(|| format!("Failed to read NIfTI header {}", path.display()))?;
    Ok(usize::from(header.dim[0]).clamp(1, 7))
}

/// Write an image to a NIfTI file as `f32` voxels.
///
/// Geometry is stored in the sform (`sform_code = 1`); the qform is left
/// unset. A `.gz` extension produces a compressed file.
pub fn write_nifti<B: Backend, const D: usize, P: AsRef<Path>>(
    path: P,
    image: &Image<B, D>,
) -> Result<()> {
    write_nifti_with_rank(path, image, D)
}

/// Write an image with at most `rank` axes on disk.
///
/// Trailing axes of extent one beyond `rank` are dropped, so a slice read
/// as a volume is written back as a 2D file. Axes with a larger extent are
/// always kept.
pub fn write_nifti_with_rank<B: Backend, const D: usize, P: AsRef<Path>>(
    path: P,
    image: &Image<B, D>,
    rank: usize,
) -> Result<()> {
    let path = path.as_ref();

    let shape = image.shape();
    let voxels = image.to_voxels()?;
    let mut array = ArrayD::from_shape_vec(IxDyn(&shape), voxels)
        .context("Voxel buffer does not match the image shape")?
        .reversed_axes();
    while array.ndim() > rank.max(1) && array.len_of(Axis(array.ndim() - 1)) == 1 {
        let last = array.ndim() - 1;
        array = array.index_axis_move(Axis(last), 0);
    }

    let header = header_for(&image.metadata());
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(&array)
        .with_context(|| format!("Failed to write NIfTI file {}", path.display()))?;

    tracing::debug!("Wrote {} with shape {:?}", path.display(), array.shape());
    Ok(())
}

/// Voxel-to-world affine rows: sform, else qform, else pixdim scaling.
fn header_affine(header: &NiftiHeader) -> [[f64; 4]; 3] {
    if header.sform_code > 0 {
        return [header.srow_x, header.srow_y, header.srow_z].map(|row| row.map(f64::from));
    }

    if header.qform_code > 0 {
        let b = header.quatern_b as f64;
        let c = header.quatern_c as f64;
        let d = header.quatern_d as f64;
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();

        let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let dx = header.pixdim[1] as f64;
        let dy = header.pixdim[2] as f64;
        let dz = header.pixdim[3] as f64 * qfac;

        let r = [
            [a * a + b * b - c * c - d * d, 2.0 * (b * c - a * d), 2.0 * (b * d + a * c)],
            [2.0 * (b * c + a * d), a * a + c * c - b * b - d * d, 2.0 * (c * d - a * b)],
            [2.0 * (b * d - a * c), 2.0 * (c * d + a * b), a * a + d * d - c * c - b * b],
        ];
        let t = [
            header.quatern_x as f64,
            header.quatern_y as f64,
            header.quatern_z as f64,
        ];

        let mut affine = [[0.0; 4]; 3];
        for (row, out) in affine.iter_mut().enumerate() {
            *out = [r[row][0] * dx, r[row][1] * dy, r[row][2] * dz, t[row]];
        }
        return affine;
    }

    let p = header.pixdim.map(f64::from);
    [
        [p[1], 0.0, 0.0, 0.0],
        [0.0, p[2], 0.0, 0.0],
        [0.0, 0.0, p[3], 0.0],
    ]
}

/// Split the upper-left `D x D` block of an affine into spacing and
/// direction, and take the translation as origin.
fn metadata_from_affine<const D: usize>(affine: &[[f64; 4]; 3]) -> ImageMetadata<D> {
    let mut spacing = Spacing::<D>::uniform(1.0);
    let mut columns = [Vector::<D>::zeros(); D];

    for (axis, column) in columns.iter_mut().enumerate() {
        let mut scaled = Vector::<D>::zeros();
        for row in 0..D.min(3) {
            scaled[row] = affine[row][axis];
        }

        let norm = scaled.norm();
        if norm.is_finite() && norm > 1e-9 {
            spacing[axis] = norm;
            *column = scaled / norm;
        } else {
            *column = Vector::unit(axis);
        }
    }

    let translation: Vec<f64> = affine.iter().map(|row| row[3]).collect();
    ImageMetadata::new(
        Point::from_leading(&translation),
        spacing,
        Direction::from_columns(&columns),
    )
}

/// Bring a volume to exactly `D` axes: pad missing axes with extent one and
/// drop trailing axes of extent one.
fn conform_axes<const D: usize>(mut volume: ArrayD<f32>) -> Result<ArrayD<f32>> {
    while volume.ndim() < D {
        let next = volume.ndim();
        volume = volume.insert_axis(Axis(next));
    }

    while volume.ndim() > D {
        let last = volume.ndim() - 1;
        let extent = volume.len_of(Axis(last));
        if extent != 1 {
            anyhow::bail!(
                "Expected a {}D image, but axis {} has extent {}",
                D,
                last + 1,
                extent
            );
        }
        volume = volume.index_axis_move(Axis(last), 0);
    }

    Ok(volume)
}

/// Header carrying the image geometry in the sform.
fn header_for<const D: usize>(metadata: &ImageMetadata<D>) -> NiftiHeader {
    let spacing = metadata.spacing();
    let direction = metadata.direction();
    let origin = metadata.origin();

    let mut pixdim = [1.0f32; 8];
    let mut rows = [[0.0f32; 4]; 3];
    for (row, out) in rows.iter_mut().enumerate() {
        for axis in 0..3 {
            out[axis] = if row < D && axis < D {
                (direction[(row, axis)] * spacing[axis]) as f32
            } else if row == axis {
                1.0
            } else {
                0.0
            };
        }
        if row < D {
            out[3] = origin[row] as f32;
        }
    }
    for axis in 0..D.min(3) {
        pixdim[axis + 1] = spacing[axis] as f32;
    }

    NiftiHeader {
        pixdim,
        srow_x: rows[0],
        srow_y: rows[1],
        srow_z: rows[2],
        sform_code: 1,
        qform_code: 0,
        scl_slope: 1.0,
        scl_inter: 0.0,
        xyzt_units: UNITS_MM,
        ..NiftiHeader::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use ndarray::Array3;
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_read_nifti_reverses_axes() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.nii");

        // X=3, Y=4, Z=5 on disk.
        let data: Vec<f32> = (0..3 * 4 * 5).map(|x| x as f32).collect();
        let array = Array3::from_shape_vec((3, 4, 5), data)?;
        WriterOptions::new(&file_path).write_nifti(&array)?;

        let device = Default::default();
        let image = read_nifti::<TestBackend, 3, _>(&file_path, &device)?;
        assert_eq!(image.shape(), [5, 4, 3]);

        let voxels = image.to_voxels()?;
        assert_eq!(voxels.len(), 60);
        // (x=1, y=2, z=3) holds 1*20 + 2*5 + 3.
        assert_eq!(voxels[3 * 12 + 2 * 3 + 1], 33.0);
        Ok(())
    }

    #[test]
    fn test_affine_decomposition() {
        let affine = [
            [0.0, -2.0, 0.0, 10.0],
            [3.0, 0.0, 0.0, 20.0],
            [0.0, 0.0, 4.0, 30.0],
        ];
        let metadata = metadata_from_affine::<3>(&affine);

        assert_eq!(metadata.spacing().to_vec(), vec![3.0, 2.0, 4.0]);
        assert_eq!(metadata.origin()[2], 30.0);
        assert_eq!(metadata.direction()[(1, 0)], 1.0);
        assert_eq!(metadata.direction()[(0, 1)], -1.0);
        assert!(metadata.direction().is_orthogonal());
    }

    #[test]
    fn test_affine_decomposition_2d_uses_upper_block() {
        let affine = [
            [0.5, 0.0, 0.0, -4.0],
            [0.0, 0.25, 0.0, 8.0],
            [0.0, 0.0, 7.0, 99.0],
        ];
        let metadata = metadata_from_affine::<2>(&affine);
        assert_eq!(metadata.spacing().to_vec(), vec![0.5, 0.25]);
        assert_eq!(metadata.origin()[0], -4.0);
        assert_eq!(metadata.origin()[1], 8.0);
        assert_eq!(*metadata.direction(), Direction::<2>::identity());
    }

    #[test]
    fn test_zero_column_falls_back_to_unit_axis() {
        let affine = [[0.0; 4]; 3];
        let metadata = metadata_from_affine::<3>(&affine);
        assert_eq!(metadata.spacing().to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(*metadata.direction(), Direction::<3>::identity());
    }

    #[test]
    fn test_conform_axes() {
        let padded = conform_axes::<3>(ArrayD::zeros(IxDyn(&[4, 5]))).unwrap();
        assert_eq!(padded.shape(), &[4, 5, 1]);

        let squeezed = conform_axes::<2>(ArrayD::zeros(IxDyn(&[4, 5, 1]))).unwrap();
        assert_eq!(squeezed.shape(), &[4, 5]);

        assert!(conform_axes::<2>(ArrayD::zeros(IxDyn(&[4, 5, 2]))).is_err());
    }

    #[test]
    fn test_header_for_geometry() {
        let metadata = ImageMetadata::new(
            Point::new([1.0, 2.0, 3.0]),
            Spacing::new([0.5, 1.5, 2.5]),
            Direction::identity(),
        );
        let header = header_for(&metadata);

        assert_eq!(header.sform_code, 1);
        assert_eq!(header.qform_code, 0);
        assert_eq!(header.srow_x, [0.5, 0.0, 0.0, 1.0]);
        assert_eq!(header.srow_y, [0.0, 1.5, 0.0, 2.0]);
        assert_eq!(header.srow_z, [0.0, 0.0, 2.5, 3.0]);
        assert_eq!(&header.pixdim[1..4], &[0.5, 1.5, 2.5]);
    }
}
