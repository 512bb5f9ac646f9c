//! Winsorization: quantile-bounded rescaling of image intensities.
//!
//! An image's intensity histogram is queried for a lower and an upper
//! quantile, and intensities are windowed from that range onto `[0, 1]`.

use burn::tensor::backend::Backend;
use crate::error::{PreprocessError, Result};
use crate::filter::{ImageToHistogramFilter, IntensityWindowingFilter};
use crate::image::Image;

/// Supported image dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Two,
    Three,
}

impl Dimension {
    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }
}

impl TryFrom<usize> for Dimension {
    type Error = PreprocessError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            2 => Ok(Dimension::Two),
            3 => Ok(Dimension::Three),
            other => Err(PreprocessError::InvalidDimension(other)),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}D", self.rank())
    }
}

/// Lower and upper histogram quantiles bounding the winsorization window.
///
/// Values are expected in `[0, 1]` with `lower <= upper` but are not
/// checked; see [`QuantilePair::is_well_formed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantilePair {
    pub lower: f64,
    pub upper: f64,
}

impl QuantilePair {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Both values inside `[0, 1]` and ordered.
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.lower)
            && (0.0..=1.0).contains(&self.upper)
            && self.lower <= self.upper
    }
}

impl Default for QuantilePair {
    /// Full intensity range.
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Intensity window picked from the histogram quantiles.
pub fn winsorization_window<B: Backend, const D: usize>(
    image: &Image<B, D>,
    quantiles: QuantilePair,
) -> Result<(f64, f64)> {
    let histogram = ImageToHistogramFilter::new().apply(image)?;
    let lower = histogram.quantile(quantiles.lower);
    let upper = histogram.quantile(quantiles.upper);

    tracing::debug!(
        "Quantiles ({}, {}) -> intensity window [{}, {}]",
        quantiles.lower,
        quantiles.upper,
        lower,
        upper
    );

    Ok((lower, upper))
}

/// Winsorize an image and rescale it onto `[0, 1]`.
///
/// Builds a 256-bin histogram with automatic range (marginal scale 10),
/// looks up the intensities at both quantiles and maps that window linearly
/// onto `[0, 1]`, clipping everything outside it.
///
/// # Errors
/// `EmptyImage` and `NonFiniteIntensity` from the histogram, and
/// `DegenerateWindow` when the two quantile intensities coincide, as they
/// do for a constant image.
pub fn winsorize<B: Backend, const D: usize>(
    image: &Image<B, D>,
    quantiles: QuantilePair,
) -> Result<Image<B, D>> {
    let (lower, upper) = winsorization_window(image, quantiles)?;
    IntensityWindowingFilter::new(lower, upper).apply(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageMetadata;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_dimension_try_from() {
        assert_eq!(Dimension::try_from(2).unwrap(), Dimension::Two);
        assert_eq!(Dimension::try_from(3).unwrap(), Dimension::Three);
        for bad in [0, 1, 4, 7] {
            let err = Dimension::try_from(bad).unwrap_err();
            assert!(matches!(err, PreprocessError::InvalidDimension(d) if d == bad));
        }
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::Three.to_string(), "3D");
        assert_eq!(Dimension::Two.rank(), 2);
    }

    #[test]
    fn test_quantile_pair() {
        assert_eq!(QuantilePair::default(), QuantilePair::new(0.0, 1.0));
        assert!(QuantilePair::new(0.1, 0.9).is_well_formed());
        assert!(!QuantilePair::new(0.9, 0.1).is_well_formed());
        assert!(!QuantilePair::new(-0.1, 0.9).is_well_formed());
        assert!(!QuantilePair::new(0.0, f64::NAN).is_well_formed());
    }

    #[test]
    fn test_window_for_default_quantiles() {
        let values: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let image =
            Image::<B, 2>::from_voxels(values, [10, 10], ImageMetadata::default(), &Default::default())
                .unwrap();

        let (lower, upper) = winsorization_window(&image, QuantilePair::default()).unwrap();
        assert_eq!(lower, 0.0);
        assert!((upper - (99.0 + 99.0 / 2560.0)).abs() < 1e-9);
    }

    #[test]
    fn test_constant_image_is_degenerate() {
        let image = Image::<B, 2>::from_voxels(
            vec![3.0; 16],
            [4, 4],
            ImageMetadata::default(),
            &Default::default(),
        )
        .unwrap();
        let result = winsorize(&image, QuantilePair::default());
        assert!(matches!(result, Err(PreprocessError::DegenerateWindow { .. })));
    }
}
