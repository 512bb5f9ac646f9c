//! Intensity histograms and quantile lookup.
//!
//! [`Histogram`] is a one-dimensional histogram with equal-width bins.
//! [`ImageToHistogramFilter`] builds one from an image, detecting the
//! intensity range automatically and widening the upper bound by a small
//! margin so the maximum voxel falls inside the last bin.

use burn::tensor::backend::Backend;
use crate::error::{PreprocessError, Result};
use crate::image::{Image, IntensityStatistics};

/// Default number of histogram bins.
pub const HISTOGRAM_BINS: usize = 256;

/// Default marginal scale. The upper bound is raised by
/// `(max - min) / bins / marginal_scale`.
pub const MARGINAL_SCALE: f64 = 10.0;

/// One-dimensional histogram with equal-width bins over `[lower, upper]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    lower: f64,
    upper: f64,
    frequencies: Vec<f64>,
    /// Drop samples outside `[lower, upper]` instead of folding them into
    /// the end bins.
    clip_bins_at_ends: bool,
}

impl Histogram {
    /// Create an empty histogram.
    ///
    /// # Arguments
    /// * `bins` - Number of bins (must be at least 1)
    /// * `lower` - Lower bound of the first bin
    /// * `upper` - Upper bound of the last bin (must not be below `lower`)
    pub fn new(bins: usize, lower: f64, upper: f64) -> Result<Self> {
        if bins == 0 {
            return Err(PreprocessError::invalid_configuration(
                "histogram needs at least one bin",
            ));
        }
        if !lower.is_finite() || !upper.is_finite() || upper < lower {
            return Err(PreprocessError::invalid_configuration(format!(
                "invalid histogram bounds [{}, {}]",
                lower, upper
            )));
        }

        Ok(Self {
            lower,
            upper,
            frequencies: vec![0.0; bins],
            clip_bins_at_ends: true,
        })
    }

    /// Set whether out-of-range samples are dropped (default) or counted in
    /// the first/last bin.
    pub fn with_clip_bins_at_ends(mut self, clip: bool) -> Self {
        self.clip_bins_at_ends = clip;
        self
    }

    /// Number of bins.
    pub fn size(&self) -> usize {
        self.frequencies.len()
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper
    }

    /// Width shared by every bin.
    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.size() as f64
    }

    /// Lower edge of bin `bin`.
    pub fn bin_min(&self, bin: usize) -> f64 {
        self.lower + bin as f64 * self.bin_width()
    }

    /// Upper edge of bin `bin`. The last bin ends exactly at the upper bound.
    pub fn bin_max(&self, bin: usize) -> f64 {
        if bin + 1 >= self.size() {
            self.upper
        } else {
            self.lower + (bin + 1) as f64 * self.bin_width()
        }
    }

    pub fn frequency(&self, bin: usize) -> f64 {
        self.frequencies[bin]
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Sum of all bin frequencies.
    pub fn total_frequency(&self) -> f64 {
        self.frequencies.iter().sum()
    }

    /// Bin a measurement falls into, or `None` when it is clipped.
    ///
    /// Bins are half-open, so with clipping on a value equal to the upper
    /// bound is dropped.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let last = self.size() - 1;
        if value.is_nan() {
            return None;
        }
        if value < self.lower {
            return if self.clip_bins_at_ends { None } else { Some(0) };
        }
        if value >= self.upper {
            return if self.clip_bins_at_ends { None } else { Some(last) };
        }

        let width = self.bin_width();
        let bin = ((value - self.lower) / width).floor() as usize;
        Some(bin.min(last))
    }

    /// Count one sample. Returns false when the sample was clipped.
    pub fn increase_frequency(&mut self, value: f64) -> bool {
        match self.bin_index(value) {
            Some(bin) => {
                self.frequencies[bin] += 1.0;
                true
            }
            None => false,
        }
    }

    /// Intensity below which a fraction `p` of the samples fall.
    ///
    /// For `p < 0.5` bins are accumulated from the bottom until the
    /// cumulative proportion reaches `p`, and the result is interpolated
    /// linearly inside that bin from its lower edge. Otherwise bins are
    /// accumulated from the top and the result is interpolated down from
    /// the upper edge of the stopping bin. `p` outside `[0, 1]` extrapolates
    /// past the histogram bounds.
    ///
    /// An empty histogram yields the lower bound. An empty stopping bin
    /// yields its edge.
    pub fn quantile(&self, p: f64) -> f64 {
        let total = self.total_frequency();
        if total <= 0.0 {
            return self.lower;
        }

        if p < 0.5 {
            let mut cumulated = 0.0;
            let mut p_n = 0.0;
            let mut p_prev = 0.0;
            let mut f_n = 0.0;
            let mut bin = 0;
            for (i, &f) in self.frequencies.iter().enumerate() {
                f_n = f;
                cumulated += f;
                p_prev = p_n;
                p_n = cumulated / total;
                bin = i;
                if p_n >= p {
                    break;
                }
            }

            let proportion = f_n / total;
            let min = self.bin_min(bin);
            if proportion <= 0.0 {
                return min;
            }
            let interval = self.bin_max(bin) - min;
            min + ((p - p_prev) / proportion) * interval
        } else {
            let mut cumulated = 0.0;
            let mut p_n = 1.0;
            let mut p_prev = 1.0;
            let mut f_n = 0.0;
            let mut bin = self.size() - 1;
            for (i, &f) in self.frequencies.iter().enumerate().rev() {
                f_n = f;
                cumulated += f;
                p_prev = p_n;
                p_n = 1.0 - cumulated / total;
                bin = i;
                if p_n <= p || p.is_nan() {
                    break;
                }
            }

            let proportion = f_n / total;
            let max = self.bin_max(bin);
            if proportion <= 0.0 {
                return max;
            }
            let interval = max - self.bin_min(bin);
            max - ((p_prev - p) / proportion) * interval
        }
    }
}

/// Builds an intensity histogram from an image.
///
/// By default the range is detected from the image minimum and maximum,
/// with the maximum raised by a margin of
/// `(max - min) / bins / marginal_scale`.
#[derive(Debug, Clone)]
pub struct ImageToHistogramFilter {
    bins: usize,
    marginal_scale: f64,
    range: Option<(f64, f64)>,
}

impl Default for ImageToHistogramFilter {
    fn default() -> Self {
        Self {
            bins: HISTOGRAM_BINS,
            marginal_scale: MARGINAL_SCALE,
            range: None,
        }
    }
}

impl ImageToHistogramFilter {
    /// Create a filter with 256 bins, marginal scale 10 and automatic range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of bins.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the marginal scale used with automatic range detection.
    pub fn with_marginal_scale(mut self, marginal_scale: f64) -> Self {
        self.marginal_scale = marginal_scale;
        self
    }

    /// Use a fixed range instead of the image minimum and maximum.
    pub fn with_range(mut self, lower: f64, upper: f64) -> Self {
        self.range = Some((lower, upper));
        self
    }

    /// Compute the histogram of an image.
    pub fn apply<B: Backend, const D: usize>(&self, image: &Image<B, D>) -> Result<Histogram> {
        self.compute(&image.to_voxels()?)
    }

    /// Compute the histogram of a flat voxel buffer.
    pub fn compute(&self, voxels: &[f32]) -> Result<Histogram> {
        let mut histogram = match self.range {
            Some((lower, upper)) => Histogram::new(self.bins, lower, upper)?,
            None => self.auto_range_histogram(voxels)?,
        };

        for &v in voxels {
            histogram.increase_frequency(v as f64);
        }

        tracing::debug!(
            "Histogram: {} bins over [{}, {}], {} samples",
            histogram.size(),
            histogram.lower_bound(),
            histogram.upper_bound(),
            histogram.total_frequency()
        );

        Ok(histogram)
    }

    fn auto_range_histogram(&self, voxels: &[f32]) -> Result<Histogram> {
        if self.bins == 0 {
            return Err(PreprocessError::invalid_configuration(
                "histogram needs at least one bin",
            ));
        }
        if self.marginal_scale.is_nan() || self.marginal_scale <= 0.0 {
            return Err(PreprocessError::invalid_configuration(format!(
                "marginal scale must be positive, got {}",
                self.marginal_scale
            )));
        }

        let stats = IntensityStatistics::from_voxels(voxels)?;
        let margin = stats.range() / self.bins as f64 / self.marginal_scale;

        // Samples are f32; only widen when the raised bound stays representable.
        if (f32::MAX as f64 - stats.max) > margin {
            Histogram::new(self.bins, stats.min, stats.max + margin)
        } else {
            Ok(Histogram::new(self.bins, stats.min, stats.max)?.with_clip_bins_at_ends(false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|v| v as f32).collect()
    }

    #[test]
    fn test_bin_layout() {
        let h = Histogram::new(4, 0.0, 8.0).unwrap();
        assert_eq!(h.size(), 4);
        assert_eq!(h.bin_width(), 2.0);
        assert_eq!(h.bin_min(1), 2.0);
        assert_eq!(h.bin_max(1), 4.0);
        assert_eq!(h.bin_max(3), 8.0);
    }

    #[test]
    fn test_bin_index_edges() {
        let h = Histogram::new(4, 0.0, 8.0).unwrap();
        assert_eq!(h.bin_index(0.0), Some(0));
        assert_eq!(h.bin_index(1.999), Some(0));
        assert_eq!(h.bin_index(2.0), Some(1));
        assert_eq!(h.bin_index(7.999), Some(3));
        // Bins are half-open: the upper bound itself is clipped.
        assert_eq!(h.bin_index(8.0), None);
        assert_eq!(h.bin_index(-0.1), None);
        assert_eq!(h.bin_index(8.5), None);
        assert_eq!(h.bin_index(f64::NAN), None);

        let unclipped = h.with_clip_bins_at_ends(false);
        assert_eq!(unclipped.bin_index(-5.0), Some(0));
        assert_eq!(unclipped.bin_index(8.0), Some(3));
        assert_eq!(unclipped.bin_index(50.0), Some(3));
    }

    #[test]
    fn test_samples_at_upper_bound_are_dropped() {
        let mut h = Histogram::new(2, 0.0, 1.0).unwrap();
        assert!(h.increase_frequency(0.25));
        assert!(h.increase_frequency(0.75));
        assert!(!h.increase_frequency(1.0));
        assert_eq!(h.frequencies(), &[1.0, 1.0]);
    }

    #[test]
    fn test_margin_overflow_keeps_end_bins() {
        let voxels = [0.0, 1.0, 2.0, f32::MAX];
        let h = ImageToHistogramFilter::new().compute(&voxels).unwrap();

        // No room above f32::MAX for the margin, so nothing is clipped.
        assert_eq!(h.upper_bound(), f32::MAX as f64);
        assert_eq!(h.total_frequency(), 4.0);
        assert_eq!(h.frequency(255), 1.0);
        assert_eq!(h.quantile(0.0), 0.0);
        assert_eq!(h.quantile(1.0), f32::MAX as f64);
    }

    #[test]
    fn test_invalid_histograms() {
        assert!(Histogram::new(0, 0.0, 1.0).is_err());
        assert!(Histogram::new(4, 1.0, 0.0).is_err());
        assert!(Histogram::new(4, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_auto_range_applies_marginal_scale() {
        let voxels = ramp(100);
        let h = ImageToHistogramFilter::new().compute(&voxels).unwrap();

        let margin = 99.0 / 256.0 / 10.0;
        assert_eq!(h.size(), 256);
        assert_eq!(h.lower_bound(), 0.0);
        assert!((h.upper_bound() - (99.0 + margin)).abs() < 1e-12);
        assert_eq!(h.total_frequency(), 100.0);
        // The maximum lands in the last bin rather than being clipped.
        assert!(h.frequency(255) >= 1.0);
    }

    #[test]
    fn test_fixed_range_clips_outliers() {
        let voxels = [-1.0, 0.5, 1.5, 2.5, 10.0];
        let h = ImageToHistogramFilter::new()
            .with_bins(3)
            .with_range(0.0, 3.0)
            .compute(&voxels)
            .unwrap();
        assert_eq!(h.frequencies(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_invalid_marginal_scale() {
        let result = ImageToHistogramFilter::new()
            .with_marginal_scale(0.0)
            .compute(&ramp(10));
        assert!(matches!(result, Err(PreprocessError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_empty_voxels() {
        let result = ImageToHistogramFilter::new().compute(&[]);
        assert!(matches!(result, Err(PreprocessError::EmptyImage)));
    }

    #[test]
    fn test_extreme_quantiles_are_range_bounds() {
        let voxels = ramp(1000);
        let h = ImageToHistogramFilter::new().compute(&voxels).unwrap();

        assert_eq!(h.quantile(0.0), 0.0);
        assert!((h.quantile(1.0) - h.upper_bound()).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_interpolates_within_bin() {
        // Four samples per bin, bins of width 1 over [0, 4].
        let mut h = Histogram::new(4, 0.0, 4.0).unwrap();
        for bin in 0..4 {
            for _ in 0..4 {
                h.increase_frequency(bin as f64 + 0.5);
            }
        }

        // Lower walk: 0.125 is half of the first bin.
        assert!((h.quantile(0.125) - 0.5).abs() < 1e-12);
        assert!((h.quantile(0.25) - 1.0).abs() < 1e-12);
        // Upper walk: 0.875 is half of the last bin.
        assert!((h.quantile(0.875) - 3.5).abs() < 1e-12);
        assert!((h.quantile(0.5) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_uniform_ramp() {
        let voxels = ramp(10_000);
        let h = ImageToHistogramFilter::new().compute(&voxels).unwrap();

        let q10 = h.quantile(0.1);
        let q90 = h.quantile(0.9);
        assert!((q10 - 1000.0).abs() < 50.0, "q10 = {}", q10);
        assert!((q90 - 9000.0).abs() < 50.0, "q90 = {}", q90);
    }

    #[test]
    fn test_quantile_out_of_range_is_total() {
        let h = ImageToHistogramFilter::new().compute(&ramp(100)).unwrap();
        assert!(h.quantile(-0.5) < h.lower_bound());
        assert!(h.quantile(1.5) > h.upper_bound());
        assert!(h.quantile(f64::NAN).is_nan());
    }

    #[test]
    fn test_quantile_of_empty_histogram() {
        let h = Histogram::new(8, 2.0, 4.0).unwrap();
        assert_eq!(h.quantile(0.3), 2.0);
    }

    #[test]
    fn test_constant_image_collapses_to_single_value() {
        let h = ImageToHistogramFilter::new().compute(&[5.0; 20]).unwrap();
        assert_eq!(h.lower_bound(), 5.0);
        assert_eq!(h.upper_bound(), 5.0);
        // Zero margin: every sample sits on the upper bound and is clipped.
        assert_eq!(h.total_frequency(), 0.0);
        assert_eq!(h.quantile(0.0), 5.0);
        assert_eq!(h.quantile(1.0), 5.0);
    }
}
