//! Histogram matching between two images.
//!
//! The source image is remapped so that a fixed set of its intensity
//! quantiles lands on the corresponding quantiles of the reference image.
//! Intensities between match points are interpolated piecewise-linearly.

use burn::tensor::backend::Backend;
use crate::error::{PreprocessError, Result};
use crate::filter::histogram::Histogram;
use crate::image::{Image, IntensityStatistics};

/// Default number of histogram levels used for matching.
pub const MATCH_HISTOGRAM_LEVELS: usize = 256;

/// Default number of quantile match points.
pub const MATCH_POINTS: usize = 12;

/// Histogram matching filter.
///
/// With mean thresholding on (the default), only voxels at or above each
/// image's mean intensity are histogrammed, which keeps large background
/// regions from dominating the match.
#[derive(Debug, Clone)]
pub struct HistogramMatchingFilter {
    histogram_levels: usize,
    match_points: usize,
    threshold_at_mean: bool,
}

impl Default for HistogramMatchingFilter {
    fn default() -> Self {
        Self {
            histogram_levels: MATCH_HISTOGRAM_LEVELS,
            match_points: MATCH_POINTS,
            threshold_at_mean: true,
        }
    }
}

/// Piecewise-linear intensity map derived from two histograms.
///
/// Row 0 of the quantile table holds source intensities, row 1 the
/// reference intensities they map to. Column 0 is the histogram lower
/// bound, the last column the image maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityMapping {
    source_table: Vec<f64>,
    reference_table: Vec<f64>,
    gradients: Vec<f64>,
    lower_gradient: f64,
    upper_gradient: f64,
    source_min: f64,
    source_max: f64,
    reference_min: f64,
    reference_max: f64,
}

impl IntensityMapping {
    /// Source-side quantile landmarks.
    pub fn source_table(&self) -> &[f64] {
        &self.source_table
    }

    /// Reference-side quantile landmarks.
    pub fn reference_table(&self) -> &[f64] {
        &self.reference_table
    }

    /// Map one source intensity.
    pub fn map_value(&self, value: f64) -> f64 {
        let columns = self.source_table.len();
        let j = self
            .source_table
            .iter()
            .position(|&landmark| value < landmark)
            .unwrap_or(columns);

        if j == 0 {
            self.reference_min + (value - self.source_min) * self.lower_gradient
        } else if j == columns {
            self.reference_max + (value - self.source_max) * self.upper_gradient
        } else {
            self.reference_table[j - 1] + (value - self.source_table[j - 1]) * self.gradients[j - 1]
        }
    }
}

impl HistogramMatchingFilter {
    /// Create a filter with 256 histogram levels, 12 match points and
    /// thresholding at the mean intensity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of histogram levels.
    pub fn with_histogram_levels(mut self, levels: usize) -> Self {
        self.histogram_levels = levels;
        self
    }

    /// Set the number of quantile match points.
    pub fn with_match_points(mut self, match_points: usize) -> Self {
        self.match_points = match_points;
        self
    }

    /// Enable or disable thresholding at the mean intensity.
    pub fn with_threshold_at_mean(mut self, threshold: bool) -> Self {
        self.threshold_at_mean = threshold;
        self
    }

    pub fn histogram_levels(&self) -> usize {
        self.histogram_levels
    }

    pub fn match_points(&self) -> usize {
        self.match_points
    }

    pub fn threshold_at_mean(&self) -> bool {
        self.threshold_at_mean
    }

    /// Match `source` to `reference`, returning a new image with the
    /// source's geometry.
    pub fn apply<B: Backend, const D: usize>(
        &self,
        source: &Image<B, D>,
        reference: &Image<B, D>,
    ) -> Result<Image<B, D>> {
        let source_voxels = source.to_voxels()?;
        let reference_voxels = reference.to_voxels()?;

        let mapping = self.compute_mapping(&source_voxels, &reference_voxels)?;
        let matched: Vec<f32> = source_voxels
            .iter()
            .map(|&v| mapping.map_value(v as f64) as f32)
            .collect();

        Image::from_voxels(
            matched,
            source.shape(),
            source.metadata(),
            &source.data().device(),
        )
    }

    /// Build the intensity map from flat source and reference buffers.
    pub fn compute_mapping(&self, source: &[f32], reference: &[f32]) -> Result<IntensityMapping> {
        if self.histogram_levels == 0 {
            return Err(PreprocessError::invalid_configuration(
                "histogram matching needs at least one histogram level",
            ));
        }
        if self.match_points == 0 {
            return Err(PreprocessError::invalid_configuration(
                "histogram matching needs at least one match point",
            ));
        }

        let source_stats = IntensityStatistics::from_voxels(source)?;
        let reference_stats = IntensityStatistics::from_voxels(reference)?;

        let source_threshold = self.intensity_threshold(&source_stats);
        let reference_threshold = self.intensity_threshold(&reference_stats);

        let source_histogram = self.build_histogram(source, source_threshold, source_stats.max)?;
        let reference_histogram =
            self.build_histogram(reference, reference_threshold, reference_stats.max)?;

        let columns = self.match_points + 2;
        let mut source_table = vec![0.0; columns];
        let mut reference_table = vec![0.0; columns];
        source_table[0] = source_threshold;
        reference_table[0] = reference_threshold;
        source_table[columns - 1] = source_stats.max;
        reference_table[columns - 1] = reference_stats.max;

        let delta = 1.0 / (self.match_points as f64 + 1.0);
        for j in 1..=self.match_points {
            source_table[j] = source_histogram.quantile(j as f64 * delta);
            reference_table[j] = reference_histogram.quantile(j as f64 * delta);
        }

        let gradients = (0..columns - 1)
            .map(|j| {
                slope(
                    reference_table[j + 1] - reference_table[j],
                    source_table[j + 1] - source_table[j],
                )
            })
            .collect();
        let lower_gradient = slope(
            reference_table[0] - reference_stats.min,
            source_table[0] - source_stats.min,
        );
        let upper_gradient = slope(
            reference_table[columns - 1] - reference_stats.max,
            source_table[columns - 1] - source_stats.max,
        );

        tracing::debug!("Histogram matching source landmarks: {:?}", source_table);
        tracing::debug!("Histogram matching reference landmarks: {:?}", reference_table);

        Ok(IntensityMapping {
            source_table,
            reference_table,
            gradients,
            lower_gradient,
            upper_gradient,
            source_min: source_stats.min,
            source_max: source_stats.max,
            reference_min: reference_stats.min,
            reference_max: reference_stats.max,
        })
    }

    fn intensity_threshold(&self, stats: &IntensityStatistics) -> f64 {
        if self.threshold_at_mean {
            // Rounding can push the mean of a constant image past its maximum.
            stats.mean.min(stats.max)
        } else {
            stats.min
        }
    }

    /// Histogram of the voxels in `[lower, upper)`. Voxels at the maximum
    /// are left out, so a block of saturated voxels does not pull the upper
    /// landmarks onto the maximum.
    fn build_histogram(&self, voxels: &[f32], lower: f64, upper: f64) -> Result<Histogram> {
        let mut histogram = Histogram::new(self.histogram_levels, lower, upper)?;
        for &v in voxels {
            histogram.increase_frequency(v as f64);
        }

        if histogram.total_frequency() <= 0.0 {
            return Err(PreprocessError::degenerate_histogram(format!(
                "no voxels in [{}, {}]",
                lower, upper
            )));
        }
        Ok(histogram)
    }
}

/// Ratio of two intensity differences, zero when the denominator vanishes.
fn slope(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() > f64::EPSILON {
        numerator / denominator
    } else {
        0.0
    }
}
