//! Whole-image intensity statistics.

use crate::error::{PreprocessError, Result};

/// Minimum, maximum and mean intensity over every voxel of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl IntensityStatistics {
    /// Compute statistics over a flat voxel buffer.
    ///
    /// Fails on an empty buffer and on NaN or infinite voxels, since neither
    /// gives a usable histogram range.
    pub fn from_voxels(values: &[f32]) -> Result<Self> {
        if values.is_empty() {
            return Err(PreprocessError::EmptyImage);
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0f64;
        for &v in values {
            let v = v as f64;
            if !v.is_finite() {
                return Err(PreprocessError::NonFiniteIntensity);
            }
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }

        Ok(Self {
            min,
            max,
            mean: sum / values.len() as f64,
            count: values.len(),
        })
    }

    /// Width of the intensity range.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
