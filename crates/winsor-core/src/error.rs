//! Error types for preprocessing operations.
//!
//! This module provides the structured error type shared by the histogram,
//! windowing and matching filters.

use thiserror::Error;

/// Main error type for preprocessing operations.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Image dimensionality other than 2 or 3.
    #[error("Invalid dimension {0}. Acceptable choices are 2 or 3.")]
    InvalidDimension(usize),

    /// Image without any voxels.
    #[error("Image contains no voxels")]
    EmptyImage,

    /// NaN or infinite intensities found while computing the intensity range.
    #[error("Image intensity range is not finite")]
    NonFiniteIntensity,

    /// Window whose upper bound does not exceed its lower bound.
    #[error("Degenerate intensity window: lower {lower} must be below upper {upper}")]
    DegenerateWindow {
        lower: f64,
        upper: f64,
    },

    /// Histogram without usable samples.
    #[error("Degenerate histogram: {0}")]
    DegenerateHistogram(String),

    /// Invalid filter configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Tensor data could not be read back as f32.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessError>;

impl PreprocessError {
    /// Create a degenerate window error.
    pub fn degenerate_window(lower: f64, upper: f64) -> Self {
        Self::DegenerateWindow { lower, upper }
    }

    /// Create a degenerate histogram error.
    pub fn degenerate_histogram(msg: impl Into<String>) -> Self {
        Self::DegenerateHistogram(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }
}
