//! Image types and operations.
//!
//! This module provides the Image type, its physical metadata and the
//! intensity statistics the filters build on.

pub mod image;
pub mod metadata;
pub mod statistics;

pub use image::Image;
pub use metadata::ImageMetadata;
pub use statistics::IntensityStatistics;
