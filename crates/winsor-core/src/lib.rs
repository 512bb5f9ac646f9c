pub mod error;
pub mod image;
pub mod spatial;
pub mod filter;
pub mod preprocess;

pub use error::{PreprocessError, Result};
pub use image::{Image, ImageMetadata};
pub use spatial::{Point, Vector, Spacing, Direction};
pub use preprocess::{winsorize, winsorization_window, Dimension, QuantilePair};
