//! Winsorization and histogram-matching preprocessing for image pairs.
//!
//! The [`pipeline`] module ties image I/O and the intensity filters
//! together; [`cli`] maps command-line arguments onto a
//! [`PreprocessConfig`].

pub mod cli;
pub mod config;
pub mod pipeline;

pub use cli::Cli;
pub use config::{OutputPaths, PreprocessConfig};
pub use pipeline::{preprocess_image, run, ConsoleObserver, PipelineObserver, SilentObserver, Stage};
