//! Command-line arguments.

use crate::config::PreprocessConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use winsor_core::QuantilePair;

/// Preprocess an image pair with winsorization and optional histogram matching.
#[derive(Parser, Debug)]
#[command(name = "winsor-preprocess")]
#[command(version)]
#[command(about = "Preprocess an image pair with winsorization and optional histogram matching")]
#[command(long_about = "\
Preprocess an image pair with winsorization and optional histogram matching.

Produces the same preprocessing antsRegistration applies internally. Both
images are winsorized and rescaled to [0, 1], and the moving image is
optionally histogram-matched to the fixed image.

Intended for evaluation: antsRegistration does the same with its '-w'
option for winsorization and its '-u' option for histogram matching.")]
pub struct Cli {
    /// Dimension of the input images. Acceptable choices are 2 or 3.
    #[arg(short, long, default_value_t = 3)]
    pub dimension: usize,

    /// Lower and upper quantiles for winsorization.
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["LOWER", "UPPER"],
        default_values_t = [0.0, 1.0],
        allow_negative_numbers = true
    )]
    pub winsorize_quantiles: Vec<f64>,

    /// Histogram match the moving image to the fixed image.
    #[arg(short = 'u', long)]
    pub histogram_match: bool,

    /// Path to the fixed image.
    pub fixed_image: PathBuf,

    /// Path to the moving image.
    pub moving_image: PathBuf,

    /// Prefix of the processed output images.
    pub output_root: PathBuf,
}

impl Cli {
    /// Turn parsed arguments into a run configuration.
    pub fn into_config(self) -> Result<PreprocessConfig> {
        let [lower, upper] = self.winsorize_quantiles[..] else {
            anyhow::bail!(
                "expected two winsorization quantiles, got {}",
                self.winsorize_quantiles.len()
            );
        };

        Ok(PreprocessConfig::new(self.fixed_image, self.moving_image, self.output_root)
            .with_dimension(self.dimension)
            .with_quantiles(QuantilePair::new(lower, upper))
            .with_histogram_match(self.histogram_match))
    }
}
