//! Preprocessing pipeline for a fixed/moving image pair.
//!
//! Both images are winsorized onto `[0, 1]`, the moving image is optionally
//! histogram-matched to the fixed image, and both results are written next
//! to the output root.

use crate::config::{OutputPaths, PreprocessConfig};
use anyhow::Result;
use burn::tensor::backend::Backend;
use std::path::Path;
use tracing::{info, warn};
use winsor_core::filter::HistogramMatchingFilter;
use winsor_core::{winsorize, Dimension, Image, PreprocessError, QuantilePair};
use winsor_io::{read_nifti, read_nifti_rank, write_nifti_with_rank};

/// Pipeline milestones reported to a [`PipelineObserver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage<'a> {
    /// Both images are about to be winsorized.
    Winsorizing,
    /// The moving image is about to be matched to the fixed image.
    HistogramMatching,
    /// Both outputs are on disk.
    OutputWritten(&'a OutputPaths),
}

/// Receives pipeline milestones.
pub trait PipelineObserver {
    /// Called when the pipeline reaches `stage`.
    fn on_stage(&self, _stage: Stage<'_>) {
        // Default: no-op
    }
}

/// Observer that ignores every stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

/// Observer printing progress messages to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    /// Message printed for a stage.
    pub fn message(stage: Stage<'_>) -> String {
        match stage {
            Stage::Winsorizing => "Winsorizing and normalizing intensities".to_string(),
            Stage::HistogramMatching => {
                "Histogram matching moving image to fixed image".to_string()
            }
            Stage::OutputWritten(paths) => format!(
                "Output written to {}_preprocessed_[fixed,moving].nii.gz",
                paths.root.display()
            ),
        }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn on_stage(&self, stage: Stage<'_>) {
        println!("{}", Self::message(stage));
    }
}

/// Load one image and winsorize it onto `[0, 1]`.
///
/// `dimension` is checked before the file is touched, and must agree with
/// the image rank `D`.
pub fn preprocess_image<B: Backend, const D: usize>(
    path: &Path,
    quantiles: QuantilePair,
    dimension: usize,
    device: &B::Device,
) -> Result<Image<B, D>> {
    let dimension = Dimension::try_from(dimension)?;
    if dimension.rank() != D {
        return Err(PreprocessError::invalid_configuration(format!(
            "dimension {} requested for a {}D image",
            dimension, D
        ))
        .into());
    }

    let image = read_nifti::<B, D, _>(path, device)?;
    info!("Loaded {} with shape {:?}", path.display(), image.shape());

    Ok(winsorize(&image, quantiles)?)
}

/// Run the whole pipeline and return the written paths.
pub fn run<B: Backend>(
    config: &PreprocessConfig,
    device: &B::Device,
    observer: &dyn PipelineObserver,
) -> Result<OutputPaths> {
    let dimension = Dimension::try_from(config.dimension)?;

    if !config.quantiles.is_well_formed() {
        warn!(
            "Winsorization quantiles ({}, {}) are outside [0, 1] or out of order",
            config.quantiles.lower, config.quantiles.upper
        );
    }

    match dimension {
        Dimension::Two => run_with_dimension::<B, 2>(config, device, observer),
        Dimension::Three => run_with_dimension::<B, 3>(config, device, observer),
    }
}

fn run_with_dimension<B: Backend, const D: usize>(
    config: &PreprocessConfig,
    device: &B::Device,
    observer: &dyn PipelineObserver,
) -> Result<OutputPaths> {
    observer.on_stage(Stage::Winsorizing);

    let fixed = preprocess_image::<B, D>(
        &config.fixed_image,
        config.quantiles,
        config.dimension,
        device,
    )?;
    let mut moving = preprocess_image::<B, D>(
        &config.moving_image,
        config.quantiles,
        config.dimension,
        device,
    )?;

    if config.histogram_match {
        observer.on_stage(Stage::HistogramMatching);
        moving = HistogramMatchingFilter::new().apply(&moving, &fixed)?;
    }

    // Outputs keep the rank of their inputs, so a 2D slice run with
    // dimension 3 is written back as a 2D file.
    let paths = config.output_paths();
    write_nifti_with_rank(&paths.fixed, &fixed, read_nifti_rank(&config.fixed_image)?)?;
    write_nifti_with_rank(&paths.moving, &moving, read_nifti_rank(&config.moving_image)?)?;
    info!(
        "Wrote {} and {}",
        paths.fixed.display(),
        paths.moving.display()
    );

    observer.on_stage(Stage::OutputWritten(&paths));
    Ok(paths)
}
