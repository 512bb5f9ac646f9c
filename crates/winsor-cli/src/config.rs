//! Run configuration and output naming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use winsor_core::QuantilePair;

/// Suffix of the preprocessed fixed image.
pub const FIXED_SUFFIX: &str = "_preprocessed_fixed.nii.gz";

/// Suffix of the preprocessed moving image.
pub const MOVING_SUFFIX: &str = "_preprocessed_moving.nii.gz";

/// Everything one preprocessing run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    /// Image dimension, 2 or 3. Checked when the run starts.
    pub dimension: usize,
    /// Winsorization quantiles, forwarded as given.
    pub quantiles: QuantilePair,
    /// Match the moving image's histogram to the fixed image.
    pub histogram_match: bool,
    pub fixed_image: PathBuf,
    pub moving_image: PathBuf,
    /// Prefix of both output files.
    pub output_root: PathBuf,
}

impl PreprocessConfig {
    /// Configuration with dimension 3, quantiles `(0, 1)` and no matching.
    pub fn new(
        fixed_image: impl Into<PathBuf>,
        moving_image: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dimension: 3,
            quantiles: QuantilePair::default(),
            histogram_match: false,
            fixed_image: fixed_image.into(),
            moving_image: moving_image.into(),
            output_root: output_root.into(),
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_quantiles(mut self, quantiles: QuantilePair) -> Self {
        self.quantiles = quantiles;
        self
    }

    pub fn with_histogram_match(mut self, histogram_match: bool) -> Self {
        self.histogram_match = histogram_match;
        self
    }

    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Output file paths derived from the output root.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::from_root(&self.output_root)
    }
}

/// Files written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub fixed: PathBuf,
    pub moving: PathBuf,
}

impl OutputPaths {
    /// Append the fixed and moving suffixes to `root`.
    ///
    /// The root is a plain prefix, not a directory: `out/subj` gives
    /// `out/subj_preprocessed_fixed.nii.gz`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            fixed: with_suffix(root, FIXED_SUFFIX),
            moving: with_suffix(root, MOVING_SUFFIX),
        }
    }
}

fn with_suffix(root: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(root.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
