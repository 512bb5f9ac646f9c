//! Image file I/O for winsor images.

pub mod nifti_io;

pub use nifti_io::{read_nifti, read_nifti_rank, write_nifti, write_nifti_with_rank};
