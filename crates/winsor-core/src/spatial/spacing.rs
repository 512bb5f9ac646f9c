//! Spacing between adjacent voxels along each physical axis.

use super::Vector;

/// Physical distance between adjacent voxels along each axis.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Create uniform spacing (same value for all dimensions).
    pub fn uniform(value: f64) -> Self {
        Self(nalgebra::SVector::from_element(value))
    }
}
