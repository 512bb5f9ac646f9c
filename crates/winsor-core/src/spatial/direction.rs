//! Direction matrices describing image axis orientation.

use nalgebra::SMatrix;
use super::Vector;

/// Orientation of the image axes in physical space.
///
/// Column `i` is the unit direction of image axis `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// Create an identity direction matrix (no rotation).
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Build a direction matrix from its axis columns.
    pub fn from_columns(columns: &[Vector<D>; D]) -> Self {
        let mut m = SMatrix::<f64, D, D>::zeros();
        for (c, column) in columns.iter().enumerate() {
            m.set_column(c, &column.0);
        }
        Self(m)
    }

    /// Check if direction matrix is orthogonal (rotation or reflection).
    pub fn is_orthogonal(&self) -> bool {
        let product = self.0 * self.0.transpose();
        let identity = SMatrix::<f64, D, D>::identity();
        (product - identity).iter().all(|v| v.abs() < 1e-6)
    }
}

impl<const D: usize> Default for Direction<D> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::IndexMut<(usize, usize)> for Direction<D> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.0[index]
    }
}
