//! Point type for physical coordinates.

use nalgebra::Point as NaPoint;

/// A point in D-dimensional physical space.
///
/// Used for image origins: the physical position of the voxel at index zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a new point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// Create a point at the origin (all coordinates zero).
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Build a point from the first `D` values of `coords`, padding missing
    /// coordinates with zero.
    pub fn from_leading(coords: &[f64]) -> Self {
        let mut point = Self::origin();
        for (i, value) in coords.iter().take(D).enumerate() {
            point.0.coords[i] = *value;
        }
        point
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0.coords[index]
    }
}
