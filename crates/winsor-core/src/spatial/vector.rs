//! Vector type for physical displacements.

use nalgebra::SVector;

/// A vector in D-dimensional space.
///
/// Backs spacing and the columns of direction matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize>(pub SVector<f64, D>);

impl<const D: usize> Vector<D> {
    /// Create a new vector from components.
    pub fn new(components: [f64; D]) -> Self {
        Self(SVector::from(components))
    }

    /// Create a zero vector.
    pub fn zeros() -> Self {
        Self(SVector::zeros())
    }

    /// Unit vector along axis `axis`.
    pub fn unit(axis: usize) -> Self {
        let mut v = Self::zeros();
        v.0[axis] = 1.0;
        v
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Convert vector to a vector of components.
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.iter().copied().collect()
    }
}

impl<const D: usize> std::ops::Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<const D: usize> std::ops::Div<f64> for Vector<D> {
    type Output = Self;

    fn div(self, scalar: f64) -> Self::Output {
        Self(self.0 / scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Vector3 = Vector<3>;

    #[test]
    fn test_vector_unit() {
        assert_eq!(Vector3::unit(0), Vector3::new([1.0, 0.0, 0.0]));
        assert_eq!(Vector3::unit(2), Vector3::new([0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_vector_norm() {
        let v = Vector::<2>::new([3.0, 4.0]);
        assert!((v.norm() - 5.0).abs() < 1e-12);
        assert_eq!(v / 5.0, Vector::<2>::new([0.6, 0.8]));
    }

    #[test]
    fn test_vector_to_vec() {
        let v = Vector3::new([1.0, 2.0, 3.0]);
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0]);
    }
}
