//! Spatial types describing where image voxels sit in physical space.
//!
//! All types are thin wrappers over nalgebra and are indexed in physical
//! `(x, y, z)` order, independent of the tensor axis order of the voxel data.

pub mod point;
pub mod vector;
pub mod spacing;
pub mod direction;

pub use point::Point;
pub use vector::Vector;
pub use spacing::Spacing;
pub use direction::Direction;

// Volume aliases
pub type Point3 = Point<3>;
pub type Spacing3 = Spacing<3>;
pub type Direction3 = Direction<3>;
