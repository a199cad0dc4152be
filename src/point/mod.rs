//! Point octree: each object is located at a single 3D point.
//!
//! See [`PointOctree`] for the public surface and the crate-level docs
//! for the shared invariants between this and [`crate::bounds`].

mod indexed;
mod node;
mod tree;

pub use indexed::IndexedPointOctree;
pub use tree::PointOctree;
