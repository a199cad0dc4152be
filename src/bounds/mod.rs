//! Loose bounds octree: each object is located by an axis-aligned
//! bounding box, inflated by a looseness factor to absorb minor movement
//! without forcing a remove/re-add on every frame.
//!
//! See [`BoundsOctree`] for the public surface.

mod indexed;
mod node;
mod tree;

pub use indexed::IndexedBoundsOctree;
pub use tree::BoundsOctree;
