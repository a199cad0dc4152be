//! Tuning constants shared by both octree variants.

/// Maximum number of object records a leaf holds before it splits,
/// unless splitting further would produce children below `min_size`.
pub(crate) const NUM_OBJECTS_ALLOWED: usize = 8;

/// Safety net on [`crate::point::PointOctree::add`] /
/// [`crate::bounds::BoundsOctree::add`]: a locator that still isn't
/// encapsulated by the root after this many doublings is treated as
/// degenerate and the insertion is dropped (see §7 of the design doc).
pub(crate) const MAX_GROW_ATTEMPTS: u32 = 20;
