//! Error types for the octree crate
//!
//! Nothing in the public tree API returns a `Result` — per the crate's
//! failure-handling contract, every recoverable failure is absorbed and
//! reported through [`crate::log`] instead (see the `octree_warn!`/
//! `octree_error!` call sites in [`crate::point`] and [`crate::bounds`]).
//! `OctreeError` exists for the handful of internal fallible steps that
//! lead to those log calls, modeled as ordinary `Result`s and propagated
//! with `?` in this codebase's house style before being logged and
//! discarded at the tree facade boundary.

use std::fmt;

/// Result type for internal octree operations.
pub type Result<T> = std::result::Result<T, OctreeError>;

/// Internal octree errors.
#[derive(Debug, Clone)]
pub enum OctreeError {
    /// A locator (point or AABB) could not be encapsulated by the root
    /// even after the configured number of grow attempts. Carries the
    /// number of attempts made.
    GrowLimitExceeded(u32),

    /// A locator contained a non-finite coordinate (NaN or infinite).
    DegenerateLocator,
}

impl fmt::Display for OctreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OctreeError::GrowLimitExceeded(attempts) => {
                write!(f, "root did not encapsulate the new object after {attempts} grow attempts")
            }
            OctreeError::DegenerateLocator => {
                write!(f, "locator has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for OctreeError {}
