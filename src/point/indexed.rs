//! Optional payload→location fast path, layered on top of [`PointOctree`].
//!
//! Not part of the core contract (see SPEC_FULL.md §9): the core tree
//! supports `T: Clone + PartialEq` and nothing more, and `remove` runs
//! in O(tree size) in the worst case because it has to search for the
//! object. When the payload is also `Eq + Hash`, this wrapper keeps a
//! side table from payload to its last known point — the same
//! reverse-lookup idea this codebase's `OctreeSceneIndex` uses
//! (`FxHashMap<key, (node, aabb)>`) — so `remove` can go straight to
//! [`PointOctree::remove_at`] instead of scanning.

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::tree::PointOctree;

/// A [`PointOctree`] with an O(1) payload→point index for fast removal.
pub struct IndexedPointOctree<T: Eq + std::hash::Hash + Clone> {
    tree: PointOctree<T>,
    locations: FxHashMap<T, Vec3>,
}

impl<T: Eq + std::hash::Hash + Clone> IndexedPointOctree<T> {
    pub fn new(initial_world_size: f32, initial_world_pos: Vec3, min_node_size: f32) -> Self {
        IndexedPointOctree {
            tree: PointOctree::new(initial_world_size, initial_world_pos, min_node_size),
            locations: FxHashMap::default(),
        }
    }

    pub fn count(&self) -> usize {
        self.tree.count()
    }

    pub fn add(&mut self, obj: T, point: Vec3) {
        let before = self.tree.count();
        self.tree.add(obj.clone(), point);
        if self.tree.count() != before {
            self.locations.insert(obj, point);
        }
    }

    /// Remove `obj` in O(depth) via the cached location, falling back to
    /// a full scan if the object was never indexed (should not happen
    /// for objects inserted through this wrapper).
    pub fn remove(&mut self, obj: &T) -> bool {
        match self.locations.remove(obj) {
            Some(point) => self.tree.remove_at(obj, point),
            None => self.tree.remove(obj),
        }
    }

    pub fn get_all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.tree.get_all()
    }

    pub fn get_nearby_point(&self, point: Vec3, max_distance: f32) -> Vec<T> {
        self.tree.get_nearby_point(point, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_uses_the_cached_location() {
        let mut t = IndexedPointOctree::new(2.0, Vec3::ZERO, 1.0);
        t.add(1u32, Vec3::new(0.5, 0.5, 0.5));
        t.add(2u32, Vec3::new(-0.5, -0.5, -0.5));

        assert!(t.remove(&1));
        assert_eq!(t.count(), 1);
        assert_eq!(t.get_all(), vec![2]);
    }
}
