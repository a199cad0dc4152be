//! Optional payload→location fast path, layered on top of
//! [`BoundsOctree`] — the bounds-variant counterpart of
//! [`crate::point::IndexedPointOctree`].

use rustc_hash::FxHashMap;

use crate::geom::Aabb;

use super::tree::BoundsOctree;

/// A [`BoundsOctree`] with an O(1) payload→bounds index for fast removal.
pub struct IndexedBoundsOctree<T: Eq + std::hash::Hash + Clone> {
    tree: BoundsOctree<T>,
    locations: FxHashMap<T, Aabb>,
}

impl<T: Eq + std::hash::Hash + Clone> IndexedBoundsOctree<T> {
    pub fn new(initial_world_size: f32, initial_world_pos: glam::Vec3, min_node_size: f32, looseness: f32) -> Self {
        IndexedBoundsOctree {
            tree: BoundsOctree::new(initial_world_size, initial_world_pos, min_node_size, looseness),
            locations: FxHashMap::default(),
        }
    }

    pub fn count(&self) -> usize {
        self.tree.count()
    }

    pub fn add(&mut self, obj: T, bounds: Aabb) {
        let before = self.tree.count();
        self.tree.add(obj.clone(), bounds);
        if self.tree.count() != before {
            self.locations.insert(obj, bounds);
        }
    }

    /// Remove `obj` in O(depth) via the cached location, falling back to
    /// a full scan if it was never indexed.
    pub fn remove(&mut self, obj: &T) -> bool {
        match self.locations.remove(obj) {
            Some(bounds) => self.tree.remove_at(obj, bounds),
            None => self.tree.remove(obj),
        }
    }

    pub fn get_all(&self) -> Vec<T> {
        self.tree.get_all()
    }

    pub fn get_colliding(&self, bounds: &Aabb, out: &mut Vec<T>) {
        self.tree.get_colliding(bounds, out);
    }

    pub fn is_colliding(&self, bounds: &Aabb) -> bool {
        self.tree.is_colliding(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn remove_uses_the_cached_location() {
        let mut t = IndexedBoundsOctree::new(2.0, Vec3::ZERO, 0.5, 1.5);
        t.add(1u32, Aabb::from_center_size(Vec3::new(0.5, 0.5, 0.5), 0.2));
        t.add(2u32, Aabb::from_center_size(Vec3::new(-0.5, -0.5, -0.5), 0.2));

        assert!(t.remove(&1));
        assert_eq!(t.count(), 1);
        assert_eq!(t.get_all(), vec![2]);
    }
}
