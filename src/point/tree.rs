//! Tree facade for the point octree: owns the root, tracks `count`, and
//! implements the grow/shrink transformations that keep the root sized
//! to whatever has been inserted.

use glam::Vec3;

use crate::consts::MAX_GROW_ATTEMPTS;
use crate::geom::Ray;
use crate::octree_error;
use crate::octree_warn;

use super::node::{PointObject, PointOctreeNode};

/// A dynamic octree indexing objects located at a single 3D point.
///
/// See the crate-level docs for the invariants this structure
/// maintains across insertion, removal, grow and shrink.
pub struct PointOctree<T> {
    root: PointOctreeNode<T>,
    count: usize,
    initial_size: f32,
    min_size: f32,
}

impl<T> PointOctree<T> {
    /// Create a new octree.
    ///
    /// `min_node_size` is clamped down to `initial_world_size` (with a
    /// warning) if it would otherwise exceed it — an octree can't
    /// usefully refuse to split below a size larger than its own root.
    pub fn new(initial_world_size: f32, initial_world_pos: Vec3, min_node_size: f32) -> Self {
        let min_size = if min_node_size > initial_world_size {
            octree_warn!(
                "octree::PointOctree",
                "min_node_size {} exceeds initial_world_size {}, clamping",
                min_node_size,
                initial_world_size
            );
            initial_world_size
        } else {
            min_node_size
        };

        PointOctree {
            root: PointOctreeNode::new(initial_world_size, min_size, initial_world_pos),
            count: 0,
            initial_size: initial_world_size,
            min_size,
        }
    }

    /// Number of objects currently stored.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Insert `obj` located at `point`.
    ///
    /// Grows the root as many times as needed (up to an internal safety
    /// limit) until `point` is encapsulated. A locator with a NaN or
    /// infinite coordinate, or one so far away that growth can't reach
    /// it, is logged as an error and silently dropped — `count` is left
    /// unchanged in that case.
    pub fn add(&mut self, obj: T, point: Vec3) {
        if !point.is_finite() {
            octree_error!("octree::PointOctree", "dropped insertion: locator {:?} is not finite", point);
            return;
        }

        let mut pending = Some(PointObject { payload: obj, point });
        let mut attempts = 0u32;
        loop {
            if self.root.try_add(&mut pending) {
                self.count += 1;
                return;
            }
            if attempts >= MAX_GROW_ATTEMPTS {
                octree_error!(
                    "octree::PointOctree",
                    "dropped insertion: locator {:?} not reachable after {} grow attempts",
                    point,
                    MAX_GROW_ATTEMPTS
                );
                return;
            }
            self.grow(point - self.root.center);
            attempts += 1;
        }
    }

    /// Remove `obj`, scanning every descendant if necessary.
    ///
    /// Returns `false` (no side effect) if `obj` isn't present.
    pub fn remove(&mut self, obj: &T) -> bool
    where
        T: PartialEq,
    {
        let removed = self.root.remove(obj);
        if removed {
            self.count -= 1;
            self.shrink_root();
        }
        removed
    }

    /// Remove `obj`, known to be located at `point`.
    ///
    /// Prunes by encapsulation instead of scanning every descendant;
    /// prefer this over [`Self::remove`] when the locator is at hand.
    pub fn remove_at(&mut self, obj: &T, point: Vec3) -> bool
    where
        T: PartialEq,
    {
        let removed = self.root.remove_at(obj, point);
        if removed {
            self.count -= 1;
            self.shrink_root();
        }
        removed
    }

    /// All stored objects, in unspecified order.
    pub fn get_all(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.count);
        self.root.collect_all(&mut out);
        out
    }

    /// Every object within `max_distance` of `point`.
    pub fn get_nearby_point(&self, point: Vec3, max_distance: f32) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::new();
        self.root.get_nearby_point(point, max_distance, &mut out);
        out
    }

    /// Every object within `max_distance` of `ray` (perpendicular
    /// distance). `ray.direction` must be unit length.
    pub fn get_nearby_ray(&self, ray: &Ray, max_distance: f32) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::new();
        self.root.get_nearby_ray(ray, max_distance, &mut out);
        out
    }

    fn grow(&mut self, direction: Vec3) {
        let old_center = self.root.center;
        let old_base_length = self.root.base_length;
        let old_root = std::mem::replace(
            &mut self.root,
            PointOctreeNode::new(old_base_length, self.min_size, old_center),
        );

        let x_dir = if direction.x >= 0.0 { 1.0 } else { -1.0 };
        let y_dir = if direction.y >= 0.0 { 1.0 } else { -1.0 };
        let z_dir = if direction.z >= 0.0 { 1.0 } else { -1.0 };

        let half = old_base_length / 2.0;
        let new_length = old_base_length * 2.0;
        let new_center = old_center + Vec3::new(x_dir * half, y_dir * half, z_dir * half);

        let mut new_root = PointOctreeNode::new(new_length, self.min_size, new_center);

        if old_root.has_any_objects() {
            let root_pos = PointOctreeNode::<T>::best_fit_child(new_center, old_center);
            let offset = half;
            let mut old_root_slot = Some(old_root);

            let children: Vec<PointOctreeNode<T>> = (0..8)
                .map(|i| {
                    if i == root_pos {
                        old_root_slot.take().unwrap()
                    } else {
                        let x = if i % 2 == 0 { -1.0 } else { 1.0 };
                        let y = if i > 3 { -1.0 } else { 1.0 };
                        let z = if i < 2 || (i > 3 && i < 6) { -1.0 } else { 1.0 };
                        let center = new_center + Vec3::new(x * offset, y * offset, z * offset);
                        PointOctreeNode::new(old_base_length, self.min_size, center)
                    }
                })
                .collect();

            new_root.set_children(children.try_into().unwrap_or_else(|_| {
                unreachable!("grow always builds exactly 8 children")
            }));
        }

        self.root = new_root;
    }

    fn shrink_root(&mut self) {
        let placeholder = PointOctreeNode::new(self.initial_size, self.min_size, self.root.center);
        let root = std::mem::replace(&mut self.root, placeholder);
        self.root = root.shrink_if_possible(self.initial_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> PointOctree<u32> {
        PointOctree::new(2.0, Vec3::ZERO, 1.0)
    }

    #[test]
    fn add_two_points_no_split() {
        let mut t = tree();
        t.add(1, Vec3::new(0.5, 0.5, 0.5));
        t.add(2, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(t.count(), 2);

        let mut out = t.get_nearby_point(Vec3::ZERO, 1.0);
        out.sort();
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn nine_clustered_points_force_a_split_into_same_octant() {
        let mut t = tree();
        for i in 0..9u32 {
            let eps = (i as f32) * 1e-4;
            t.add(i, Vec3::new(0.5, 0.5, 0.5 + eps));
        }
        assert_eq!(t.count(), 9);

        // All 9 share x>cx, z>cz, y>=cy -> octant index 1 + 2 = 3 per §4.1.
        assert_eq!(
            PointOctree::<u32>::best_fit_child_for_test(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5)),
            3
        );
    }

    #[test]
    fn insertion_far_away_grows_the_root_and_keeps_everything_reachable() {
        let mut t = tree();
        t.add(1, Vec3::new(0.5, 0.5, 0.5));
        t.add(2, Vec3::new(-0.5, -0.5, -0.5));
        t.add(3, Vec3::new(100.0, 0.0, 0.0));

        assert_eq!(t.count(), 3);
        let mut all = t.get_all();
        all.sort();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn remove_absent_object_is_a_noop() {
        let mut t = tree();
        t.add(1, Vec3::ZERO);
        assert!(!t.remove(&99));
        assert_eq!(t.count(), 1);
    }

    #[test]
    fn add_then_remove_restores_count() {
        let mut t = tree();
        t.add(1, Vec3::new(0.5, 0.5, 0.5));
        assert!(t.remove_at(&1, Vec3::new(0.5, 0.5, 0.5)));
        assert_eq!(t.count(), 0);
        assert!(t.get_all().is_empty());
    }

    #[test]
    fn degenerate_locator_is_dropped_without_panicking() {
        let mut t = tree();
        t.add(1, Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn clustered_insert_and_full_removal_leaves_a_valid_tree() {
        let mut t = tree();
        let points: Vec<Vec3> = (0..9)
            .map(|i| Vec3::new(0.5, 0.5, 0.5 + (i as f32) * 1e-4))
            .collect();
        for (i, p) in points.iter().enumerate() {
            t.add(i as u32, *p);
        }
        assert_eq!(t.count(), 9);

        for (i, p) in points.iter().enumerate() {
            assert!(t.remove_at(&(i as u32), *p));
        }
        assert_eq!(t.count(), 0);
        assert!(t.get_all().is_empty());
    }

    impl PointOctree<u32> {
        fn best_fit_child_for_test(center: Vec3, point: Vec3) -> usize {
            super::super::node::PointOctreeNode::<u32>::best_fit_child(center, point)
        }
    }
}
