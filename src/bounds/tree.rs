//! Tree facade for the loose bounds octree.

use glam::Vec3;

use crate::consts::MAX_GROW_ATTEMPTS;
use crate::geom::{Aabb, Frustum, Ray};
use crate::octree_error;
use crate::octree_warn;

use super::node::{BoundsObject, BoundsOctreeNode};

/// A dynamic octree indexing objects located by an axis-aligned bounding
/// box, with looseness-inflated containment bounds to absorb jitter
/// without constant re-insertion (SPEC_FULL.md §4.5).
pub struct BoundsOctree<T> {
    root: BoundsOctreeNode<T>,
    count: usize,
    initial_size: f32,
    min_size: f32,
    looseness: f32,
}

impl<T> BoundsOctree<T> {
    /// Create a new octree. `min_node_size` is clamped to
    /// `initial_world_size` and `looseness` is clamped into `[1.0, 2.0]`;
    /// both clamps are logged as warnings rather than rejected outright.
    pub fn new(initial_world_size: f32, initial_world_pos: Vec3, min_node_size: f32, looseness: f32) -> Self {
        let min_size = if min_node_size > initial_world_size {
            octree_warn!(
                "octree::BoundsOctree",
                "min_node_size {} exceeds initial_world_size {}, clamping",
                min_node_size,
                initial_world_size
            );
            initial_world_size
        } else {
            min_node_size
        };

        let looseness = if !(1.0..=2.0).contains(&looseness) {
            let clamped = looseness.clamp(1.0, 2.0);
            octree_warn!(
                "octree::BoundsOctree",
                "looseness {} outside [1.0, 2.0], clamping to {}",
                looseness,
                clamped
            );
            clamped
        } else {
            looseness
        };

        BoundsOctree {
            root: BoundsOctreeNode::new(initial_world_size, min_size, looseness, initial_world_pos),
            count: 0,
            initial_size: initial_world_size,
            min_size,
            looseness,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Insert `obj` located by `bounds`.
    ///
    /// Grows the root (up to an internal safety limit) until `bounds` is
    /// encapsulated by the root's loose containment AABB. A locator with
    /// a non-finite extent, or one unreachable after the safety limit, is
    /// logged as an error and dropped.
    pub fn add(&mut self, obj: T, bounds: Aabb) {
        if !bounds.min.is_finite() || !bounds.max.is_finite() {
            octree_error!("octree::BoundsOctree", "dropped insertion: locator {:?} is not finite", bounds);
            return;
        }

        let mut pending = Some(BoundsObject { payload: obj, bounds });
        let mut attempts = 0u32;
        loop {
            if self.root.try_add(&mut pending) {
                self.count += 1;
                return;
            }
            if attempts >= MAX_GROW_ATTEMPTS {
                octree_error!(
                    "octree::BoundsOctree",
                    "dropped insertion: locator {:?} not reachable after {} grow attempts",
                    bounds,
                    MAX_GROW_ATTEMPTS
                );
                return;
            }
            self.grow(bounds.center() - self.root.center);
            attempts += 1;
        }
    }

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

    pub fn remove_at(&mut self, obj: &T, bounds: Aabb) -> bool
    where
        T: PartialEq,
    {
        let removed = self.root.remove_at(obj, bounds);
        if removed {
            self.count -= 1;
            self.shrink_root();
        }
        removed
    }

    pub fn get_all(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.count);
        self.root.collect_all(&mut out);
        out
    }

    /// Append every object whose locator intersects `bounds` to `out`.
    pub fn get_colliding(&self, bounds: &Aabb, out: &mut Vec<T>)
    where
        T: Clone,
    {
        self.root.get_colliding_bounds(bounds, out);
    }

    /// `true` iff any object's locator intersects `bounds`.
    pub fn is_colliding(&self, bounds: &Aabb) -> bool {
        self.root.is_colliding_bounds(bounds)
    }

    /// Append every object whose locator the ray hits, within
    /// `max_distance` if given, to `out`.
    pub fn get_colliding_ray(&self, ray: &Ray, max_distance: Option<f32>, out: &mut Vec<T>)
    where
        T: Clone,
    {
        self.root.get_colliding_ray(ray, max_distance, out);
    }

    /// `true` iff the ray hits any object's locator within `max_distance`.
    pub fn is_colliding_ray(&self, ray: &Ray, max_distance: Option<f32>) -> bool {
        self.root.is_colliding_ray(ray, max_distance)
    }

    /// Objects whose locator intersects the frustum.
    pub fn get_within_frustum(&self, frustum: &Frustum) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::new();
        self.root.get_within_frustum(frustum, &mut out);
        out
    }

    /// The root's current loose containment bounds.
    pub fn get_max_bounds(&self) -> Aabb {
        *self.root.bounds()
    }

    fn grow(&mut self, direction: Vec3) {
        let old_center = self.root.center;
        let old_base_length = self.root.base_length;
        let old_root = std::mem::replace(
            &mut self.root,
            BoundsOctreeNode::new(old_base_length, self.min_size, self.looseness, old_center),
        );

        let x_dir = if direction.x >= 0.0 { 1.0 } else { -1.0 };
        let y_dir = if direction.y >= 0.0 { 1.0 } else { -1.0 };
        let z_dir = if direction.z >= 0.0 { 1.0 } else { -1.0 };

        let half = old_base_length / 2.0;
        let new_length = old_base_length * 2.0;
        let new_center = old_center + Vec3::new(x_dir * half, y_dir * half, z_dir * half);

        let mut new_root = BoundsOctreeNode::new(new_length, self.min_size, self.looseness, new_center);

        if old_root.has_any_objects() {
            let root_pos = BoundsOctreeNode::<T>::best_fit_child(new_center, old_center);
            let offset = half;
            let mut old_root_slot = Some(old_root);

            let children: Vec<BoundsOctreeNode<T>> = (0..8)
                .map(|i| {
                    if i == root_pos {
                        old_root_slot.take().unwrap()
                    } else {
                        let x = if i % 2 == 0 { -1.0 } else { 1.0 };
                        let y = if i > 3 { -1.0 } else { 1.0 };
                        let z = if i < 2 || (i > 3 && i < 6) { -1.0 } else { 1.0 };
                        let center = new_center + Vec3::new(x * offset, y * offset, z * offset);
                        BoundsOctreeNode::new(old_base_length, self.min_size, self.looseness, center)
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
        let placeholder = BoundsOctreeNode::new(self.initial_size, self.min_size, self.looseness, self.root.center);
        let root = std::mem::replace(&mut self.root, placeholder);
        self.root = root.shrink_if_possible(self.initial_size);
    }
}
