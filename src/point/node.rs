//! Recursive node for the point octree.
//!
//! Each node owns its direct object records and, once split, owns
//! exactly 8 children. There is no arena: a parent's `children` field
//! is the sole owner of its child nodes (see DESIGN.md for the
//! arena-vs-owning-tree tradeoff this crate made).

use glam::Vec3;

use crate::consts::NUM_OBJECTS_ALLOWED;
use crate::geom::{Aabb, Ray};

/// A single stored object: the caller's payload plus the point that
/// located it at insertion time.
#[derive(Clone)]
pub(crate) struct PointObject<T> {
    pub(crate) payload: T,
    pub(crate) point: Vec3,
}

pub(crate) struct PointOctreeNode<T> {
    pub(crate) center: Vec3,
    pub(crate) base_length: f32,
    min_size: f32,
    bounds: Aabb,
    objects: Vec<PointObject<T>>,
    children: Option<Box<[PointOctreeNode<T>; 8]>>,
}

impl<T> PointOctreeNode<T> {
    pub(crate) fn new(base_length: f32, min_size: f32, center: Vec3) -> Self {
        PointOctreeNode {
            center,
            base_length,
            min_size,
            bounds: Aabb::from_center_size(center, base_length),
            objects: Vec::new(),
            children: None,
        }
    }

    pub(crate) fn has_any_objects(&self) -> bool {
        if !self.objects.is_empty() {
            return true;
        }
        match &self.children {
            Some(children) => children.iter().any(|c| c.has_any_objects()),
            None => false,
        }
    }

    pub(crate) fn set_children(&mut self, children: [PointOctreeNode<T>; 8]) {
        self.children = Some(Box::new(children));
    }

    /// The octant index (0-7) that `point` falls into relative to `center`.
    ///
    /// `idx = (x > cx) + 2*(z > cz) + 4*(y < cy)` — see SPEC_FULL.md §4.1.
    /// This bit layout (and its inverse in [`Self::child_center`]) is part
    /// of the externally observable contract: grow/shrink correctness
    /// depends on both ends agreeing.
    pub(crate) fn best_fit_child(center: Vec3, point: Vec3) -> usize {
        let mut idx = 0usize;
        if point.x > center.x {
            idx += 1;
        }
        if point.z > center.z {
            idx += 2;
        }
        if point.y < center.y {
            idx += 4;
        }
        idx
    }

    /// Center of child `idx` of a node with the given `center`/`base_length`.
    pub(crate) fn child_center(center: Vec3, base_length: f32, idx: usize) -> Vec3 {
        let q = base_length / 4.0;
        let x = if idx & 1 != 0 { q } else { -q };
        let z = if idx & 2 != 0 { q } else { -q };
        let y = if idx & 4 != 0 { -q } else { q };
        center + Vec3::new(x, y, z)
    }

    fn split(&mut self) {
        let child_length = self.base_length / 2.0;
        let children: Vec<PointOctreeNode<T>> = (0..8)
            .map(|idx| {
                let center = Self::child_center(self.center, self.base_length, idx);
                PointOctreeNode::new(child_length, self.min_size, center)
            })
            .collect();
        self.children = Some(Box::new(children.try_into().unwrap_or_else(|_| {
            unreachable!("split always builds exactly 8 children")
        })));
    }

    /// Add `pending`'s object into this subtree, taking it out of
    /// `pending` only once placement is guaranteed to succeed.
    ///
    /// Returns `false` (leaving `pending` untouched) if `point` isn't
    /// encapsulated by this node's bounds — the tree facade grows the
    /// root and retries in that case.
    pub(crate) fn try_add(&mut self, pending: &mut Option<PointObject<T>>) -> bool {
        let point = pending.as_ref().expect("try_add called with empty pending").point;
        if !self.bounds.contains_point(point) {
            return false;
        }

        if self.children.is_none() {
            if self.objects.len() < NUM_OBJECTS_ALLOWED || self.base_length / 2.0 < self.min_size {
                self.objects.push(pending.take().unwrap());
                return true;
            }

            self.split();
            for existing in std::mem::take(&mut self.objects) {
                let idx = Self::best_fit_child(self.center, existing.point);
                self.children.as_mut().unwrap()[idx].objects.push(existing);
            }
        }

        let idx = Self::best_fit_child(self.center, point);
        self.children.as_mut().unwrap()[idx].try_add(pending)
    }

    fn should_merge(&self) -> bool {
        match &self.children {
            None => false,
            Some(children) => {
                if children.iter().any(|c| c.children.is_some()) {
                    return false;
                }
                let total: usize = self.objects.len()
                    + children.iter().map(|c| c.objects.len()).sum::<usize>();
                total <= NUM_OBJECTS_ALLOWED
            }
        }
    }

    fn merge(&mut self) {
        if let Some(children) = self.children.take() {
            for child in *children {
                self.objects.extend(child.objects);
            }
        }
    }

    /// Remove `payload` by scanning this node and, if absent here, every
    /// descendant. Slower than [`Self::remove_at`] but doesn't require
    /// knowing where the object was inserted.
    pub(crate) fn remove(&mut self, payload: &T) -> bool
    where
        T: PartialEq,
    {
        let found = if let Some(pos) = self.objects.iter().position(|o| &o.payload == payload) {
            self.objects.remove(pos);
            true
        } else if let Some(children) = &mut self.children {
            children.iter_mut().any(|c| c.remove(payload))
        } else {
            false
        };

        if found && self.should_merge() {
            self.merge();
        }
        found
    }

    /// Remove `payload` known to be located at `point`, pruning by
    /// encapsulation instead of scanning every child.
    pub(crate) fn remove_at(&mut self, payload: &T, point: Vec3) -> bool
    where
        T: PartialEq,
    {
        if !self.bounds.contains_point(point) {
            return false;
        }

        let found = if let Some(pos) = self.objects.iter().position(|o| &o.payload == payload) {
            self.objects.remove(pos);
            true
        } else if let Some(children) = &mut self.children {
            let idx = Self::best_fit_child(self.center, point);
            children[idx].remove_at(payload, point)
        } else {
            false
        };

        if found && self.should_merge() {
            self.merge();
        }
        found
    }

    /// Consume this node, returning either itself or a replacement root
    /// shaped by §4.7. Only ever called on the root.
    pub(crate) fn shrink_if_possible(mut self, min_length: f32) -> Self {
        if self.base_length < 2.0 * min_length {
            return self;
        }
        if self.objects.is_empty() && self.children.is_none() {
            return self;
        }

        let mut best_fit: Option<usize> = None;
        for o in &self.objects {
            let idx = Self::best_fit_child(self.center, o.point);
            match best_fit {
                None => best_fit = Some(idx),
                Some(bf) if bf != idx => return self,
                _ => {}
            }
        }

        match self.children.take() {
            None => match best_fit {
                None => self,
                Some(idx) => {
                    let new_center = Self::child_center(self.center, self.base_length, idx);
                    self.base_length /= 2.0;
                    self.center = new_center;
                    self.bounds = Aabb::from_center_size(new_center, self.base_length);
                    self
                }
            },
            Some(children) => {
                let mut non_empty: Option<usize> = None;
                for (i, c) in children.iter().enumerate() {
                    if c.has_any_objects() {
                        if non_empty.is_some() {
                            self.children = Some(children);
                            return self;
                        }
                        non_empty = Some(i);
                    }
                }

                if let (Some(bf), Some(ne)) = (best_fit, non_empty) {
                    if bf != ne {
                        self.children = Some(children);
                        return self;
                    }
                }

                match non_empty.or(best_fit) {
                    None => {
                        self.children = Some(children);
                        self
                    }
                    Some(idx) => {
                        let mut iter = Vec::from(*children).into_iter();
                        iter.nth(idx).expect("shrink target index in range")
                    }
                }
            }
        }
    }

    pub(crate) fn collect_all(&self, out: &mut Vec<T>)
    where
        T: Clone,
    {
        out.extend(self.objects.iter().map(|o| o.payload.clone()));
        if let Some(children) = &self.children {
            for c in children.iter() {
                c.collect_all(out);
            }
        }
    }

    pub(crate) fn get_nearby_point(&self, p: Vec3, max_dist: f32, out: &mut Vec<T>)
    where
        T: Clone,
    {
        if self.bounds.sqr_distance_to_point(p) > max_dist * max_dist {
            return;
        }
        let max_sq = max_dist * max_dist;
        for o in &self.objects {
            if o.point.distance_squared(p) <= max_sq {
                out.push(o.payload.clone());
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                c.get_nearby_point(p, max_dist, out);
            }
        }
    }

    pub(crate) fn get_nearby_ray(&self, ray: &Ray, max_dist: f32, out: &mut Vec<T>)
    where
        T: Clone,
    {
        let expanded = self.bounds.expanded(max_dist);
        if expanded.intersects_ray(ray).is_none() {
            return;
        }
        let max_sq = max_dist * max_dist;
        for o in &self.objects {
            if ray.sqr_distance_to_point(o.point) <= max_sq {
                out.push(o.payload.clone());
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                c.get_nearby_ray(ray, max_dist, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_fit_child_matches_formula() {
        let center = Vec3::ZERO;
        // x>cx, z<=cz, y>=cy -> idx = 1
        assert_eq!(PointOctreeNode::<()>::best_fit_child(center, Vec3::new(1.0, 0.5, -1.0)), 1);
        // boundary case: exactly on center falls to octant 0
        assert_eq!(PointOctreeNode::<()>::best_fit_child(center, center), 0);
        // x<=cx, z>cz, y<cy -> idx = 2 + 4 = 6
        assert_eq!(PointOctreeNode::<()>::best_fit_child(center, Vec3::new(-1.0, -1.0, 1.0)), 6);
    }

    #[test]
    fn child_center_is_inverse_of_best_fit_child() {
        let center = Vec3::new(2.0, -1.0, 3.0);
        let base_length = 4.0;
        for idx in 0..8 {
            let child = PointOctreeNode::<()>::child_center(center, base_length, idx);
            assert_eq!(PointOctreeNode::<()>::best_fit_child(center, child), idx);
        }
    }
}
