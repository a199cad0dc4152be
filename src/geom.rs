//! Geometric predicates shared by the point and bounds octrees.
//!
//! The octree core treats these types as opaque contracts supplied by a
//! math library (glam, here) — it never implements vector/matrix algebra
//! of its own. This module only adds the handful of octree-specific
//! predicates (`encapsulates`, `intersects`, closest point on an AABB,
//! squared point-to-ray distance, AABB-vs-frustum) layered on top.

use glam::{Mat4, Vec3, Vec4};

// ===== AABB =====

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Construct an AABB from a center and a (non-negative) side length.
    pub fn from_center_size(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size * 0.5);
        Aabb { min: center - half, max: center + half }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Test if this AABB fully contains a point.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Test if this AABB fully encapsulates another AABB.
    pub fn encapsulates(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Test if this AABB overlaps (or touches) another AABB.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Grow this AABB by `amount` on every face.
    pub fn expanded(&self, amount: f32) -> Aabb {
        let delta = Vec3::splat(amount);
        Aabb { min: self.min - delta, max: self.max + delta }
    }

    /// The point on (or inside) this AABB closest to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Squared distance from `p` to the closest point on this AABB (0 if inside).
    pub fn sqr_distance_to_point(&self, p: Vec3) -> f32 {
        self.closest_point(p).distance_squared(p)
    }

    /// Ray/AABB intersection via the slab method.
    ///
    /// Returns the entry distance along the ray if it intersects, `None`
    /// otherwise. `ray.direction` need not be normalized for this test.
    pub fn intersects_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if dir.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t1 = (lo - origin) * inv;
            let mut t2 = (hi - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

// ===== RAY =====

/// A ray, defined by an origin and a direction.
///
/// Queries that measure perpendicular distance (`sqr_distance_to_ray`)
/// require `direction` to be unit-length; callers are responsible for
/// normalizing it before calling into the octree.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray { origin, direction }
    }

    /// Squared perpendicular distance from `point` to this ray.
    ///
    /// Requires `self.direction` to be unit length.
    pub fn sqr_distance_to_point(&self, point: Vec3) -> f32 {
        self.direction.cross(point - self.origin).length_squared()
    }
}

// ===== FRUSTUM =====

/// Frustum plane indices.
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes for culling.
///
/// Each plane is `(A, B, C, D)` with `Ax + By + Cz + D = 0`, normal
/// `(A, B, C)` pointing inward. The caller supplies the planes (e.g. via
/// [`Frustum::from_view_projection`]); the octree only consumes them.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Build a frustum directly from six caller-supplied planes.
    pub fn new(planes: [Vec4; 6]) -> Self {
        Frustum { planes }
    }

    /// Extract frustum planes from a view-projection matrix (Gribb & Hartmann).
    ///
    /// Works for both perspective and orthographic projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        let mut planes = [
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]),
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        for plane in &mut planes {
            let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Frustum { planes }
    }

    /// Test whether an AABB is (potentially) inside or intersecting this frustum.
    ///
    /// Uses the "positive vertex" test against each plane: conservative,
    /// never a false negative, may be a false positive at grazing angles.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }
}
