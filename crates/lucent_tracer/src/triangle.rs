//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{LocalHit, Primitive, Ray};
use lucent_math::{Aabb, Interval, Vec2, Vec3};

/// Determinants below this mean the ray runs parallel to the triangle.
const PARALLEL_DET: f32 = 1e-8;

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, zero for degenerate triangles)
    normal: Vec3,
    /// Parametric coordinates at each vertex
    uvs: [Vec2; 3],
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The face normal follows the right-hand rule over `v0, v1, v2`.
    /// Surface coordinates default to the barycentric weights of `v1` and `v2`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        // Flat triangles keep a zero-thickness box; the kd-tree places them
        // using the normal sign.
        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            v1,
            v2,
            normal,
            uvs: [Vec2::ZERO, Vec2::X, Vec2::Y],
            bbox,
        }
    }

    /// Assign per-vertex surface coordinates.
    pub fn with_uvs(mut self, uv0: Vec2, uv1: Vec2, uv2: Vec2) -> Self {
        self.uvs = [uv0, uv1, uv2];
        self
    }

    /// Face normal (unit length).
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }
}

impl Primitive for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn local_intersect(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_DET {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        // Check if intersection is outside triangle (u parameter)
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);

        // Check if intersection is outside triangle (v parameter)
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        let [uv0, uv1, uv2] = self.uvs;
        Some(LocalHit {
            t,
            normal: self.normal,
            uv: uv0 * (1.0 - u - v) + uv1 * u + uv2 * v,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn reference_normal_sign(&self, axis: usize) -> i8 {
        let n = self.normal[axis];
        if n > 0.0 {
            1
        } else if n < 0.0 {
            -1
        } else {
            0
        }
    }
}
