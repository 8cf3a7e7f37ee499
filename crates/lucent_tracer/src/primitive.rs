//! Primitive capability and intersection records.
//!
//! The tracer never looks inside a shape. It needs three things from one:
//! a local ray intersection, a bounding box, and a normal-sign hint used to
//! place flat shapes that lie exactly on a kd-tree split plane.

use crate::{Material, Ray};
use lucent_math::{Aabb, Interval, Vec2, Vec3};

/// Result of intersecting a ray with a single primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Outward surface normal (unit length)
    pub normal: Vec3,
    /// Surface parametric coordinates
    pub uv: Vec2,
}

/// Trait for geometry that rays can be tested against.
pub trait Primitive: Send + Sync {
    /// Nearest intersection with parameter inside `ray_t` (inclusive), if any.
    fn local_intersect(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit>;

    /// Axis-aligned bounds. Infinite bounds mark unbounded geometry.
    fn bounding_box(&self) -> Aabb;

    /// Sign (-1, 0, +1) of the outward normal along `axis`.
    ///
    /// Only consulted for primitives with zero extent on `axis` that sit
    /// exactly on a split plane. The default `0` places them on the upper side.
    fn reference_normal_sign(&self, _axis: usize) -> i8 {
        0
    }
}

impl<P: Primitive + ?Sized> Primitive for Box<P> {
    fn local_intersect(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        (**self).local_intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }

    fn reference_normal_sign(&self, axis: usize) -> i8 {
        (**self).reference_normal_sign(axis)
    }
}

/// Record of a ray-scene intersection.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Outward surface normal at the hit (unit length)
    pub normal: Vec3,
    /// Surface parametric coordinates
    pub uv: Vec2,
    /// Material of the primitive that was hit
    pub material: &'a Material,
    /// Index of the hit object in its scene
    pub object: usize,
}

impl<'a> Intersection<'a> {
    pub(crate) fn new(object: usize, hit: LocalHit, material: &'a Material) -> Self {
        Self {
            t: hit.t,
            normal: hit.normal.normalize_or_zero(),
            uv: hit.uv,
            material,
            object,
        }
    }

    /// World-space hit point on `ray`.
    #[inline]
    pub fn point(&self, ray: &Ray) -> Vec3 {
        ray.at(self.t)
    }
}

/// Closest hit among `indices` of `primitives` within `ray_t`.
///
/// Hits reported outside `ray_t` are discarded even if a primitive returns them.
pub(crate) fn closest_among<P, I>(
    primitives: &[P],
    indices: I,
    ray: &Ray,
    ray_t: Interval,
) -> Option<(usize, LocalHit)>
where
    P: Primitive,
    I: IntoIterator<Item = usize>,
{
    if ray_t.is_empty() {
        return None;
    }

    let mut closest: Option<(usize, LocalHit)> = None;
    let mut closest_so_far = ray_t.max;

    for index in indices {
        let Some(primitive) = primitives.get(index) else {
            continue;
        };
        let window = Interval::new(ray_t.min, closest_so_far);
        if let Some(hit) = primitive.local_intersect(ray, window) {
            if window.contains(hit.t) {
                closest_so_far = hit.t;
                closest = Some((index, hit));
            }
        }
    }

    closest
}

/// Closest hit over every primitive, without acceleration.
pub fn closest_hit<P: Primitive>(
    primitives: &[P],
    ray: &Ray,
    ray_t: Interval,
) -> Option<(usize, LocalHit)> {
    closest_among(primitives, 0..primitives.len(), ray, ray_t)
}
