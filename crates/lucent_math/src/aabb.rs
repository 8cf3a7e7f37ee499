use crate::{Interval, Ray, Vec3};

/// Direction components smaller than this are treated as parallel to an axis
/// plane; no division by them is ever performed.
pub const PARALLEL_EPSILON: f32 = 1e-8;

/// Axis-Aligned Bounding Box used by the kd-tree.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Zero-thickness boxes are valid (a flat primitive, or a node clipped exactly
/// at a primitive's extent).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals, swapping reversed bounds.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self {
            x: Interval::ordered(x.min, x.max),
            y: Interval::ordered(y.min, y.max),
            z: Interval::ordered(z.min, z.max),
        }
    }

    /// Create an AABB from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::ordered(a.x, b.x),
            y: Interval::ordered(a.y, b.y),
            z: Interval::ordered(a.z, b.z),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Grow this box to also enclose `other`.
    pub fn union_with(&mut self, other: &Aabb) {
        *self = Aabb::surrounding(self, other);
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    fn axis_interval_mut(&mut self, n: usize) -> &mut Interval {
        match n {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    /// Move the lower face on `axis` to `value`.
    pub fn set_min(&mut self, axis: usize, value: f32) {
        self.axis_interval_mut(axis).min = value;
    }

    /// Move the upper face on `axis` to `value`.
    pub fn set_max(&mut self, axis: usize, value: f32) {
        self.axis_interval_mut(axis).max = value;
    }

    /// Total surface area: twice the sum of the three face areas.
    ///
    /// Empty boxes have zero area.
    pub fn area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max() - self.min();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// True if any axis holds no value.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// True if any bound is NaN.
    pub fn has_nan(&self) -> bool {
        self.x.has_nan() || self.y.has_nan() || self.z.has_nan()
    }

    /// True if every bound is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// True if the two closed boxes share at least one point.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x.overlaps(&other.x) && self.y.overlaps(&other.y) && self.z.overlaps(&other.z)
    }

    /// Clip the parametric range `ray_t` to the part of the ray inside the box.
    ///
    /// Uses the slab method. Direction components below [`PARALLEL_EPSILON`]
    /// are handled by testing the origin against the slab instead of dividing.
    /// Returns `None` if the ray misses the box within `ray_t`.
    pub fn clip_ray(&self, r: &Ray, mut ray_t: Interval) -> Option<Interval> {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let o = r.origin[axis];
            let d = r.direction[axis];

            if d.abs() < PARALLEL_EPSILON {
                if !slab.contains(o) {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (slab.min - o) * inv;
            let mut t1 = (slab.max - o) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return None;
            }
        }
        Some(ray_t)
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points_normalizes() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_aabb_new_swaps_reversed_interval() {
        let aabb = Aabb::new(
            Interval::new(1.0, -1.0),
            Interval::new(0.0, 1.0),
            Interval::new(0.0, 1.0),
        );
        assert_eq!(aabb.x, Interval::new(-1.0, 1.0));
    }

    #[test]
    fn test_aabb_area() {
        let cube = Aabb::from_points(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(cube.area(), 24.0);

        let slab = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(slab.area(), 2.0 * (2.0 + 6.0 + 3.0));

        // Flat boxes keep the area of their two faces
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(flat.area(), 2.0);

        assert_eq!(Aabb::EMPTY.area(), 0.0);
    }

    #[test]
    fn test_aabb_set_min_max() {
        let mut aabb = Aabb::from_points(Vec3::ZERO, Vec3::splat(4.0));
        aabb.set_max(0, 1.0);
        aabb.set_min(2, 3.0);

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 4.0, 4.0));
    }

    #[test]
    fn test_aabb_union() {
        let mut aabb = Aabb::EMPTY;
        aabb.union_with(&Aabb::from_points(Vec3::ZERO, Vec3::ONE));
        aabb.union_with(&Aabb::from_points(Vec3::splat(-2.0), Vec3::splat(-1.0)));

        assert_eq!(aabb.min(), Vec3::splat(-2.0));
        assert_eq!(aabb.max(), Vec3::ONE);
    }

    #[test]
    fn test_aabb_nan_detection() {
        let bad = Aabb::from_points(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE);
        assert!(bad.has_nan());
        assert!(!Aabb::from_points(Vec3::ZERO, Vec3::ONE).has_nan());
    }

    #[test]
    fn test_aabb_overlaps_touching_faces() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::from_points(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_aabb_clip_ray() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = aabb.clip_ray(&ray, Interval::new(0.0, 100.0)).unwrap();
        assert_eq!(t, Interval::new(4.0, 6.0));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(aabb.clip_ray(&ray, Interval::new(0.0, 100.0)).is_none());

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(aabb.clip_ray(&ray, Interval::new(0.0, 100.0)).is_none());
    }

    #[test]
    fn test_aabb_clip_ray_flat_box() {
        let flat = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), -Vec3::Z);

        let t = flat.clip_ray(&ray, Interval::new(0.0, f32::INFINITY)).unwrap();
        assert_eq!(t.min, 3.0);
        assert_eq!(t.max, 3.0);
    }

    #[test]
    fn test_aabb_clip_ray_parallel_component() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);

        // Travels along X with origin inside the Y and Z slabs
        let inside = Ray::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::X);
        let t = aabb.clip_ray(&inside, Interval::UNIVERSE).unwrap();
        assert_eq!(t, Interval::new(1.0, 2.0));

        // Same direction but outside the Y slab
        let outside = Ray::new(Vec3::new(-1.0, 2.0, 0.5), Vec3::X);
        assert!(aabb.clip_ray(&outside, Interval::UNIVERSE).is_none());
    }
}
