//! Ray type for recursive ray tracing.
//!
//! Besides origin and direction, a ray carries the bookkeeping the transport
//! loop needs: which kind of ray it is, the pixel it contributes to, the render
//! generation it belongs to, and the accumulated weight of its branch.

use lucent_math::{Color, Vec3};

/// Minimum parametric distance for secondary and shadow rays.
///
/// Keeps a ray from re-hitting the surface it starts on.
pub const RAY_EPSILON: f32 = 1e-3;

/// What a ray is being traced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayKind {
    /// Camera rays and shadow (light visibility) rays
    Visibility,
    /// Mirror-reflected rays
    Reflection,
    /// Transmitted rays (including total-internal-reflection substitutes)
    Refraction,
}

/// Output pixel a ray contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRef {
    pub x: u32,
    pub y: u32,
}

/// A ray with origin, direction and transport bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    origin: Vec3,
    /// Direction vector (not necessarily normalized)
    direction: Vec3,
    /// Pixel this ray's color ends up in, if any
    pixel: Option<PixelRef>,
    /// Render pass counter
    generation: u32,
    /// Product of the coefficients along the path from the camera
    attenuation: Color,
    kind: RayKind,
}

impl Ray {
    /// Create a new ray with unit weight and no pixel.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, kind: RayKind) -> Self {
        Self {
            origin,
            direction,
            pixel: None,
            generation: 0,
            attenuation: Color::ONE,
            kind,
        }
    }

    /// Attach the output pixel.
    pub fn with_pixel(mut self, pixel: PixelRef) -> Self {
        self.pixel = Some(pixel);
        self
    }

    /// Set the render pass counter.
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// Set the accumulated branch weight.
    pub fn with_attenuation(mut self, attenuation: Color) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Derive a secondary ray. Pixel and generation carry over; the branch
    /// weight is multiplied by `weight`.
    pub fn spawn(&self, origin: Vec3, direction: Vec3, kind: RayKind, weight: Color) -> Ray {
        Ray {
            origin,
            direction,
            pixel: self.pixel,
            generation: self.generation,
            attenuation: self.attenuation * weight,
            kind,
        }
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn kind(&self) -> RayKind {
        self.kind
    }

    #[inline]
    pub fn pixel(&self) -> Option<PixelRef> {
        self.pixel
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn attenuation(&self) -> Color {
        self.attenuation
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// True if the direction is zero or not finite; such rays hit nothing.
    pub fn is_degenerate(&self) -> bool {
        !self.direction.is_finite()
            || !self.origin.is_finite()
            || self.direction.length_squared() < f32::MIN_POSITIVE
    }

    /// Geometric view of the ray for bounding-box tests.
    #[inline]
    pub fn geometry(&self) -> lucent_math::Ray {
        lucent_math::Ray::new(self.origin, self.direction)
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z, RayKind::Visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), RayKind::Visibility);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_spawn_inherits_pixel_and_weight() {
        let parent = Ray::new(Vec3::ZERO, Vec3::Z, RayKind::Visibility)
            .with_pixel(PixelRef { x: 3, y: 7 })
            .with_generation(2)
            .with_attenuation(Color::new(0.5, 1.0, 1.0));

        let child = parent.spawn(Vec3::ONE, Vec3::X, RayKind::Reflection, Color::splat(0.5));

        assert_eq!(child.pixel(), Some(PixelRef { x: 3, y: 7 }));
        assert_eq!(child.generation(), 2);
        assert_eq!(child.attenuation(), Color::new(0.25, 0.5, 0.5));
        assert_eq!(child.kind(), RayKind::Reflection);
        assert_eq!(child.origin(), Vec3::ONE);
    }

    #[test]
    fn test_degenerate_rays() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO, RayKind::Visibility).is_degenerate());
        assert!(Ray::new(Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 1.0), RayKind::Visibility)
            .is_degenerate());
        assert!(!Ray::default().is_degenerate());
    }
}
