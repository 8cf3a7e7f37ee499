//! Light sources.
//!
//! Lights report a color, the direction and distance toward them from a
//! world point, how much that point is dimmed by distance, and how much by
//! occluders. Shadow tests cast visibility rays through the scene; transmissive
//! occluders pass light through scaled by their `kt`.

use crate::{Ray, RayKind, Scene, RAY_EPSILON};
use lucent_math::{Color, Interval, Vec3};

/// Stop walking through transmissive occluders after this many surfaces.
const MAX_SHADOW_HOPS: usize = 32;

/// Trait for light sources.
pub trait Light: Send + Sync {
    /// Emitted color.
    fn color(&self) -> Color;

    /// Unit vector from `p` toward the light.
    fn direction_to_light(&self, p: Vec3) -> Vec3;

    /// Distance from `p` to the light; infinite for lights at infinity.
    fn distance_to_light(&self, p: Vec3) -> f32;

    /// Falloff multiplier in `[0, 1]` at `p`.
    fn distance_attenuation(&self, p: Vec3) -> f32;

    /// Per-channel occlusion multiplier between `p` and the light.
    ///
    /// `1` means unoccluded, `0` fully shadowed. Surfaces within
    /// [`RAY_EPSILON`] of either end are ignored.
    fn shadow_attenuation(&self, scene: &Scene, ray: &Ray, p: Vec3) -> Color {
        let direction = self.direction_to_light(p);
        if direction == Vec3::ZERO {
            return Color::ONE;
        }

        let mut remaining = self.distance_to_light(p);
        let mut origin = p;
        let mut atten = Color::ONE;

        for _ in 0..MAX_SHADOW_HOPS {
            let shadow_ray = ray.spawn(origin, direction, RayKind::Visibility, Color::ONE);
            let window = Interval::new(RAY_EPSILON, remaining - RAY_EPSILON);
            if window.is_empty() {
                break;
            }

            let Some(hit) = scene.intersect(&shadow_ray, window) else {
                break;
            };

            atten *= hit.material.kt.value(hit.uv).max(Color::ZERO);
            if atten == Color::ZERO {
                return Color::ZERO;
            }

            origin = shadow_ray.at(hit.t);
            remaining -= hit.t;
        }

        atten
    }
}

/// Light emitted from a single point with polynomial falloff.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    color: Color,
    constant: f32,
    linear: f32,
    quadratic: f32,
}

impl PointLight {
    /// Point light without falloff.
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color,
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }

    /// Set the falloff coefficients of `1 / (a + b d + c d^2)`.
    pub fn with_falloff(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl Light for PointLight {
    fn color(&self) -> Color {
        self.color
    }

    fn direction_to_light(&self, p: Vec3) -> Vec3 {
        (self.position - p).normalize_or_zero()
    }

    fn distance_to_light(&self, p: Vec3) -> f32 {
        self.position.distance(p)
    }

    fn distance_attenuation(&self, p: Vec3) -> f32 {
        let d = self.distance_to_light(p);
        let denom = self.constant + self.linear * d + self.quadratic * d * d;
        if denom <= 0.0 || !denom.is_finite() {
            return 1.0;
        }
        (1.0 / denom).min(1.0)
    }
}

/// Light arriving from a fixed direction, such as sunlight.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Direction the light travels (unit length)
    direction: Vec3,
    color: Color,
}

impl DirectionalLight {
    /// `direction` is the direction the light travels, not the direction toward it.
    pub fn new(direction: Vec3, color: Color) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
        }
    }
}

impl Light for DirectionalLight {
    fn color(&self) -> Color {
        self.color
    }

    fn direction_to_light(&self, _p: Vec3) -> Vec3 {
        -self.direction
    }

    fn distance_to_light(&self, _p: Vec3) -> f32 {
        f32::INFINITY
    }

    fn distance_attenuation(&self, _p: Vec3) -> f32 {
        1.0
    }
}
