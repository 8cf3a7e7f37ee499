//! Pinhole camera for primary ray generation.

use crate::{Ray, RayKind};
use lucent_math::Vec3;

/// Pinhole camera addressed in normalized window coordinates.
///
/// `(0, 0)` is the bottom-left corner of the image plane and `(1, 1)` the
/// top-right.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    /// Vertical field of view in degrees
    vfov: f32,
    /// Width over height
    aspect_ratio: f32,

    // Cached basis, recomputed by every setter
    look: Vec3,
    u: Vec3,
    v: Vec3,
}

impl Camera {
    /// Camera at the origin looking down -Z with a 90 degree field of view.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 1.0,
            look: -Vec3::Z,
            u: Vec3::X,
            v: Vec3::Y,
        };
        camera.update();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update();
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.update();
        self
    }

    /// Set image aspect ratio (width / height).
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.update();
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    /// Unit viewing direction.
    pub fn look(&self) -> Vec3 {
        self.look
    }

    /// Primary ray through normalized window coordinates `(x, y)`.
    pub fn ray_through(&self, x: f32, y: f32) -> Ray {
        let dir = self.look + (x - 0.5) * self.u + (y - 0.5) * self.v;
        Ray::new(self.look_from, dir.normalize_or_zero(), RayKind::Visibility)
    }

    fn update(&mut self) {
        let look = (self.look_at - self.look_from).normalize_or_zero();
        self.look = if look == Vec3::ZERO { -Vec3::Z } else { look };

        // Pick any perpendicular up when vup is parallel to the view
        let mut right = self.look.cross(self.vup).normalize_or_zero();
        if right == Vec3::ZERO {
            right = self.look.any_orthonormal_vector();
        }
        let up = right.cross(self.look);

        let half_height = (self.vfov.to_radians() / 2.0).tan();
        let aspect = if self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else {
            1.0
        };

        self.v = up * 2.0 * half_height;
        self.u = right * self.v.length() * aspect;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
