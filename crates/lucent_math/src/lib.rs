// Re-export glam for convenience
pub use glam::*;

// Lucent math types
mod aabb;
mod interval;
mod ray;

pub use aabb::{Aabb, PARALLEL_EPSILON};
pub use interval::Interval;
pub use ray::Ray;

/// Linear RGB color, one `f32` per channel.
pub type Color = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_vec3() {
        let c: Color = Color::new(0.25, 0.5, 1.0);
        assert_eq!(c * 2.0, Vec3::new(0.5, 1.0, 2.0));
    }
}
