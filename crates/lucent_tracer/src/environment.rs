//! Background lookups for rays that leave the scene.

use std::sync::Arc;

use lucent_core::{Texture, TextureCache};
use lucent_math::{Color, Vec3};

use crate::TracerResult;

/// Color seen along a direction with nothing in the way.
pub trait Environment: Send + Sync {
    fn color_for_direction(&self, direction: Vec3) -> Color;
}

/// Face order of a [`CubeMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX = 0,
    NegativeX = 1,
    PositiveY = 2,
    NegativeY = 3,
    PositiveZ = 4,
    NegativeZ = 5,
}

/// Six-texture environment, faces in +X, -X, +Y, -Y, +Z, -Z order.
///
/// Faces follow the usual cube-map layout: looking from the center at a
/// face, its image is upright with +Y up for the side faces.
#[derive(Debug, Clone)]
pub struct CubeMap {
    faces: [Arc<Texture>; 6],
}

impl CubeMap {
    pub fn new(faces: [Arc<Texture>; 6]) -> Self {
        Self { faces }
    }

    /// Load the six faces through `cache`.
    ///
    /// Faces that cannot be read fall back to the white placeholder.
    pub fn from_cache(cache: &mut TextureCache, paths: [&str; 6]) -> Self {
        Self::new(paths.map(|path| cache.load_or_placeholder(path)))
    }

    /// Load the six faces, failing on the first unreadable one.
    pub fn load(cache: &mut TextureCache, paths: [&str; 6]) -> TracerResult<Self> {
        let [px, nx, py, ny, pz, nz] = paths;
        Ok(Self::new([
            cache.load(px)?,
            cache.load(nx)?,
            cache.load(py)?,
            cache.load(ny)?,
            cache.load(pz)?,
            cache.load(nz)?,
        ]))
    }

    pub fn face(&self, face: CubeFace) -> &Arc<Texture> {
        &self.faces[face as usize]
    }

    /// Face and texture coordinates hit by `direction`.
    pub fn face_coordinates(direction: Vec3) -> Option<(CubeFace, f32, f32)> {
        let Vec3 { x, y, z } = direction;
        let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
        if !direction.is_finite() || ax.max(ay).max(az) == 0.0 {
            return None;
        }

        // Major axis picks the face; sc/tc follow the OpenGL table
        let (face, sc, tc, ma) = if ax >= ay && ax >= az {
            if x > 0.0 {
                (CubeFace::PositiveX, -z, -y, ax)
            } else {
                (CubeFace::NegativeX, z, -y, ax)
            }
        } else if ay >= az {
            if y > 0.0 {
                (CubeFace::PositiveY, x, z, ay)
            } else {
                (CubeFace::NegativeY, x, -z, ay)
            }
        } else if z > 0.0 {
            (CubeFace::PositiveZ, x, -y, az)
        } else {
            (CubeFace::NegativeZ, -x, -y, az)
        };

        let s = 0.5 * (sc / ma + 1.0);
        let t = 0.5 * (tc / ma + 1.0);
        Some((face, s, t))
    }
}

impl Environment for CubeMap {
    fn color_for_direction(&self, direction: Vec3) -> Color {
        match Self::face_coordinates(direction) {
            // t runs down the face image; texture v runs up
            Some((face, s, t)) => self.face(face).sample(s, 1.0 - t),
            None => Color::ZERO,
        }
    }
}

/// Single color in every direction.
#[derive(Debug, Clone, Copy)]
pub struct ConstantEnvironment(pub Color);

impl Environment for ConstantEnvironment {
    fn color_for_direction(&self, _direction: Vec3) -> Color {
        self.0
    }
}
