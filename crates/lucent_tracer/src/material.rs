//! Phong material description.
//!
//! A material is a bag of coefficients. Every coefficient is a
//! [`MaterialParameter`]: a constant color or a texture sampled at the hit's
//! surface coordinates. Scalar coefficients (shininess, refractive index) use
//! the parameter's luminance.

use std::sync::Arc;

use lucent_core::Texture;
use lucent_math::{Color, Vec2};

/// Constant color or texture lookup.
#[derive(Debug, Clone)]
pub enum MaterialParameter {
    Constant(Color),
    Texture(Arc<Texture>),
}

impl MaterialParameter {
    /// Evaluate at surface coordinates `uv`.
    pub fn value(&self, uv: Vec2) -> Color {
        match self {
            MaterialParameter::Constant(c) => *c,
            MaterialParameter::Texture(t) => t.sample(uv.x, uv.y),
        }
    }

    /// NTSC luminance of [`value`](Self::value).
    pub fn intensity_value(&self, uv: Vec2) -> f32 {
        luminance(self.value(uv))
    }

    /// True for a constant black parameter. Textures are never treated as zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, MaterialParameter::Constant(c) if *c == Color::ZERO)
    }
}

impl Default for MaterialParameter {
    fn default() -> Self {
        MaterialParameter::Constant(Color::ZERO)
    }
}

impl From<Color> for MaterialParameter {
    fn from(c: Color) -> Self {
        MaterialParameter::Constant(c)
    }
}

impl From<f32> for MaterialParameter {
    fn from(v: f32) -> Self {
        MaterialParameter::Constant(Color::splat(v))
    }
}

impl From<Arc<Texture>> for MaterialParameter {
    fn from(t: Arc<Texture>) -> Self {
        MaterialParameter::Texture(t)
    }
}

/// 0.299 R + 0.587 G + 0.114 B
pub fn luminance(c: Color) -> f32 {
    0.299 * c.x + 0.587 * c.y + 0.114 * c.z
}

/// Surface coefficients for the Phong model and the recursive tracer.
#[derive(Debug, Clone)]
pub struct Material {
    /// Emissive
    pub ke: MaterialParameter,
    /// Ambient
    pub ka: MaterialParameter,
    /// Diffuse
    pub kd: MaterialParameter,
    /// Specular
    pub ks: MaterialParameter,
    /// Reflective
    pub kr: MaterialParameter,
    /// Transmissive
    pub kt: MaterialParameter,
    /// Phong exponent (luminance is used)
    pub shininess: MaterialParameter,
    /// Refractive index (luminance is used)
    pub index: MaterialParameter,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ke: MaterialParameter::default(),
            ka: MaterialParameter::default(),
            kd: MaterialParameter::default(),
            ks: MaterialParameter::default(),
            kr: MaterialParameter::default(),
            kt: MaterialParameter::default(),
            shininess: MaterialParameter::default(),
            index: MaterialParameter::from(1.0),
        }
    }
}

impl Material {
    /// Black, non-reflective, opaque material with index 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matte material with the given diffuse color.
    pub fn diffuse(kd: impl Into<MaterialParameter>) -> Self {
        Self::default().with_kd(kd)
    }

    pub fn with_ke(mut self, ke: impl Into<MaterialParameter>) -> Self {
        self.ke = ke.into();
        self
    }

    pub fn with_ka(mut self, ka: impl Into<MaterialParameter>) -> Self {
        self.ka = ka.into();
        self
    }

    pub fn with_kd(mut self, kd: impl Into<MaterialParameter>) -> Self {
        self.kd = kd.into();
        self
    }

    pub fn with_ks(mut self, ks: impl Into<MaterialParameter>) -> Self {
        self.ks = ks.into();
        self
    }

    pub fn with_kr(mut self, kr: impl Into<MaterialParameter>) -> Self {
        self.kr = kr.into();
        self
    }

    pub fn with_kt(mut self, kt: impl Into<MaterialParameter>) -> Self {
        self.kt = kt.into();
        self
    }

    pub fn with_shininess(mut self, shininess: impl Into<MaterialParameter>) -> Self {
        self.shininess = shininess.into();
        self
    }

    pub fn with_index(mut self, index: impl Into<MaterialParameter>) -> Self {
        self.index = index.into();
        self
    }

    /// True if the material can spawn reflection rays.
    pub fn is_reflective(&self) -> bool {
        !self.kr.is_zero()
    }

    /// True if the material can spawn refraction rays.
    pub fn is_transmissive(&self) -> bool {
        !self.kt.is_zero()
    }
}
