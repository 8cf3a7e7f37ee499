//! Texture loading and bilinear sampling for material parameters.
//!
//! Textures are addressed with parametric coordinates on the unit square,
//! `(0, 0)` at the bottom-left corner of the image.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lucent_math::Color;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported texture format: {0}")]
    UnsupportedFormat(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Color returned for textures without pixel data.
const MISSING_TEXEL: Color = Color::ONE;

/// A loaded texture with linear RGB pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Linear RGB texels, row-major, first row at the top of the image
    pub pixels: Vec<[f32; 3]>,

    /// Source path (for diagnostics)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Color) -> Self {
        Self::new(1, 1, vec![color.to_array()], "<solid>")
    }

    /// Placeholder for an image that could not be loaded.
    ///
    /// Samples as white so a render can proceed without the data.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(0, 0, Vec::new(), path)
    }

    /// True if the texture holds a full grid of texels.
    pub fn has_data(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() >= self.width as usize * self.height as usize
    }

    /// Sample the texture at parametric coordinates with bilinear filtering.
    ///
    /// `(u, v)` is clamped to the unit square and mapped to continuous pixel
    /// coordinates. The four nearest texel centers are blended by the
    /// fractional offsets; lookups past the border repeat the edge texel.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if !self.has_data() {
            return MISSING_TEXEL;
        }

        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

        // Texel centers sit at half-integer coordinates
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let p00 = self.texel(x0, y0);
        let p10 = self.texel(x0 + 1, y0);
        let p01 = self.texel(x0, y0 + 1);
        let p11 = self.texel(x0 + 1, y0 + 1);

        let top = p00.lerp(p10, fx);
        let bottom = p01.lerp(p11, fx);
        top.lerp(bottom, fy)
    }

    /// Texel at integer coordinates, clamped to the image.
    pub fn texel(&self, x: i64, y: i64) -> Color {
        if !self.has_data() {
            return MISSING_TEXEL;
        }
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let idx = y * self.width as usize + x;
        self.pixels
            .get(idx)
            .map(|p| Color::from_array(*p))
            .unwrap_or(MISSING_TEXEL)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 3]>()
    }
}

/// Cache for textures shared between materials.
///
/// Each path is decoded once; materials hold `Arc<Texture>` handles.
pub struct TextureCache {
    /// Cached textures by requested path
    textures: HashMap<String, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using the cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Load a texture, substituting the white placeholder on failure.
    ///
    /// The failure is logged and the placeholder is cached under `path`.
    pub fn load_or_placeholder(&mut self, path: &str) -> Arc<Texture> {
        match self.load(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Texture '{}' unavailable, sampling as white: {}", path, e);
                let placeholder = Arc::new(Texture::missing(path));
                self.textures.insert(path.to_string(), placeholder.clone());
                placeholder
            }
        }
    }

    /// Get a cached texture without loading.
    pub fn get(&self, path: &str) -> Option<Arc<Texture>> {
        self.textures.get(path).cloned()
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image file into a linear RGB texture.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    if !path.exists() {
        return Err(TextureError::LoadError(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let img = image::open(path)?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::UnsupportedFormat(format!(
            "{} has no pixels",
            path.display()
        )));
    }

    let pixels = rgb
        .pixels()
        .map(|p| [srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])])
        .collect();

    Ok(Texture::new(width, height, pixels, path.to_string_lossy()))
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_2x2() -> Texture {
        // Top row: red, green. Bottom row: blue, white.
        Texture::new(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
            "<checker>",
        )
    }

    fn approx(a: Color, b: Color) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Color::new(1.0, 0.5, 0.0));
        assert!(approx(tex.sample(0.5, 0.5), Color::new(1.0, 0.5, 0.0)));
        assert!(approx(tex.sample(0.0, 1.0), Color::new(1.0, 0.5, 0.0)));
    }

    #[test]
    fn test_sample_at_texel_centers() {
        let tex = checker_2x2();

        // Texel centers of a 2x2 image are at u, v in {0.25, 0.75}
        assert!(approx(tex.sample(0.25, 0.75), Color::new(1.0, 0.0, 0.0)));
        assert!(approx(tex.sample(0.75, 0.75), Color::new(0.0, 1.0, 0.0)));
        assert!(approx(tex.sample(0.25, 0.25), Color::new(0.0, 0.0, 1.0)));
        assert!(approx(tex.sample(0.75, 0.25), Color::ONE));
    }

    #[test]
    fn test_sample_bilinear_blend() {
        let tex = checker_2x2();

        // Image center is equidistant from all four texel centers
        let center = tex.sample(0.5, 0.5);
        assert!(approx(center, Color::new(0.5, 0.5, 0.5)));

        // Halfway between the two top texels
        let top_mid = tex.sample(0.5, 0.75);
        assert!(approx(top_mid, Color::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn test_sample_clamps_to_edges() {
        let tex = checker_2x2();

        assert!(approx(tex.sample(0.0, 1.0), Color::new(1.0, 0.0, 0.0)));
        assert!(approx(tex.sample(-3.0, 7.0), Color::new(1.0, 0.0, 0.0)));
        assert!(approx(tex.sample(1.0, 0.0), Color::ONE));
    }

    #[test]
    fn test_missing_texture_samples_white() {
        let tex = Texture::missing("nowhere.png");
        assert!(!tex.has_data());
        assert_eq!(tex.sample(0.3, 0.7), Color::ONE);
        assert_eq!(tex.texel(5, 5), Color::ONE);
    }

    #[test]
    fn test_texture_cache_placeholder() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut cache = TextureCache::with_base_dir("/definitely/not/here");
        assert!(cache.is_empty());
        assert!(cache.load("missing.png").is_err());

        let placeholder = cache.load_or_placeholder("missing.png");
        assert!(!placeholder.has_data());
        assert_eq!(cache.len(), 1);
        assert!(cache.get("missing.png").is_some());
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
