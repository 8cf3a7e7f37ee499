//! Render and acceleration-structure settings.
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```json
//! { "width": 640, "height": 480, "max_depth": 8, "kd_tree": { "leaf_size": 4 } }
//! ```

use std::path::Path;

use lucent_math::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for kd-tree construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdTreeConfig {
    /// Build the tree; when false, every ray tests every primitive
    pub enabled: bool,
    /// Maximum number of split levels below the root
    pub max_depth: u32,
    /// Nodes holding this many primitives or fewer become leaves
    pub leaf_size: usize,
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: 15,
            leaf_size: 10,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Maximum reflection/refraction recursion depth
    pub max_depth: u32,
    /// Secondary rays whose accumulated weight falls below this are not traced
    pub attenuation_threshold: f32,
    /// Average four jittered taps per pixel
    pub anti_alias: bool,
    /// Color returned for rays that leave the scene (linear RGB)
    pub background: [f32; 3],
    /// Edge length of the square tiles handed to worker threads
    pub bucket_size: u32,
    /// Worker thread count, 0 uses the global rayon pool
    pub threads: usize,
    /// Acceleration structure settings
    pub kd_tree: KdTreeConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            max_depth: 5,
            attenuation_threshold: 1.0 / 255.0,
            anti_alias: false,
            background: [0.0, 0.0, 0.0],
            bucket_size: 32,
            threads: 0,
            kd_tree: KdTreeConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bucket_size == 0 {
            return Err(ConfigError::Invalid("bucket_size must be at least 1".into()));
        }
        if self.attenuation_threshold.is_nan() || self.attenuation_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "attenuation_threshold must be >= 0, got {}",
                self.attenuation_threshold
            )));
        }
        if self.kd_tree.leaf_size == 0 {
            return Err(ConfigError::Invalid("kd_tree.leaf_size must be at least 1".into()));
        }
        if self.background.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::Invalid("background must be finite".into()));
        }
        Ok(())
    }

    /// Background as a color value.
    pub fn background_color(&self) -> Color {
        Color::from_array(self.background)
    }
}
