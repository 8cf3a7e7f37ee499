//! Lucent Core - shared resources for the Lucent ray tracer.
//!
//! This crate provides:
//!
//! - **Textures**: `Texture` with bilinear sampling and a `TextureCache`
//!   that loads images from disk
//! - **Configuration**: `RenderConfig` / `KdTreeConfig`, loadable from JSON
//!
//! # Example
//!
//! ```ignore
//! use lucent_core::{RenderConfig, TextureCache};
//!
//! let config = RenderConfig::load("render.json")?;
//! let mut textures = TextureCache::with_base_dir("assets");
//! let checker = textures.load("checker.png")?;
//! ```

pub mod config;
pub mod texture;

// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, KdTreeConfig, RenderConfig};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
