//! Errors reported before any tracing starts.

use lucent_core::{ConfigError, TextureError};
use lucent_math::Aabb;
use thiserror::Error;

/// Failure to set up a scene or a render.
#[derive(Error, Debug)]
pub enum TracerError {
    #[error("Primitive {index} reported an invalid bounding box: {bbox:?}")]
    InvalidBounds { index: usize, bbox: Aabb },

    #[error("Cannot render an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type TracerResult<T> = Result<T, TracerError>;
