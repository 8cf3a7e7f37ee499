//! Image tiling for parallel rendering.
//!
//! Each bucket is traced by one rayon task against the shared tracer and
//! returns its pixels together with its own ray counters.

use crate::{RayStats, RayTracer};
use lucent_math::Color;

/// Square tile of the output image, clipped at the right and top edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// First column
    pub x: u32,
    /// First row (rows count up from the bottom)
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Squared distance from the bucket center to the image center, in
    /// doubled pixel units so it stays integral.
    fn center_distance(&self, width: u32, height: u32) -> i64 {
        let dx = (2 * self.x as i64 + self.width as i64) - width as i64;
        let dy = (2 * self.y as i64 + self.height as i64) - height as i64;
        dx * dx + dy * dy
    }
}

/// Tile a `width` x `height` image, center buckets first.
///
/// A `bucket_size` of 0 is treated as 1. Buckets equally far from the
/// center keep row-major order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let step = size as usize;

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(step)
        .flat_map(|y| {
            (0..width).step_by(step).map(move |x| {
                Bucket::new(x, y, size.min(width - x), size.min(height - y), 0)
            })
        })
        .collect();

    buckets.sort_by_key(|b| b.center_distance(width, height));
    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }

    buckets
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Clamped pixel colors in row-major order
    pub pixels: Vec<Color>,
    /// Counters from this bucket's rays
    pub stats: RayStats,
}

/// Render a single bucket against a shared tracer.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, tracer: &RayTracer) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    let mut stats = RayStats::default();

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = tracer.compute_pixel(bucket.x + local_x, bucket.y + local_y, &mut stats);
            pixels.push(color);
        }
    }

    log::debug!(
        "Bucket {} at ({}, {}) done: {} primary rays",
        bucket.index,
        bucket.x,
        bucket.y,
        stats.primary_rays
    );

    BucketResult {
        bucket: *bucket,
        pixels,
        stats,
    }
}
