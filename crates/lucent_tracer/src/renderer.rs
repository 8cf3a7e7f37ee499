//! Recursive Whitted-style transport and the image driver.
//!
//! Each primary ray is shaded at its nearest hit; reflective and
//! transmissive surfaces spawn secondary rays whose colors are weighted by
//! the material and added. Recursion stops at the depth budget, or earlier
//! once a branch's accumulated weight falls below the attenuation threshold.

use std::time::Instant;

use lucent_core::RenderConfig;
use lucent_math::{Color, Interval, Vec3};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::shading::{reflect, refract, shade};
use crate::{
    Camera, Environment, PixelRef, Ray, RayKind, Scene, TracerError, TracerResult, RAY_EPSILON,
};

/// Counters gathered while tracing. Each worker keeps its own and the
/// totals are merged after the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayStats {
    pub primary_rays: u64,
    pub shading_evaluations: u64,
    pub reflection_rays: u64,
    /// Transmitted rays, including total-internal-reflection substitutes
    pub refraction_rays: u64,
    pub total_internal_reflections: u64,
    /// Secondary rays skipped because their weight fell below the threshold
    pub threshold_cutoffs: u64,
}

impl RayStats {
    pub fn merge(&mut self, other: &RayStats) {
        self.primary_rays += other.primary_rays;
        self.shading_evaluations += other.shading_evaluations;
        self.reflection_rays += other.reflection_rays;
        self.refraction_rays += other.refraction_rays;
        self.total_internal_reflections += other.total_internal_reflections;
        self.threshold_cutoffs += other.threshold_cutoffs;
    }

    /// Reflection plus refraction rays.
    pub fn secondary_rays(&self) -> u64 {
        self.reflection_rays + self.refraction_rays
    }
}

/// Quantize a color to 8-bit RGB, clamping each channel to `[0, 1]`.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8]
}

/// RGB8 output image. Row 0 is the bottom of the image.
#[derive(Debug, Clone, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, `(x + y * width) * 3` per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (x as usize + y as usize * self.width as usize) * 3)
    }

    /// Stored color; black outside the image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        match self.offset(x, y) {
            Some(i) => Color::new(
                self.data[i] as f32 / 255.0,
                self.data[i + 1] as f32 / 255.0,
                self.data[i + 2] as f32 / 255.0,
            ),
            None => Color::ZERO,
        }
    }

    /// Quantize and store `color`; writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 3].copy_from_slice(&color_to_rgb8(color));
        }
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }
}

/// Direction of a ray transmitted through a surface with outward normal
/// `n` and refractive index `index`, or `None` on total internal reflection.
///
/// Rays travelling along the normal are exiting the surface.
fn transmitted_direction(d: Vec3, n: Vec3, index: f32) -> Option<Vec3> {
    if !(index > 0.0) {
        return None;
    }
    if d.dot(n) > 0.0 {
        refract(d, -n, index)
    } else {
        refract(d, n, 1.0 / index)
    }
}

/// Ties a scene, camera and configuration to an output buffer.
pub struct RayTracer {
    scene: Scene,
    camera: Camera,
    config: RenderConfig,
    environment: Option<Box<dyn Environment>>,
    buffer: PixelBuffer,
    generation: u32,
}

impl RayTracer {
    /// Validate `config` and build the acceleration structure if enabled.
    pub fn new(scene: Scene, camera: Camera, config: RenderConfig) -> TracerResult<Self> {
        config.validate()?;
        let mut tracer = Self {
            scene,
            camera,
            config,
            environment: None,
            buffer: PixelBuffer::default(),
            generation: 0,
        };
        tracer.build_acceleration_structure()?;
        Ok(tracer)
    }

    /// Use `environment` for rays that miss every object.
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Box::new(environment));
        self
    }

    /// (Re)build the scene's kd-tree according to the config.
    pub fn build_acceleration_structure(&mut self) -> TracerResult<()> {
        self.scene.build_acceleration_structure(&self.config.kd_tree)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Camera aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.camera.aspect_ratio()
    }

    /// Allocate (or clear) the output buffer for a `width` x `height` render.
    pub fn trace_setup(&mut self, width: u32, height: u32) {
        if self.buffer.width() != width || self.buffer.height() != height {
            self.buffer = PixelBuffer::new(width, height);
        } else {
            self.buffer.clear();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Color seen by a ray that hits nothing.
    fn miss_color(&self, ray: &Ray) -> Color {
        match &self.environment {
            Some(env) => env.color_for_direction(ray.direction().normalize_or_zero()),
            None => self.config.background_color(),
        }
    }

    /// Color carried back along `ray`, recursing at most `depth` levels.
    ///
    /// Secondary rays whose accumulated weight falls below `threshold` in
    /// every channel are not traced.
    pub fn trace_ray(&self, ray: &Ray, threshold: f32, depth: u32, stats: &mut RayStats) -> Color {
        let Some(isect) = self.scene.intersect(ray, Interval::new(RAY_EPSILON, f32::INFINITY))
        else {
            return self.miss_color(ray);
        };

        stats.shading_evaluations += 1;
        let mut color = shade(&self.scene, ray, &isect);
        if depth == 0 {
            return color;
        }

        let material = isect.material;
        let uv = isect.uv;
        let n = isect.normal;
        let d = ray.direction().normalize_or_zero();
        let p = isect.point(ray);

        if material.is_reflective() {
            let kr = material.kr.value(uv);
            if (ray.attenuation() * kr).max_element() < threshold {
                stats.threshold_cutoffs += 1;
            } else {
                stats.reflection_rays += 1;
                let reflected = ray.spawn(p, reflect(d, n), RayKind::Reflection, kr);
                color += kr * self.trace_ray(&reflected, threshold, depth - 1, stats);
            }
        }

        if material.is_transmissive() {
            let kt = material.kt.value(uv);
            if (ray.attenuation() * kt).max_element() < threshold {
                stats.threshold_cutoffs += 1;
            } else {
                let index = material.index.intensity_value(uv);
                let direction = match transmitted_direction(d, n, index) {
                    Some(t) => t,
                    None => {
                        stats.total_internal_reflections += 1;
                        reflect(d, n)
                    }
                };
                stats.refraction_rays += 1;
                let transmitted = ray.spawn(p, direction, RayKind::Refraction, kt);
                color += kt * self.trace_ray(&transmitted, threshold, depth - 1, stats);
            }
        }

        color
    }

    fn trace_primary(&self, ray: Ray, stats: &mut RayStats) -> Color {
        stats.primary_rays += 1;
        let ray = ray.with_generation(self.generation);
        let color = self.trace_ray(
            &ray,
            self.config.attenuation_threshold,
            self.config.max_depth,
            stats,
        );
        color.clamp(Color::ZERO, Color::ONE)
    }

    /// Trace the primary ray through normalized window coordinates `(x, y)`;
    /// the result is clamped to `[0, 1]`.
    pub fn trace(&self, x: f32, y: f32, stats: &mut RayStats) -> Color {
        self.trace_primary(self.camera.ray_through(x, y), stats)
    }

    /// Color of pixel `(x, y)` of the current buffer, without storing it.
    ///
    /// With anti-aliasing on, four taps a quarter pixel off the corner
    /// sample are averaged.
    pub fn compute_pixel(&self, x: u32, y: u32, stats: &mut RayStats) -> Color {
        let (width, height) = (self.buffer.width(), self.buffer.height());
        if width == 0 || height == 0 {
            return Color::ZERO;
        }

        let nx = x as f32 / width as f32;
        let ny = y as f32 / height as f32;
        let pixel = PixelRef { x, y };

        if !self.config.anti_alias {
            return self.trace_primary(self.camera.ray_through(nx, ny).with_pixel(pixel), stats);
        }

        let dx = 0.25 / width as f32;
        let dy = 0.25 / height as f32;
        let mut color = Color::ZERO;
        for (ox, oy) in [(dx, dy), (-dx, -dy), (dx, -dy), (-dx, dy)] {
            let ray = self.camera.ray_through(nx + ox, ny + oy).with_pixel(pixel);
            color += 0.25 * self.trace_primary(ray, stats);
        }
        color
    }

    /// Trace pixel `(x, y)`, store it in the buffer and return its color.
    pub fn trace_pixel(&mut self, x: u32, y: u32) -> Color {
        let mut stats = RayStats::default();
        let color = self.compute_pixel(x, y, &mut stats);
        self.buffer.set(x, y, color);
        color
    }

    /// Render a whole image in parallel buckets.
    ///
    /// `max_depth` and `threshold` replace the configured recursion budget
    /// and attenuation cutoff.
    pub fn trace_image(
        &mut self,
        width: u32,
        height: u32,
        max_depth: u32,
        threshold: f32,
    ) -> TracerResult<RayStats> {
        if width == 0 || height == 0 {
            return Err(TracerError::EmptyImage { width, height });
        }

        let mut config = self.config.clone();
        config.width = width;
        config.height = height;
        config.max_depth = max_depth;
        config.attenuation_threshold = threshold;
        config.validate()?;
        self.config = config;

        self.trace_setup(width, height);

        let start = Instant::now();
        let buckets = generate_buckets(width, height, self.config.bucket_size);
        log::debug!(
            "Rendering {}x{} in {} buckets (depth {}, threshold {})",
            width,
            height,
            buckets.len(),
            max_depth,
            threshold
        );

        let tracer: &RayTracer = self;
        let render = || -> Vec<BucketResult> {
            buckets
                .par_iter()
                .map(|bucket| render_bucket(bucket, tracer))
                .collect()
        };
        let results = if tracer.config.threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(tracer.config.threads)
                .build()?
                .install(render)
        } else {
            render()
        };

        let mut stats = RayStats::default();
        for result in &results {
            stats.merge(&result.stats);
            let bucket = &result.bucket;
            for (i, color) in result.pixels.iter().enumerate() {
                let i = i as u32;
                self.buffer
                    .set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color);
            }
        }

        log::info!(
            "Rendered {}x{} in {:.2?}: {} primary, {} reflected, {} refracted ({} TIR), {} cut off",
            width,
            height,
            start.elapsed(),
            stats.primary_rays,
            stats.reflection_rays,
            stats.refraction_rays,
            stats.total_internal_reflections,
            stats.threshold_cutoffs
        );

        Ok(stats)
    }

    /// Stored color of pixel `(x, y)`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        self.buffer.get(x, y)
    }

    /// Overwrite pixel `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.buffer.set(x, y, color);
    }
}
