//! Whitted ray tracer example.
//!
//! Renders a small scene with diffuse, mirror and glass spheres over a
//! checkered floor and saves it as a PNG.
//!
//! Usage: `render_scene [config.json] [output.png]`

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use lucent_core::{RenderConfig, Texture};
use lucent_tracer::{
    Camera, Color, DirectionalLight, Material, PointLight, RayTracer, Scene, Sphere, Triangle,
    Vec2, Vec3,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RenderConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => RenderConfig {
            width: 640,
            height: 360,
            anti_alias: true,
            background: [0.05, 0.07, 0.12],
            ..RenderConfig::default()
        },
    };
    let output = args.next().unwrap_or_else(|| "output.png".to_string());

    let start = Instant::now();
    let scene = build_scene();
    log::info!("Scene built in {:.2?} ({} objects)", start.elapsed(), scene.len());

    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 2.5, 9.0), Vec3::new(0.0, 0.8, 0.0), Vec3::Y)
        .with_fov(40.0)
        .with_aspect_ratio(config.width as f32 / config.height as f32);

    let (width, height) = (config.width, config.height);
    let (max_depth, threshold) = (config.max_depth, config.attenuation_threshold);
    let mut tracer = RayTracer::new(scene, camera, config)?;
    let stats = tracer.trace_image(width, height, max_depth, threshold)?;
    log::info!(
        "{} shading evaluations, {} secondary rays",
        stats.shading_evaluations,
        stats.secondary_rays()
    );

    // Buffer rows run bottom to top
    let buffer = tracer.buffer();
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        let row = height - 1 - y;
        let i = (x as usize + row as usize * width as usize) * 3;
        let bytes = buffer.as_bytes();
        image::Rgb([bytes[i], bytes[i + 1], bytes[i + 2]])
    });
    image.save(&output).with_context(|| format!("saving {output}"))?;
    log::info!("Saved to {}", output);

    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();
    scene.set_ambient(Color::splat(0.15));

    // Checkered floor, two triangles sharing one texture
    let checker = Arc::new(checker_texture(8, Color::splat(0.9), Color::splat(0.2)));
    let floor = Arc::new(
        Material::diffuse(checker.clone())
            .with_ka(checker)
            .with_kr(Color::splat(0.1)),
    );
    let (a, b, c, d) = (
        Vec3::new(-20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, 20.0),
        Vec3::new(-20.0, 0.0, 20.0),
    );
    scene.add_object(
        Triangle::new(a, d, c).with_uvs(Vec2::new(0.0, 1.0), Vec2::ZERO, Vec2::X),
        floor.clone(),
    );
    scene.add_object(
        Triangle::new(a, c, b).with_uvs(Vec2::new(0.0, 1.0), Vec2::X, Vec2::ONE),
        floor,
    );

    // Three feature spheres
    scene.add_object(
        Sphere::new(Vec3::new(-2.2, 1.0, 0.0), 1.0),
        Material::diffuse(Color::new(0.8, 0.25, 0.2))
            .with_ka(Color::new(0.8, 0.25, 0.2))
            .with_ks(Color::splat(0.4))
            .with_shininess(32.0),
    );
    scene.add_object(
        Sphere::new(Vec3::new(0.0, 1.0, -0.5), 1.0),
        Material::new()
            .with_ks(Color::splat(0.8))
            .with_shininess(128.0)
            .with_kr(Color::splat(0.9)),
    );
    scene.add_object(
        Sphere::new(Vec3::new(2.2, 1.0, 0.0), 1.0),
        Material::new()
            .with_ks(Color::splat(0.6))
            .with_shininess(256.0)
            .with_kr(Color::splat(0.1))
            .with_kt(Color::splat(0.85))
            .with_index(1.5),
    );

    // A grid of small spheres gives the kd-tree something to split
    let mut rng = StdRng::seed_from_u64(2024);
    for i in -6..6 {
        for j in -6..3 {
            let center = Vec3::new(
                i as f32 * 1.1 + 0.4 * rng.gen::<f32>(),
                0.2,
                j as f32 * 1.1 + 0.4 * rng.gen::<f32>(),
            );
            let clear = [-2.2f32, 0.0, 2.2]
                .iter()
                .all(|&x| (center - Vec3::new(x, 0.2, 0.0)).length() > 1.4);
            if !clear {
                continue;
            }
            let albedo = Color::new(rng.gen(), rng.gen(), rng.gen()) * 0.8;
            scene.add_object(
                Sphere::new(center, 0.2),
                Material::diffuse(albedo).with_ka(albedo),
            );
        }
    }

    scene.add_light(
        PointLight::new(Vec3::new(-4.0, 6.0, 4.0), Color::splat(0.9)).with_falloff(1.0, 0.02, 0.005),
    );
    scene.add_light(DirectionalLight::new(
        Vec3::new(0.5, -1.0, -0.3),
        Color::new(0.3, 0.3, 0.35),
    ));

    scene
}

/// Square checkerboard with `cells` cells per side.
fn checker_texture(cells: u32, a: Color, b: Color) -> Texture {
    let pixels = (0..cells * cells)
        .map(|i| {
            let (x, y) = (i % cells, i / cells);
            let c = if (x + y) % 2 == 0 { a } else { b };
            c.to_array()
        })
        .collect();
    Texture::new(cells, cells, pixels, "<checker>")
}
