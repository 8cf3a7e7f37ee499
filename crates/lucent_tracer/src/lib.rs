//! Lucent Tracer - recursive Whitted-style ray tracing.
//!
//! Camera rays are shaded with a local Phong model at their nearest hit,
//! then reflected and refracted recursively until the depth budget runs out
//! or a branch's weight drops below the attenuation threshold. Scenes are
//! accelerated with a kd-tree built using the surface area heuristic.
//!
//! Images are rendered in buckets spread over the rayon thread pool.

mod bucket;
mod camera;
mod environment;
mod error;
mod kdtree;
mod light;
mod material;
mod primitive;
mod ray;
mod renderer;
mod scene;
mod shading;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use camera::Camera;
pub use environment::{ConstantEnvironment, CubeFace, CubeMap, Environment};
pub use error::{TracerError, TracerResult};
pub use kdtree::{KdNode, KdTree, TreeStats};
pub use light::{DirectionalLight, Light, PointLight};
pub use material::{luminance, Material, MaterialParameter};
pub use primitive::{closest_hit, Intersection, LocalHit, Primitive};
pub use ray::{PixelRef, Ray, RayKind, RAY_EPSILON};
pub use renderer::{color_to_rgb8, PixelBuffer, RayStats, RayTracer};
pub use scene::{Scene, SceneObject};
pub use shading::{reflect, refract, shade};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export the math and config types used in the public API
pub use lucent_core::{KdTreeConfig, RenderConfig};
pub use lucent_math::{Aabb, Color, Interval, Vec2, Vec3};
