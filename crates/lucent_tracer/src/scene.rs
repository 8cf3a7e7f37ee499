//! Scene container: primitives with their materials, lights and the
//! optional kd-tree over them.

use std::sync::Arc;

use lucent_core::KdTreeConfig;
use lucent_math::{Aabb, Color, Interval};

use crate::primitive::{closest_among, closest_hit};
use crate::{
    Intersection, KdTree, Light, LocalHit, Material, Primitive, Ray, TracerError, TracerResult,
};

/// A primitive paired with the material it is shaded with.
pub struct SceneObject {
    shape: Box<dyn Primitive>,
    material: Arc<Material>,
}

impl SceneObject {
    pub fn shape(&self) -> &dyn Primitive {
        self.shape.as_ref()
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

impl Primitive for SceneObject {
    fn local_intersect(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        self.shape.local_intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.shape.bounding_box()
    }

    fn reference_normal_sign(&self, axis: usize) -> i8 {
        self.shape.reference_normal_sign(axis)
    }
}

/// Tree over the bounded objects; unbounded ones are tested linearly.
struct Acceleration {
    tree: KdTree,
    unbounded: Vec<usize>,
}

/// Objects, lights and ambient light of a render.
///
/// The scene is immutable while tracing. Adding an object drops any built
/// tree; call [`build_acceleration_structure`](Self::build_acceleration_structure)
/// again afterwards.
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<Box<dyn Light>>,
    ambient: Color,
    accel: Option<Acceleration>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            ambient: Color::ZERO,
            accel: None,
        }
    }

    /// Add a primitive and return its object index.
    pub fn add_object<P>(&mut self, shape: P, material: impl Into<Arc<Material>>) -> usize
    where
        P: Primitive + 'static,
    {
        if self.accel.take().is_some() {
            log::warn!("Scene changed, kd-tree must be rebuilt");
        }
        self.objects.push(SceneObject {
            shape: Box::new(shape),
            material: material.into(),
        });
        self.objects.len() - 1
    }

    pub fn add_light<L: Light + 'static>(&mut self, light: L) {
        self.lights.push(Box::new(light));
    }

    pub fn set_ambient(&mut self, ambient: Color) {
        self.ambient = ambient;
    }

    /// Scene-wide ambient light.
    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Build (or drop, if disabled) the kd-tree over the scene's objects.
    ///
    /// Objects with NaN bounds are rejected. Objects with infinite bounds are
    /// kept out of the tree and tested against every ray.
    pub fn build_acceleration_structure(&mut self, config: &KdTreeConfig) -> TracerResult<()> {
        self.accel = None;
        if !config.enabled {
            log::debug!("kd-tree disabled, {} objects tested linearly", self.objects.len());
            return Ok(());
        }

        let mut bounded = Vec::with_capacity(self.objects.len());
        let mut unbounded = Vec::new();
        for (index, object) in self.objects.iter().enumerate() {
            let bbox = object.bounding_box();
            if bbox.has_nan() {
                return Err(TracerError::InvalidBounds { index, bbox });
            }
            if bbox.is_finite() {
                bounded.push(index);
            } else {
                unbounded.push(index);
            }
        }

        let tree = KdTree::build_subset(&self.objects, &bounded, config)?;
        if !unbounded.is_empty() {
            log::debug!("{} unbounded objects kept out of the kd-tree", unbounded.len());
        }
        self.accel = Some(Acceleration { tree, unbounded });
        Ok(())
    }

    /// The built tree, if any.
    pub fn kd_tree(&self) -> Option<&KdTree> {
        self.accel.as_ref().map(|a| &a.tree)
    }

    /// Nearest intersection with `t` inside `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        if ray.is_degenerate() {
            return None;
        }

        let found = match &self.accel {
            Some(accel) => {
                let tree_hit = accel.tree.intersect(&self.objects, ray, ray_t);
                let limit = tree_hit.map_or(ray_t.max, |(_, hit)| hit.t);
                let extra = closest_among(
                    &self.objects,
                    accel.unbounded.iter().copied(),
                    ray,
                    Interval::new(ray_t.min, limit),
                );
                match (tree_hit, extra) {
                    (Some(a), Some(b)) if b.1.t < a.1.t => Some(b),
                    (Some(a), _) => Some(a),
                    (None, b) => b,
                }
            }
            None => closest_hit(&self.objects, ray, ray_t),
        };

        found.map(|(index, hit)| Intersection::new(index, hit, &self.objects[index].material))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RayKind, Sphere};
    use lucent_math::{Vec2, Vec3};

    /// Infinite plane `y = height` facing +Y.
    struct GroundPlane {
        height: f32,
    }

    impl Primitive for GroundPlane {
        fn local_intersect(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
            let d = ray.direction().y;
            if d.abs() < 1e-8 {
                return None;
            }
            let t = (self.height - ray.origin().y) / d;
            ray_t.contains(t).then(|| LocalHit {
                t,
                normal: Vec3::Y,
                uv: Vec2::ZERO,
            })
        }

        fn bounding_box(&self) -> Aabb {
            Aabb::new(
                Interval::UNIVERSE,
                Interval::new(self.height, self.height),
                Interval::UNIVERSE,
            )
        }
    }

    fn test_scene() -> Scene {
        let mut scene = Scene::new();
        for i in 0..30 {
            scene.add_object(
                Sphere::new(Vec3::new(i as f32 * 2.5, 1.0, 0.0), 1.0),
                Material::diffuse(Color::splat(i as f32 / 30.0)),
            );
        }
        scene.add_object(GroundPlane { height: 0.0 }, Material::diffuse(Color::ONE));
        scene
    }

    #[test]
    fn test_intersect_without_tree() {
        let scene = test_scene();
        assert!(scene.kd_tree().is_none());

        let ray = Ray::new(Vec3::new(5.0, 10.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let hit = scene.intersect(&ray, Interval::new(1e-3, f32::INFINITY)).unwrap();
        assert_eq!(hit.object, 2);
        assert!((hit.t - 8.0).abs() < 1e-4);
        assert_eq!(hit.material.kd.value(hit.uv), Color::splat(2.0 / 30.0));
    }

    #[test]
    fn test_unbounded_objects_stay_out_of_tree() {
        let mut scene = test_scene();
        let config = KdTreeConfig {
            enabled: true,
            max_depth: 15,
            leaf_size: 2,
        };
        scene.build_acceleration_structure(&config).unwrap();

        let tree = scene.kd_tree().unwrap();
        tree.for_each_leaf(|_, leaf| assert!(!leaf.contains(&30)));
        assert!(tree.bounds().is_finite());

        // Between two spheres, straight down onto the plane
        let ray = Ray::new(Vec3::new(1.25, 10.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let hit = scene.intersect(&ray, Interval::new(1e-3, f32::INFINITY)).unwrap();
        assert_eq!(hit.object, 30);
        assert!((hit.t - 10.0).abs() < 1e-4);

        // The sphere in front of the plane wins
        let ray = Ray::new(Vec3::new(10.0, 10.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let hit = scene.intersect(&ray, Interval::new(1e-3, f32::INFINITY)).unwrap();
        assert_eq!(hit.object, 4);
    }

    #[test]
    fn test_tree_and_linear_agree() {
        let mut accelerated = test_scene();
        accelerated
            .build_acceleration_structure(&KdTreeConfig::default())
            .unwrap();
        let linear = test_scene();

        for i in 0..200 {
            let x = i as f32 * 0.41 - 5.0;
            let ray = Ray::new(
                Vec3::new(x, 6.0, -8.0),
                Vec3::new(0.3, -0.6, 1.0).normalize(),
                RayKind::Visibility,
            );
            let ray_t = Interval::new(1e-3, f32::INFINITY);
            let a = accelerated.intersect(&ray, ray_t).map(|h| (h.object, h.t));
            let b = linear.intersect(&ray, ray_t).map(|h| (h.object, h.t));
            assert_eq!(a.map(|h| h.0), b.map(|h| h.0));
        }
    }

    #[test]
    fn test_disabled_tree_and_invalidation() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut scene = test_scene();
        scene.build_acceleration_structure(&KdTreeConfig::default()).unwrap();
        assert!(scene.kd_tree().is_some());

        scene.add_object(Sphere::new(Vec3::new(0.0, 5.0, 0.0), 0.5), Material::new());
        assert!(scene.kd_tree().is_none());

        let disabled = KdTreeConfig {
            enabled: false,
            ..KdTreeConfig::default()
        };
        scene.build_acceleration_structure(&disabled).unwrap();
        assert!(scene.kd_tree().is_none());

        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let hit = scene.intersect(&ray, Interval::new(1e-3, f32::INFINITY)).unwrap();
        assert_eq!(hit.object, 31);
    }

    #[test]
    fn test_nan_bounds_fail_build() {
        let mut scene = Scene::new();
        scene.add_object(Sphere::new(Vec3::splat(f32::NAN), 1.0), Material::new());
        let err = scene
            .build_acceleration_structure(&KdTreeConfig::default())
            .unwrap_err();
        assert!(matches!(err, TracerError::InvalidBounds { index: 0, .. }));
    }

    #[test]
    fn test_shared_material() {
        let mut scene = Scene::new();
        let shared = Arc::new(Material::diffuse(Color::X));
        scene.add_object(Sphere::new(Vec3::ZERO, 1.0), shared.clone());
        scene.add_object(Sphere::new(Vec3::X * 3.0, 1.0), shared.clone());

        assert_eq!(Arc::strong_count(&shared), 3);
        assert!(Arc::ptr_eq(scene.objects()[0].material(), scene.objects()[1].material()));
    }
}
