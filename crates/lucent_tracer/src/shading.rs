//! Local Phong illumination and the mirror/refraction direction helpers.

use crate::{Intersection, Ray, Scene};
use lucent_math::{Color, Vec3};

/// Local color at an intersection: emission, ambient, and the diffuse and
/// specular contribution of every light, each scaled by distance and shadow
/// attenuation. Reflection and refraction are added by the caller.
pub fn shade(scene: &Scene, ray: &Ray, isect: &Intersection<'_>) -> Color {
    let material = isect.material;
    let uv = isect.uv;
    let n = isect.normal;
    let p = isect.point(ray);
    let view = -ray.direction().normalize_or_zero();

    let mut color = material.ke.value(uv) + material.ka.value(uv) * scene.ambient();

    let kd = material.kd.value(uv);
    let ks = material.ks.value(uv);
    let shininess = material.shininess.intensity_value(uv);

    for light in scene.lights() {
        let atten = light.distance_attenuation(p) * light.shadow_attenuation(scene, ray, p);
        if atten == Color::ZERO {
            continue;
        }

        let to_light = light.direction_to_light(p);
        let light_color = light.color();

        let diffuse = kd * light_color * n.dot(to_light).max(0.0);

        // Mirror of the incoming light direction about the normal
        let r = reflect(-to_light, n);
        let cos_alpha = r.dot(view);
        let specular = if cos_alpha > 0.0 {
            (ks * light_color * cos_alpha.powf(shininess)).max(Color::ZERO)
        } else {
            Color::ZERO
        };

        color += atten * (diffuse + specular);
    }

    color
}

/// Mirror `d` about `n`: `d - 2 n (d . n)`.
#[inline]
pub fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * n * d.dot(n)
}

/// Snell refraction of `d` through a surface with unit normal `n` facing
/// against `d`, with `eta` the ratio of incident to transmitted index.
///
/// Returns `None` on total internal reflection.
pub fn refract(d: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let d = d.normalize_or_zero();
    if d == Vec3::ZERO || !eta.is_finite() || eta <= 0.0 {
        return None;
    }

    let cos_i = (-d.dot(n)).min(1.0);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }

    let t = eta * d + (eta * cos_i - k.sqrt()) * n;
    let t = t.normalize_or_zero();
    if t == Vec3::ZERO {
        None
    } else {
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, PointLight, RayKind, Sphere, Triangle};
    use lucent_math::Interval;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_reflect() {
        let d = Vec3::new(1.0, -1.0, 0.0);
        let r = reflect(d, Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(r.dot(Vec3::Y), -d.dot(Vec3::Y));
    }

    #[test]
    fn test_refract_straight_through() {
        let t = refract(-Vec3::Y, Vec3::Y, 1.0 / 1.5).unwrap();
        assert!(approx(t, -Vec3::Y));
    }

    #[test]
    fn test_refract_bends_toward_normal_on_entry() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let t = refract(d, Vec3::Y, 1.0 / 1.5).unwrap();

        let sin_i = d.cross(Vec3::Y).length();
        let sin_t = t.cross(Vec3::Y).length();
        assert!(sin_t < sin_i);
        assert!((sin_i - 1.5 * sin_t).abs() < 1e-5);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // 60 degrees inside glass is past the critical angle
        let d = Vec3::new(60f32.to_radians().sin(), -60f32.to_radians().cos(), 0.0);
        assert!(refract(d, Vec3::Y, 1.5).is_none());
        assert!(refract(d, Vec3::Y, 0.0).is_none());
        assert!(refract(Vec3::ZERO, Vec3::Y, 1.0).is_none());
    }

    fn floor() -> Triangle {
        Triangle::new(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, -10.0),
        )
    }

    fn hit_floor<'a>(scene: &'a Scene, ray: &Ray) -> Intersection<'a> {
        scene
            .intersect(ray, Interval::new(1e-3, f32::INFINITY))
            .expect("camera ray should hit the floor")
    }

    #[test]
    fn test_point_light_above_diffuse_plane() {
        let mut scene = Scene::new();
        scene.set_ambient(Color::splat(0.1));
        scene.add_object(
            floor(),
            Material::diffuse(Color::ONE).with_ka(Color::ONE),
        );
        scene.add_light(
            PointLight::new(Vec3::new(0.0, 4.0, 0.0), Color::new(0.8, 0.6, 0.4))
                .with_falloff(0.0, 0.5, 0.0),
        );

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let isect = hit_floor(&scene, &ray);
        let color = shade(&scene, &ray, &isect);

        // ambient + diffuse * light * attenuation * cos(0)
        let expected = Color::splat(0.1) + Color::new(0.8, 0.6, 0.4) * 0.5;
        assert!(approx(color, expected), "{color:?} != {expected:?}");
    }

    #[test]
    fn test_occluder_removes_light_contribution() {
        let mut scene = Scene::new();
        scene.set_ambient(Color::splat(0.1));
        scene.add_object(
            floor(),
            Material::diffuse(Color::ONE).with_ka(Color::ONE).with_ks(Color::ONE),
        );
        scene.add_object(Sphere::new(Vec3::new(0.0, 3.0, 0.0), 0.25), Material::diffuse(Color::ONE));
        scene.add_light(PointLight::new(Vec3::new(0.0, 4.0, 0.0), Color::ONE));

        // Camera below the occluder looking straight down
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let isect = hit_floor(&scene, &ray);
        let p = isect.point(&ray);

        let light = &scene.lights()[0];
        assert_eq!(light.shadow_attenuation(&scene, &ray, p), Color::ZERO);
        assert!(approx(shade(&scene, &ray, &isect), Color::splat(0.1)));
    }

    #[test]
    fn test_specular_highlight() {
        let mut scene = Scene::new();
        scene.add_object(
            floor(),
            Material::new().with_ks(Color::ONE).with_shininess(8.0),
        );
        scene.add_light(PointLight::new(Vec3::new(0.0, 4.0, 0.0), Color::ONE));

        // Viewer on the mirror path of the light gets the full highlight
        let on_axis = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let isect = hit_floor(&scene, &on_axis);
        assert!(approx(shade(&scene, &on_axis, &isect), Color::ONE));

        // Off-axis viewer sees a weaker highlight, never negative
        let off_axis = Ray::new(
            Vec3::new(-2.0, 2.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            RayKind::Visibility,
        );
        let isect = hit_floor(&scene, &off_axis);
        let c = shade(&scene, &off_axis, &isect);
        assert!(c.x >= 0.0 && c.x < 1.0);
    }

    #[test]
    fn test_emissive_and_no_lights() {
        let mut scene = Scene::new();
        scene.set_ambient(Color::splat(0.5));
        scene.add_object(
            floor(),
            Material::new().with_ke(Color::new(0.2, 0.0, 0.0)).with_ka(Color::new(0.0, 1.0, 0.0)),
        );

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, RayKind::Visibility);
        let isect = hit_floor(&scene, &ray);
        assert!(isect.uv.is_finite());
        assert!(approx(shade(&scene, &ray, &isect), Color::new(0.2, 0.5, 0.0)));
    }
}
