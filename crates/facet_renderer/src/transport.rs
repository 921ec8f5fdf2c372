//! Whitted-style light transport.
//!
//! Every hit gathers direct light from the point lights, then splits the
//! remaining energy between a mirror ray and a refracted ray according to
//! the Fresnel equations.

use std::f32::consts::PI;

use facet_core::MeshHit;
use facet_math::{Vec3, EPSILON};

use crate::ray::LightRay;
use crate::scene::Scene;

/// Energy kept by a secondary ray at every bounce.
pub const ATTENUATION: f32 = 0.9;

/// Radiance gathered along `ray`.
///
/// A hit adds its direct light weighted by the material's `matte`, then spawns a
/// mirror ray carrying `intensity * R * specular * ATTENUATION` and a refracted
/// ray carrying `intensity * (1 - R) * ATTENUATION`, where `R` is the Fresnel
/// reflectance. The `specular` factor only scales the mirror ray, so the default
/// of 1.0 leaves the plain Fresnel split.
///
/// Recursion stops when the carried energy drops below [`EPSILON`] or the ray
/// has bounced more than `max_depth` times.
pub fn trace(ray: &LightRay, scene: &Scene, max_depth: u32) -> Vec3 {
    if ray.energy() < EPSILON || ray.bounce > max_depth {
        return Vec3::ZERO;
    }

    let Some(hit) = scene.nearest_hit(&ray.ray()) else {
        return Vec3::ZERO;
    };

    let mut color = direct_illumination(ray, &hit, scene) * ray.intensity * hit.material.matte;

    let entering = ray.direction.dot(hit.normal) < 0.0;
    let (eta_i, eta_t) = if entering {
        (ray.ior, hit.material.ior)
    } else {
        (hit.material.ior, 1.0)
    };
    let cos_i = ray.direction.dot(hit.normal).abs();
    let reflectance = fresnel(cos_i, eta_i, eta_t);

    if reflectance >= EPSILON {
        let intensity = ray.intensity * reflectance * hit.material.specular * ATTENUATION;
        let direction = reflect(ray.direction, hit.normal);
        let reflected = ray.spawn(hit.point, direction, intensity, ray.ior);
        color += trace(&reflected, scene, max_depth);
    }

    if 1.0 - reflectance >= EPSILON {
        if let Some(direction) = refract(ray.direction, hit.normal, eta_i, eta_t) {
            let intensity = ray.intensity * (1.0 - reflectance) * ATTENUATION;
            let refracted = ray.spawn(hit.point, direction, intensity, eta_t);
            color += trace(&refracted, scene, max_depth);
        }
    }

    color
}

/// Light reaching `hit` straight from the scene's lights, tinted by the face colour.
///
/// Each visible light contributes `intensity * cos / (4 pi d^2)`, with the
/// cosine taken against the normal turned towards the incoming ray.
pub fn direct_illumination(ray: &LightRay, hit: &MeshHit, scene: &Scene) -> Vec3 {
    let normal = if ray.direction.dot(hit.normal) > 0.0 {
        -hit.normal
    } else {
        hit.normal
    };

    let mut total = Vec3::ZERO;
    for light in &scene.lights {
        let to_light = light.position - hit.point;
        let distance_sq = to_light.length_squared();
        if distance_sq < EPSILON * EPSILON {
            continue;
        }

        let cos = normal.dot(to_light / distance_sq.sqrt());
        if cos <= 0.0 {
            continue;
        }
        if scene.is_occluded(hit.point, light.position) {
            continue;
        }
        total += light.intensity * cos / (4.0 * PI * distance_sq);
    }
    total * hit.color
}

/// Unpolarized Fresnel reflectance for light crossing from `eta_i` into `eta_t`.
///
/// `cos_i` is the cosine between the ray and the surface normal. Total internal
/// reflection reports `1`.
pub fn fresnel(cos_i: f32, eta_i: f32, eta_t: f32) -> f32 {
    let cos_i = cos_i.abs().min(1.0);
    let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
    let sin_t = eta_i / eta_t * sin_i;
    if sin_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();

    let rs = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    let rp = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    ((rs * rs + rp * rp) / 2.0).clamp(0.0, 1.0)
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Bend `direction` through a surface per Snell's law.
///
/// The normal may face either way. Returns `None` on total internal reflection.
pub fn refract(direction: Vec3, normal: Vec3, eta_i: f32, eta_t: f32) -> Option<Vec3> {
    let normal = if direction.dot(normal) > 0.0 { -normal } else { normal };
    let ratio = eta_i / eta_t;
    let cos_i = -direction.dot(normal);
    let k = 1.0 - ratio * ratio * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some((ratio * direction + (ratio * cos_i - k.sqrt()) * normal).normalize())
}
