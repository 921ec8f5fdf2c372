//! Rays carrying light through the scene.

use facet_math::{Ray, Vec3};

/// A ray tagged with the light it carries and the medium it travels through.
///
/// Created and consumed within one transport call; never shared between threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRay {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Per-channel weight applied to everything this ray gathers
    pub intensity: Vec3,
    /// Refractive index of the medium around the origin
    pub ior: f32,
    /// Number of reflections and refractions since the camera
    pub bounce: u32,
}

impl LightRay {
    /// A full-intensity camera ray travelling through air.
    pub fn primary(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            intensity: Vec3::ONE,
            ior: 1.0,
            bounce: 0,
        }
    }

    /// A secondary ray spawned from this one.
    pub fn spawn(&self, origin: Vec3, direction: Vec3, intensity: Vec3, ior: f32) -> Self {
        Self {
            origin,
            direction,
            intensity,
            ior,
            bounce: self.bounce + 1,
        }
    }

    /// Sum of the carried intensity over all channels.
    #[inline]
    pub fn energy(&self) -> f32 {
        self.intensity.x + self.intensity.y + self.intensity.z
    }

    /// The geometric part, for index queries.
    #[inline]
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_ray() {
        let ray = LightRay::primary(Vec3::ZERO, Vec3::Z);
        assert_eq!(ray.energy(), 3.0);
        assert_eq!(ray.ior, 1.0);
        assert_eq!(ray.ray().at(2.0), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_spawn_counts_bounces() {
        let ray = LightRay::primary(Vec3::ZERO, Vec3::Z);
        let child = ray.spawn(Vec3::Z, Vec3::X, Vec3::splat(0.5), 1.5);
        let grandchild = child.spawn(Vec3::X, Vec3::Y, Vec3::ZERO, 1.0);
        assert_eq!(child.bounce, 1);
        assert_eq!(grandchild.bounce, 2);
        assert_eq!(child.energy(), 1.5);
        assert_eq!(grandchild.energy(), 0.0);
    }
}
