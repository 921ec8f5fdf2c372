//! Scene container: camera, meshes and lights.
//!
//! Read-only while rendering, so every worker thread borrows it directly.

use facet_core::{Light, Mesh, MeshHit};
use facet_math::{Ray, Vec3, EPSILON};

use crate::camera::Camera;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            meshes: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> &mut Self {
        self.meshes.push(mesh);
        self
    }

    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }

    /// Closest hit over every mesh. Equal distances keep the earlier mesh.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<MeshHit> {
        self.meshes
            .iter()
            .filter_map(|mesh| mesh.raycast(ray))
            .fold(None, |best: Option<MeshHit>, hit| match best {
                Some(current) if current.distance <= hit.distance => Some(current),
                _ => Some(hit),
            })
    }

    /// True when some mesh blocks the segment from `point` to `target`.
    pub fn is_occluded(&self, point: Vec3, target: Vec3) -> bool {
        let distance = point.distance(target);
        if distance < EPSILON {
            return false;
        }
        let ray = Ray::towards(point, target);
        self.meshes
            .iter()
            .filter_map(|mesh| mesh.raycast(&ray))
            .any(|hit| hit.distance < distance)
    }
}
