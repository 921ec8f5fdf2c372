//! Triangle meshes with a rigid transform and their own spatial index.
//!
//! A mesh is built once from parsed geometry: face normals are computed, the
//! index is built over the untransformed vertices, and nothing changes after
//! that. Rays are moved into mesh space for the index query and hits are moved
//! back out to world space.

use facet_math::{rotate, unrotate, Aabb, Ray, Vec3};
use serde::Deserialize;

use crate::index::{IndexConfig, SpatialIndex};
use crate::loader::{LoadError, LoadResult};
use crate::triangle::{face_normal, Face, TriangleSet};

/// Surface scalars shared by every face of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Refractive index of the mesh interior
    pub ior: f32,
    /// Weight of direct (diffuse) lighting
    pub matte: f32,
    /// Weight of mirror reflection
    pub specular: f32,
    /// Carried for scene descriptions; transport does not read it yet
    pub scattering: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ior: 1.0,
            matte: 0.2,
            specular: 1.0,
            scattering: 0.0,
        }
    }
}

impl Material {
    pub fn new(ior: f32, matte: f32, specular: f32, scattering: f32) -> Self {
        Self {
            ior,
            matte,
            specular,
            scattering,
        }
    }
}

/// Nearest hit of a world-space ray on one mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Distance along the world ray (rotation preserves length)
    pub distance: f32,
    pub face: u32,
    /// World-space hit point
    pub point: Vec3,
    /// World-space face normal, as wound in the file
    pub normal: Vec3,
    /// Palette colour of the face
    pub color: Vec3,
    pub material: Material,
}

/// A triangle mesh placed in the scene.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec3>,
    faces: Vec<Face>,
    pub material: Material,
    /// World-space translation
    pub position: Vec3,
    /// Roll-pitch-yaw in radians
    pub rotation: Vec3,
    index: SpatialIndex,
}

impl Mesh {
    /// Build a mesh, computing one normal per face and the spatial index.
    ///
    /// Every face must reference valid vertices and palette entries. An empty
    /// palette becomes a single white entry.
    pub fn new(
        vertices: Vec<Vec3>,
        mut faces: Vec<Face>,
        mut colors: Vec<Vec3>,
        material: Material,
        config: &IndexConfig,
    ) -> LoadResult<Self> {
        if colors.is_empty() {
            colors.push(Vec3::ONE);
        }

        let mut normals = Vec::with_capacity(faces.len());
        for (i, face) in faces.iter_mut().enumerate() {
            if let Some(&v) = face.vertices().iter().find(|&&v| v as usize >= vertices.len()) {
                return Err(LoadError::InvalidFace {
                    face: i,
                    message: format!("vertex {v} out of range ({} vertices)", vertices.len()),
                });
            }
            if face.color as usize >= colors.len() {
                return Err(LoadError::InvalidFace {
                    face: i,
                    message: format!(
                        "color {} out of range ({} colors)",
                        face.color,
                        colors.len()
                    ),
                });
            }

            let [a, b, c] = face.vertices().map(|v| vertices[v as usize]);
            face.normal = normals.len() as u32;
            normals.push(face_normal(a, b, c));
        }

        let index = SpatialIndex::build(&TriangleSet::new(&vertices, &normals, &faces), config);

        Ok(Self {
            name: String::new(),
            vertices,
            normals,
            colors,
            faces,
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            index,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Place the mesh: translate by `position` after rotating by `rotation` (roll-pitch-yaw).
    pub fn with_transform(mut self, position: Vec3, rotation: Vec3) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    /// Nearest hit of a world-space ray, or `None` when the ray misses the mesh.
    pub fn raycast(&self, ray: &Ray) -> Option<MeshHit> {
        let local = Ray::new(
            unrotate(ray.origin - self.position, self.rotation),
            unrotate(ray.direction, self.rotation),
        );
        let hit = self.index.raycast(&local, &self.triangles())?;

        let face = &self.faces[hit.face as usize];
        Some(MeshHit {
            distance: hit.distance,
            face: hit.face,
            point: ray.at(hit.distance),
            normal: rotate(self.normals[face.normal as usize], self.rotation),
            color: self.colors[face.color as usize],
            material: self.material,
        })
    }

    /// Borrowed triangle tables in mesh space.
    pub fn triangles(&self) -> TriangleSet<'_> {
        TriangleSet::new(&self.vertices, &self.normals, &self.faces)
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Mesh-space bounds of the geometry.
    pub fn bounds(&self) -> Aabb {
        self.triangles().bounds()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexStrategy;
    use std::f32::consts::FRAC_PI_2;

    /// Unit triangle at z = 0 whose normal faces -z.
    fn unit_triangle(material: Material) -> Mesh {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let faces = vec![Face::new(0, 1, 2)];
        Mesh::new(vertices, faces, vec![], material, &IndexConfig::default()).unwrap()
    }

    #[test]
    fn test_material_defaults() {
        let material = Material::default();
        assert_eq!(material, Material::new(1.0, 0.2, 1.0, 0.0));
    }

    #[test]
    fn test_normals_computed_once_per_face() {
        let mesh = unit_triangle(Material::default());
        assert_eq!(mesh.normals(), &[-Vec3::Z]);
        assert_eq!(mesh.faces()[0].normal, 0);
        assert_eq!(mesh.colors(), &[Vec3::ONE]);
    }

    #[test]
    fn test_scenario_triangle_hit_and_miss() {
        let glass = Material::new(1.5, 0.1, 0.8, 0.0);
        let mesh = unit_triangle(glass);

        let hit = mesh
            .raycast(&Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z))
            .expect("ray through the corner hits");
        assert!((hit.distance - 1.0).abs() < 1e-6);
        assert_eq!(hit.material, glass);
        assert_eq!(hit.face, 0);
        assert!(hit.point.length() < 1e-6);

        assert!(mesh.raycast(&Ray::new(Vec3::new(5.0, 5.0, -1.0), Vec3::Z)).is_none());
    }

    #[test]
    fn test_translated_mesh() {
        let mesh = unit_triangle(Material::default())
            .with_transform(Vec3::new(10.0, 0.0, 2.0), Vec3::ZERO);

        let ray = Ray::new(Vec3::new(10.25, 0.25, 0.0), Vec3::Z);
        let hit = mesh.raycast(&ray).expect("moved triangle is hit");
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(10.25, 0.25, 2.0)).length() < 1e-5);

        let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::Z);
        assert!(mesh.raycast(&ray).is_none());
    }

    #[test]
    fn test_rotated_mesh_maps_hit_back_to_world() {
        // Yaw a quarter turn: the triangle now stands in a plane of constant x
        let rotation = Vec3::new(0.0, FRAC_PI_2, 0.0);
        let mesh = unit_triangle(Material::default()).with_transform(Vec3::ZERO, rotation);

        let target = rotate(Vec3::new(0.25, 0.25, 0.0), rotation);
        let normal = rotate(-Vec3::Z, rotation);
        let origin = target - normal * 3.0;
        let hit = mesh
            .raycast(&Ray::new(origin, normal))
            .expect("rotated triangle is hit");

        assert!((hit.distance - 3.0).abs() < 1e-4);
        assert!((hit.point - target).length() < 1e-4);
        assert!((hit.normal - normal).length() < 1e-5);
    }

    #[test]
    fn test_invalid_face_rejected() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let config = IndexConfig::default();

        let faces = vec![Face::new(0, 1, 5)];
        let err = Mesh::new(vertices.clone(), faces, vec![], Material::default(), &config)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidFace { face: 0, .. }));

        let faces = vec![Face::new(0, 1, 2).with_color(3)];
        let err = Mesh::new(vertices, faces, vec![Vec3::ONE], Material::default(), &config)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidFace { face: 0, .. }));
    }

    #[test]
    fn test_every_strategy_builds() {
        for strategy in [IndexStrategy::Clustering, IndexStrategy::Octree, IndexStrategy::RTree] {
            let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
            let faces = vec![Face::new(0, 1, 2), Face::new(1, 3, 2)];
            let config = IndexConfig::new(strategy);
            let mesh = Mesh::new(vertices, faces, vec![], Material::default(), &config).unwrap();
            assert_eq!(mesh.index().strategy(), strategy);
            assert!(mesh.raycast(&Ray::new(Vec3::new(0.75, 0.75, -1.0), Vec3::Z)).is_some());
        }
    }
}
