//! JSON scene description.
//!
//! Everything except the mesh list has a default, so the smallest valid file is
//! `{ "meshes": [] }`. Mesh paths are relative to the scene file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use facet_core::{IndexConfig, Light, Material, Mesh};
use facet_math::Vec3;
use facet_renderer::{Camera, Exposure, RenderConfig, Scene};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub image: ImageSettings,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraSettings,
    pub meshes: Vec<MeshEntry>,
    #[serde(default)]
    pub lights: Vec<Light>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            width: 80,
            height: 80,
            output: PathBuf::from("img.ppm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FocalPlane {
    pub distance: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub rotation: Vec3,
    pub focal_plane: FocalPlane,
    pub exposure: Exposure,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: camera.position,
            rotation: camera.rotation,
            focal_plane: FocalPlane {
                distance: camera.focal_plane_distance,
                width: camera.focal_plane_width,
                height: camera.focal_plane_height,
            },
            exposure: camera.exposure,
        }
    }
}

impl Default for FocalPlane {
    fn default() -> Self {
        CameraSettings::default().focal_plane
    }
}

impl CameraSettings {
    pub fn to_camera(&self) -> Camera {
        Camera::new()
            .with_position(self.position, self.rotation)
            .with_focal_plane(
                self.focal_plane.distance,
                self.focal_plane.width,
                self.focal_plane.height,
            )
            .with_exposure(self.exposure)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeshEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default)]
    pub material: Material,
    #[serde(default)]
    pub index: IndexConfig,
}

impl SceneFile {
    /// Read and parse a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))
    }

    /// Load every mesh, resolving paths against `base_dir`, and assemble the scene.
    pub fn build_scene(&self, base_dir: &Path) -> Result<Scene> {
        let mut scene = Scene::new(self.camera.to_camera());

        for entry in &self.meshes {
            let path = base_dir.join(&entry.path);
            let mesh = Mesh::load(&path, entry.material, &entry.index)
                .with_context(|| format!("Failed to load mesh {}", path.display()))?
                .with_transform(entry.position, entry.rotation);
            log::info!(
                "Mesh '{}': {} faces, {} index",
                mesh.name,
                mesh.face_count(),
                entry.index.strategy
            );
            scene.add_mesh(mesh);
        }

        for light in &self.lights {
            scene.add_light(*light);
        }

        if scene.lights.is_empty() {
            log::warn!("Scene has no lights; only black will be rendered");
        }
        Ok(scene)
    }
}
