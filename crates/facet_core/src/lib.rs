//! Facet Core - Meshes, mesh loading and the spatial index.
//!
//! This crate provides:
//!
//! - **Mesh data model**: `Face`, `Material`, `Mesh`, `Light`
//! - **Mesh loading**: the line-oriented `o`/`v`/`f` text format
//! - **Intersection kernel**: ray-triangle test over a mesh's tables
//! - **Spatial index**: clustering, octree and R-tree builds sharing one node type
//!
//! # Example
//!
//! ```ignore
//! use facet_core::{IndexConfig, IndexStrategy, Material, Mesh};
//! use facet_math::{Ray, Vec3};
//!
//! let config = IndexConfig::new(IndexStrategy::Octree);
//! let mesh = Mesh::load("obj/cow.obj", Material::default(), &config)?;
//! if let Some(hit) = mesh.raycast(&Ray::new(Vec3::new(0.0, 4.0, -6.0), Vec3::Z)) {
//!     println!("hit face {} at {}", hit.face, hit.distance);
//! }
//! ```

pub mod index;
pub mod light;
pub mod loader;
pub mod mesh;
pub mod triangle;

// Re-export commonly used types
pub use index::{IndexConfig, IndexHit, IndexNode, IndexStats, IndexStrategy, SpatialIndex};
pub use light::Light;
pub use loader::{parse_mesh, LoadError, LoadResult, ParsedMesh};
pub use mesh::{Material, Mesh, MeshHit};
pub use triangle::{Face, TriangleSet};
