//! Mesh-local spatial index.
//!
//! A tree of boxes over one mesh's triangles answering two queries: which leaf
//! contains a point, and which face a ray hits first. Three build strategies
//! produce the same node type:
//!
//! - **Clustering**: bottom-up agglomeration of per-face boxes by smallest joined volume.
//! - **Octree**: top-down midpoint subdivision into 8 octants, up to a fixed depth.
//! - **RTree**: incremental insertion with median splits of overfull leaves.
//!
//! The tree is built once and is read-only afterwards, so it can be shared
//! across render threads without locking.

mod clustering;
mod node;
mod octree;
mod rtree;

use std::fmt;

use facet_math::{Ray, Vec3};
use serde::Deserialize;

use crate::triangle::TriangleSet;

pub use node::{IndexHit, IndexNode};

/// Which construction strategy builds the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStrategy {
    #[default]
    Clustering,
    Octree,
    #[serde(alias = "r_tree", alias = "r-tree")]
    RTree,
}

impl fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexStrategy::Clustering => write!(f, "clustering"),
            IndexStrategy::Octree => write!(f, "octree"),
            IndexStrategy::RTree => write!(f, "rtree"),
        }
    }
}

/// Build thresholds for every strategy; only the selected strategy's fields are read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub strategy: IndexStrategy,
    /// Clustering stops merging once fewer root nodes than this remain
    pub cluster_branching: usize,
    /// Clustering subtrees with fewer faces collapse into one leaf
    pub cluster_min_faces: usize,
    /// Deepest octree level a leaf may be exploded to
    pub octree_max_depth: usize,
    /// Octree leaves holding more faces explode into octants
    pub octree_leaf_capacity: usize,
    /// Octree subtrees with fewer faces collapse into one leaf
    pub octree_min_faces: usize,
    /// R-tree leaves holding more faces split at a median
    pub rtree_max_leaf_faces: usize,
    /// Split halves become siblings while the parent has fewer children than this
    pub rtree_max_children: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            strategy: IndexStrategy::Clustering,
            cluster_branching: 8,
            cluster_min_faces: 8,
            octree_max_depth: 10,
            octree_leaf_capacity: 16,
            octree_min_faces: 8,
            rtree_max_leaf_faces: 64,
            rtree_max_children: 16,
        }
    }
}

impl IndexConfig {
    /// Default thresholds for the given strategy.
    pub fn new(strategy: IndexStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub nodes: usize,
    pub leaves: usize,
    pub empty_leaves: usize,
    pub depth: usize,
    /// Face references across all leaves; exceeds the face count when faces straddle leaves
    pub face_refs: usize,
}

/// A built spatial index over one mesh.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    strategy: IndexStrategy,
    root: IndexNode,
}

impl SpatialIndex {
    /// Build the tree for `triangles` with the configured strategy.
    pub fn build(triangles: &TriangleSet, config: &IndexConfig) -> Self {
        let root = match config.strategy {
            IndexStrategy::Clustering => clustering::build(triangles, config),
            IndexStrategy::Octree => octree::build(triangles, config),
            IndexStrategy::RTree => rtree::build(triangles, config),
        };
        let index = Self {
            strategy: config.strategy,
            root,
        };

        let stats = index.stats();
        log::debug!(
            "Built {} index over {} faces: {} nodes, {} leaves ({} empty), depth {}, {} face refs",
            index.strategy,
            triangles.len(),
            stats.nodes,
            stats.leaves,
            stats.empty_leaves,
            stats.depth,
            stats.face_refs
        );
        index
    }

    pub fn strategy(&self) -> IndexStrategy {
        self.strategy
    }

    pub fn root(&self) -> &IndexNode {
        &self.root
    }

    /// The leaf whose box contains `point`, or `None` if no leaf covers it.
    pub fn find(&self, point: Vec3) -> Option<&IndexNode> {
        self.root.find(point)
    }

    /// Nearest face hit along `ray`, in the same space the tree was built in.
    pub fn raycast(&self, ray: &Ray, triangles: &TriangleSet) -> Option<IndexHit> {
        self.root.raycast(ray, triangles)
    }

    pub fn leaves(&self) -> Vec<&IndexNode> {
        self.root.leaves()
    }

    pub fn stats(&self) -> IndexStats {
        let leaves = self.root.leaves();
        IndexStats {
            nodes: self.root.node_count(),
            leaves: leaves.len(),
            empty_leaves: leaves.iter().filter(|leaf| leaf.faces.is_empty()).count(),
            depth: self.root.depth(),
            face_refs: leaves.iter().map(|leaf| leaf.faces.len()).sum(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::grid;
    use super::*;
    use crate::triangle::TriangleSet;

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.strategy, IndexStrategy::Clustering);
        assert_eq!(config.cluster_branching, 8);
        assert_eq!(IndexConfig::new(IndexStrategy::Octree).octree_max_depth, 10);
    }

    #[test]
    fn test_strategy_deserialize() {
        let strategy: IndexStrategy = serde_json::from_str("\"rtree\"").unwrap();
        assert_eq!(strategy, IndexStrategy::RTree);
        let config: IndexConfig = serde_json::from_str(r#"{ "strategy": "octree" }"#).unwrap();
        assert_eq!(config.strategy, IndexStrategy::Octree);
        assert_eq!(config.octree_leaf_capacity, 16);
    }

    #[test]
    fn test_every_strategy_hits_the_grid() {
        let (vertices, normals, faces) = grid(6, 0.0);
        let triangles = TriangleSet::new(&vertices, &normals, &faces);

        for strategy in [IndexStrategy::Clustering, IndexStrategy::Octree, IndexStrategy::RTree] {
            let index = SpatialIndex::build(&triangles, &IndexConfig::new(strategy));
            assert_eq!(index.strategy(), strategy);

            let ray = Ray::new(Vec3::new(2.3, 5.0, 3.6), -Vec3::Y);
            let hit = index.raycast(&ray, &triangles).expect("grid is hit");
            assert!((hit.distance - 5.0).abs() < 1e-4, "{strategy}: {}", hit.distance);

            let ray = Ray::new(Vec3::new(2.3, 5.0, 3.6), Vec3::Y);
            assert!(index.raycast(&ray, &triangles).is_none(), "{strategy}");
        }
    }

    #[test]
    fn test_empty_mesh() {
        let triangles = TriangleSet::new(&[], &[], &[]);
        for strategy in [IndexStrategy::Clustering, IndexStrategy::Octree, IndexStrategy::RTree] {
            let index = SpatialIndex::build(&triangles, &IndexConfig::new(strategy));
            assert!(index.root().is_leaf());
            assert!(index.find(Vec3::ZERO).is_none());
            let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
            assert!(index.raycast(&ray, &triangles).is_none());
        }
    }
}
