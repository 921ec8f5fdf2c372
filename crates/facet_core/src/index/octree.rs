//! Midpoint octree build.
//!
//! The root covers the mesh bounds. Faces are inserted one at a time and routed
//! to every octant their extent reaches; a leaf holding more than
//! `octree_leaf_capacity` faces explodes into 8 octants cut at its centre, until
//! `octree_max_depth`. Sparse subtrees are collapsed bottom-up once every face is in.

use facet_math::Vec3;

use super::{IndexConfig, IndexNode};
use crate::triangle::TriangleSet;

pub(crate) fn build(triangles: &TriangleSet, config: &IndexConfig) -> IndexNode {
    let mut root = IndexNode::leaf(triangles.bounds(), []);
    if triangles.is_empty() {
        return root;
    }

    for face in 0..triangles.len() as u32 {
        let (lo, hi) = extent(triangles, face);
        insert(&mut root, triangles, face, lo, hi, 0, config);
    }
    collapse(&mut root, config.octree_min_faces);
    root
}

/// Unpadded extent of a face.
fn extent(triangles: &TriangleSet, face: u32) -> (Vec3, Vec3) {
    let [a, b, c] = triangles.corners(face);
    (a.min(b).min(c), a.max(b).max(c))
}

/// True if a face spanning `lo..=hi` belongs in octant `code` around `plane`.
///
/// Each half is half-open: a face ending on the plane stays below it, and a face
/// lying in the plane goes above it. Faces on a cut, and every face of a flat
/// node, therefore land on one side only, while each point of the face still
/// lies in the closed box of an octant that holds it.
fn in_octant(code: u8, lo: Vec3, hi: Vec3, plane: Vec3) -> bool {
    (0..3).all(|axis| {
        if code & (1 << axis) != 0 {
            hi[axis] > plane[axis] || lo[axis] >= plane[axis]
        } else {
            lo[axis] < plane[axis]
        }
    })
}

fn insert(
    node: &mut IndexNode,
    triangles: &TriangleSet,
    face: u32,
    lo: Vec3,
    hi: Vec3,
    depth: usize,
    config: &IndexConfig,
) {
    if node.is_leaf() {
        node.faces.insert(face);
        if node.faces.len() > config.octree_leaf_capacity && depth < config.octree_max_depth {
            explode(node, triangles, depth, config);
        }
        return;
    }

    let Some(plane) = node.split else {
        return;
    };
    for (code, child) in (0..8u8).zip(&mut node.children) {
        if in_octant(code, lo, hi, plane) {
            insert(child, triangles, face, lo, hi, depth + 1, config);
        }
    }
}

/// Split a leaf into its 8 octants and route each face to the octants it reaches.
///
/// Nothing changes when the split could not separate the faces: either every
/// octant would receive all of them, or the octants together would hold more
/// than twice as many references as the leaf. The leaf stays overfull instead.
fn explode(node: &mut IndexNode, triangles: &TriangleSet, depth: usize, config: &IndexConfig) {
    let plane = node.bounds.centroid();
    let mut children: Vec<IndexNode> = (0..8u8)
        .map(|code| IndexNode::leaf(node.bounds.octant_child(code, plane), []))
        .collect();

    for &face in &node.faces {
        let (lo, hi) = extent(triangles, face);
        for (code, child) in (0..8u8).zip(&mut children) {
            if in_octant(code, lo, hi, plane) {
                child.faces.insert(face);
            }
        }
    }

    let count = node.faces.len();
    let refs: usize = children.iter().map(|child| child.faces.len()).sum();
    if children.iter().all(|child| child.faces.len() == count) || refs > 2 * count {
        log::trace!(
            "Keeping overfull octree leaf at {:?}: {} faces would need {} references",
            node.bounds.lower(),
            count,
            refs
        );
        return;
    }

    for child in &mut children {
        let held = child.faces.len();
        if held > config.octree_leaf_capacity && held < count && depth + 1 < config.octree_max_depth
        {
            explode(child, triangles, depth + 1, config);
        }
    }

    node.faces.clear();
    node.children = children;
    node.split = Some(plane);
}

/// Bottom-up collapse of subtrees holding fewer than `min_faces` distinct faces.
///
/// Children are visited before their parent. A child never holds more distinct
/// faces than its parent, so a parent below the threshold only ever finds
/// children that have already collapsed.
fn collapse(node: &mut IndexNode, min_faces: usize) {
    if node.is_leaf() {
        return;
    }
    for child in &mut node.children {
        collapse(child, min_faces);
    }

    let count = node.face_count();
    if count < min_faces {
        log::trace!(
            "Collapsing octree node at {:?} into a leaf of {} faces",
            node.bounds.lower(),
            count
        );
        node.contract();
    }
}
