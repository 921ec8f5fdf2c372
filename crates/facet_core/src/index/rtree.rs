//! Incremental median-split R-tree build.
//!
//! Faces are inserted one at a time, routed to every child box their bounds
//! overlap. A leaf that grows past `rtree_max_leaf_faces` is cut at the median
//! of the vertices it holds, along the axis whose median sits closest to the
//! box centre. The upper half becomes a sibling while the parent has fewer than
//! `rtree_max_children` children; otherwise the leaf turns into a two-child node.

use std::collections::BTreeSet;

use facet_math::{Aabb, EPSILON};

use super::{IndexConfig, IndexNode};
use crate::triangle::TriangleSet;

pub(crate) fn build(triangles: &TriangleSet, config: &IndexConfig) -> IndexNode {
    let mut root = IndexNode::leaf(triangles.bounds(), []);
    for face in 0..triangles.len() as u32 {
        // The root has no parent to take a sibling
        insert(&mut root, triangles, face, &triangles.face_bounds(face), false, config);
    }
    root
}

/// Insert `face` below `node`. Returns a new sibling when a leaf split hands its
/// upper half back to the parent.
fn insert(
    node: &mut IndexNode,
    triangles: &TriangleSet,
    face: u32,
    face_bounds: &Aabb,
    parent_has_room: bool,
    config: &IndexConfig,
) -> Option<IndexNode> {
    if !node.bounds.overlaps(face_bounds) {
        return None;
    }

    if node.is_leaf() {
        node.faces.insert(face);
        if node.faces.len() > config.rtree_max_leaf_faces {
            return split(node, triangles, parent_has_room);
        }
        return None;
    }

    // Siblings pushed during the loop already hold the face
    let existing = node.children.len();
    for i in 0..existing {
        let has_room = node.children.len() < config.rtree_max_children;
        let child = &mut node.children[i];
        if let Some(peer) = insert(child, triangles, face, face_bounds, has_room, config) {
            node.children.push(peer);
        }
    }
    None
}

fn split(node: &mut IndexNode, triangles: &TriangleSet, parent_has_room: bool) -> Option<IndexNode> {
    let (axis, value) = choose_split(node, triangles)?;
    let (low_bounds, high_bounds) = node.bounds.split_at(axis, value);

    let mut low = BTreeSet::new();
    let mut high = BTreeSet::new();
    for &face in &node.faces {
        let face_bounds = triangles.face_bounds(face);
        if low_bounds.overlaps(&face_bounds) {
            low.insert(face);
        }
        if high_bounds.overlaps(&face_bounds) {
            high.insert(face);
        }
    }

    let count = node.faces.len();
    if low.len() == count && high.len() == count {
        log::trace!("Skipping R-tree split on axis {axis}: every face straddles {value}");
        return None;
    }

    if parent_has_room {
        node.bounds = low_bounds;
        node.faces = low;
        return Some(IndexNode::leaf(high_bounds, high));
    }

    node.faces.clear();
    node.children = vec![
        IndexNode::leaf(low_bounds, low),
        IndexNode::leaf(high_bounds, high),
    ];
    None
}

/// Pick the cut for an overfull leaf: `(axis, coordinate)`.
///
/// Only vertices inside the leaf's box are sampled. An axis is eligible when its
/// samples have a non-degenerate spread and the median lies strictly inside the
/// box; among eligible axes the median nearest the box centre wins, ties going to
/// the lower axis. `None` leaves the node overfull.
fn choose_split(node: &IndexNode, triangles: &TriangleSet) -> Option<(usize, f32)> {
    let owned: BTreeSet<u32> = node
        .faces
        .iter()
        .flat_map(|&face| triangles.faces[face as usize].vertices())
        .filter(|&v| node.bounds.contains(triangles.vertices[v as usize]))
        .collect();
    if owned.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f32, f32)> = None;
    for axis in 0..3 {
        let mut coords: Vec<f32> = owned
            .iter()
            .map(|&v| triangles.vertices[v as usize][axis])
            .collect();
        coords.sort_by(f32::total_cmp);

        let spread = coords[coords.len() - 1] - coords[0];
        if spread < EPSILON {
            continue;
        }

        let median = coords[coords.len() / 2];
        let slab = node.bounds.axis_interval(axis);
        if median <= slab.min + EPSILON || median >= slab.max - EPSILON {
            continue;
        }

        let offset = (median - slab.midpoint()).abs();
        match best {
            Some((_, _, best_offset)) if best_offset <= offset => {}
            _ => best = Some((axis, median, offset)),
        }
    }
    best.map(|(axis, median, _)| (axis, median))
}
