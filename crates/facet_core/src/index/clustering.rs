//! Agglomerative clustering build.
//!
//! Starts from one leaf per face and repeatedly merges the last queued node with
//! whichever remaining node gives the smallest joined volume, until fewer than
//! `cluster_branching` roots remain. The result is then flattened (shallow
//! internal children are absorbed into their parent) and sparse subtrees are
//! collapsed back into leaves.

use facet_math::Aabb;

use super::{IndexConfig, IndexNode};
use crate::triangle::TriangleSet;

pub(crate) fn build(triangles: &TriangleSet, config: &IndexConfig) -> IndexNode {
    if triangles.is_empty() {
        return IndexNode::default();
    }

    let mut queue: Vec<IndexNode> = (0..triangles.len() as u32)
        .map(|face| IndexNode::leaf(triangles.face_bounds(face), [face]))
        .collect();

    while queue.len() >= config.cluster_branching.max(2) {
        let Some(node) = queue.pop() else { break };
        let Some(partner) = tightest_partner(&node.bounds, &queue) else {
            queue.push(node);
            break;
        };
        let other = std::mem::take(&mut queue[partner]);
        queue[partner] = node.join(other);
    }

    let mut root = IndexNode::internal(queue);
    subsume_children(&mut root, config.cluster_branching);
    root.collapse_sparse(config.cluster_min_faces);
    root
}

/// Index of the queued node whose join with `bounds` has the least volume.
///
/// Ties keep the earliest candidate.
fn tightest_partner(bounds: &Aabb, queue: &[IndexNode]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, candidate) in queue.iter().enumerate() {
        let volume = Aabb::surrounding(bounds, &candidate.bounds).volume();
        match best {
            Some((_, best_volume)) if best_volume <= volume => {}
            _ => best = Some((i, volume)),
        }
    }
    best.map(|(i, _)| i)
}

/// Absorb grandchildren while a node has fewer than `branching` children and its
/// first child is internal, then recurse.
fn subsume_children(node: &mut IndexNode, branching: usize) {
    while !node.children.is_empty() && node.children.len() < branching {
        if node.children[0].is_leaf() {
            break;
        }
        let front = node.children.remove(0);
        node.children.extend(front.children);
    }
    for child in &mut node.children {
        subsume_children(child, branching);
    }
}
