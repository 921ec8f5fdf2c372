//! Spatial index tree nodes.

use std::collections::BTreeSet;

use facet_math::{octant, Aabb, Interval, Ray, Vec3};

use crate::triangle::TriangleSet;

/// Nearest face hit reported by an index query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// Distance along the (mesh-space) ray
    pub distance: f32,
    /// Index of the face that was hit
    pub face: u32,
}

/// A box-shaped region owning either incident faces (leaf) or child nodes.
///
/// Children are owned by their parent; no node is shared. Internal nodes keep
/// an empty face set.
#[derive(Debug, Clone)]
pub struct IndexNode {
    pub bounds: Aabb,
    pub children: Vec<IndexNode>,
    pub faces: BTreeSet<u32>,
    /// Octree splitting plane; set while the node has its 8 octant children.
    pub(crate) split: Option<Vec3>,
}

impl Default for IndexNode {
    fn default() -> Self {
        Self::leaf(Aabb::EMPTY, [])
    }
}

impl IndexNode {
    /// A leaf holding the given faces.
    pub fn leaf(bounds: Aabb, faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            bounds,
            children: Vec::new(),
            faces: faces.into_iter().collect(),
            split: None,
        }
    }

    /// An internal node over `children`, bounded by their union.
    pub fn internal(children: Vec<IndexNode>) -> Self {
        let bounds = children
            .iter()
            .fold(Aabb::EMPTY, |acc, child| Aabb::surrounding(&acc, &child.bounds));
        Self {
            bounds,
            children,
            faces: BTreeSet::new(),
            split: None,
        }
    }

    /// Merge two nodes under a new parent.
    pub fn join(self, other: IndexNode) -> IndexNode {
        Self::internal(vec![self, other])
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Descend to the leaf containing `point`.
    ///
    /// Octree nodes pick their child by octant code; other nodes take the first
    /// child whose box contains the point, so overlapping siblings resolve by
    /// child order. Returns `None` when no leaf covers the point.
    pub fn find(&self, point: Vec3) -> Option<&IndexNode> {
        if self.is_leaf() {
            return self.bounds.contains(point).then_some(self);
        }
        match self.split {
            Some(plane) if self.children.len() == 8 => {
                self.children[octant(point, plane) as usize].find(point)
            }
            _ => self
                .children
                .iter()
                .find(|child| child.bounds.contains(point))
                .and_then(|child| child.find(point)),
        }
    }

    /// Nearest positive-distance hit below this node.
    ///
    /// Subtrees whose box the ray misses are skipped; every surviving child is
    /// visited and the closest hit kept. Equal distances keep the first hit found.
    pub fn raycast(&self, ray: &Ray, triangles: &TriangleSet) -> Option<IndexHit> {
        if !self.bounds.hit(ray, Interval::new(0.0, f32::INFINITY)) {
            return None;
        }

        if self.is_leaf() {
            self.faces
                .iter()
                .filter_map(|&face| {
                    triangles
                        .intersect(ray, face)
                        .map(|distance| IndexHit { distance, face })
                })
                .fold(None, closer)
        } else {
            self.children
                .iter()
                .filter_map(|child| child.raycast(ray, triangles))
                .fold(None, closer)
        }
    }

    /// Union of the faces held anywhere in this subtree.
    pub fn descendant_faces(&self) -> BTreeSet<u32> {
        let mut faces = self.faces.clone();
        for child in &self.children {
            faces.extend(child.descendant_faces());
        }
        faces
    }

    /// Number of distinct faces in this subtree.
    pub fn face_count(&self) -> usize {
        if self.is_leaf() {
            self.faces.len()
        } else {
            self.descendant_faces().len()
        }
    }

    /// Turn this node into a leaf holding every face of its subtree.
    pub fn contract(&mut self) {
        if self.is_leaf() {
            return;
        }
        self.faces = self.descendant_faces();
        self.children.clear();
        self.split = None;
    }

    /// Collapse every subtree with fewer than `min_faces` distinct faces into a leaf.
    pub(crate) fn collapse_sparse(&mut self, min_faces: usize) {
        if self.is_leaf() {
            return;
        }
        if self.face_count() < min_faces {
            self.contract();
            return;
        }
        for child in &mut self.children {
            child.collapse_sparse(min_faces);
        }
    }

    /// All leaves in depth-first order.
    pub fn leaves(&self) -> Vec<&IndexNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a IndexNode>) {
        if self.is_leaf() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(IndexNode::node_count).sum::<usize>()
    }

    /// Longest root-to-leaf path, counting edges.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

fn closer(best: Option<IndexHit>, hit: IndexHit) -> Option<IndexHit> {
    match best {
        Some(current) if current.distance <= hit.distance => Some(current),
        _ => Some(hit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(lower: f32, upper: f32) -> Aabb {
        Aabb::from_points(Vec3::splat(lower), Vec3::splat(upper))
    }

    #[test]
    fn test_leaf_and_internal() {
        let a = IndexNode::leaf(cube(0.0, 1.0), [0]);
        let b = IndexNode::leaf(cube(2.0, 3.0), [1, 2]);
        assert!(a.is_leaf());

        let parent = a.join(b);
        assert!(!parent.is_leaf());
        assert!(parent.faces.is_empty());
        assert_eq!(parent.bounds, cube(0.0, 3.0));
        assert_eq!(parent.face_count(), 3);
        assert_eq!(parent.node_count(), 3);
        assert_eq!(parent.depth(), 1);
    }

    #[test]
    fn test_find_first_match_wins() {
        let a = IndexNode::leaf(cube(0.0, 2.0), [0]);
        let b = IndexNode::leaf(cube(1.0, 3.0), [1]);
        let parent = IndexNode::internal(vec![a, b]);

        // Inside the overlap: the first child in order
        let leaf = parent.find(Vec3::splat(1.5)).expect("covered");
        assert!(leaf.faces.contains(&0));

        let leaf = parent.find(Vec3::splat(2.5)).expect("covered");
        assert!(leaf.faces.contains(&1));

        assert!(parent.find(Vec3::splat(5.0)).is_none());
    }

    #[test]
    fn test_find_by_octant() {
        let bounds = cube(0.0, 2.0);
        let plane = bounds.centroid();
        let children = (0..8u8)
            .map(|code| IndexNode::leaf(bounds.octant_child(code, plane), [code as u32]))
            .collect();
        let node = IndexNode {
            bounds,
            children,
            faces: BTreeSet::new(),
            split: Some(plane),
        };

        let leaf = node.find(Vec3::new(1.5, 0.5, 1.5)).expect("covered");
        assert!(leaf.faces.contains(&0b101));

        // Outside the root lands in an octant that does not contain it
        assert!(node.find(Vec3::new(3.0, 3.0, 3.0)).is_none());
    }

    #[test]
    fn test_contract_unions_all_descendants() {
        let deep = IndexNode::internal(vec![
            IndexNode::leaf(cube(0.0, 1.0), [0, 1]),
            IndexNode::leaf(cube(1.0, 2.0), [1, 2]),
        ]);
        let mut root = IndexNode::internal(vec![deep, IndexNode::leaf(cube(2.0, 3.0), [3])]);

        root.contract();
        assert!(root.is_leaf());
        assert_eq!(root.faces.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(root.bounds, cube(0.0, 3.0));
    }

    #[test]
    fn test_collapse_sparse_threshold() {
        let mut root = IndexNode::internal(vec![
            IndexNode::leaf(cube(0.0, 1.0), [0, 1, 2]),
            IndexNode::internal(vec![
                IndexNode::leaf(cube(1.0, 2.0), [3]),
                IndexNode::leaf(cube(2.0, 3.0), [4]),
            ]),
        ]);

        root.collapse_sparse(3);
        assert!(!root.is_leaf());
        assert!(root.children[1].is_leaf());
        assert_eq!(root.children[1].faces.len(), 2);

        root.collapse_sparse(6);
        assert!(root.is_leaf());
        assert_eq!(root.face_count(), 5);
    }

    #[test]
    fn test_leaves_in_order() {
        let root = IndexNode::internal(vec![
            IndexNode::leaf(cube(0.0, 1.0), [7]),
            IndexNode::internal(vec![IndexNode::leaf(cube(1.0, 2.0), [8])]),
        ]);
        let leaves: Vec<u32> = root
            .leaves()
            .iter()
            .flat_map(|leaf| leaf.faces.iter().copied())
            .collect();
        assert_eq!(leaves, vec![7, 8]);
    }
}
