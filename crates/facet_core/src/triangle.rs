//! Triangle faces and the ray-triangle intersection kernel.
//!
//! Faces are index triples into a mesh's vertex table. Intersection is a
//! plane solve followed by three half-plane checks against the face normal.

use facet_math::{Aabb, Ray, Vec3, EPSILON};

/// A triangle referencing its mesh's vertex, normal and color tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub v0: u32,
    pub v1: u32,
    pub v2: u32,
    /// Index into the mesh's normal table
    pub normal: u32,
    /// Index into the mesh's color palette
    pub color: u32,
}

impl Face {
    /// A face over three vertices using normal 0 and color 0.
    ///
    /// [`crate::Mesh::new`] assigns the real normal index.
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self {
            v0,
            v1,
            v2,
            normal: 0,
            color: 0,
        }
    }

    /// Set the palette entry used for this face.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// The vertex indices in winding order.
    pub fn vertices(&self) -> [u32; 3] {
        [self.v0, self.v1, self.v2]
    }
}

/// Face normal for the winding `v0, v1, v2`: `normalize((v0 - v1) x (v2 - v1))`.
///
/// Zero-area faces get a zero normal, which the kernel treats as never hit.
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v0 - v1).cross(v2 - v1).normalize_or_zero()
}

/// Ray-triangle test.
///
/// Returns the distance along the ray, or `None` when the ray is parallel to
/// the triangle's plane, crosses it behind (or within [`EPSILON`] of) the
/// origin, or crosses it outside the triangle. Points on an edge count as
/// inside.
pub fn intersect(ray: &Ray, corners: [Vec3; 3], normal: Vec3) -> Option<f32> {
    let [v0, v1, v2] = corners;

    // Plane equation n.p + d = 0 through v0
    let d = -v0.dot(normal);
    let denom = normal.dot(ray.direction);
    if denom.abs() < EPSILON {
        return None;
    }
    let t = -(d + normal.dot(ray.origin)) / denom;
    if t < EPSILON {
        return None;
    }

    let p = ray.at(t);
    for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
        if (b - a).cross(p - a).dot(normal) > 0.0 {
            return None;
        }
    }
    Some(t)
}

/// Borrowed view of a mesh's triangle tables, shared by index build and query.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSet<'a> {
    pub vertices: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub faces: &'a [Face],
}

impl<'a> TriangleSet<'a> {
    pub fn new(vertices: &'a [Vec3], normals: &'a [Vec3], faces: &'a [Face]) -> Self {
        Self {
            vertices,
            normals,
            faces,
        }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The three corner positions of a face.
    pub fn corners(&self, face: u32) -> [Vec3; 3] {
        let f = &self.faces[face as usize];
        f.vertices().map(|v| self.vertices[v as usize])
    }

    /// Bounds of a single face.
    pub fn face_bounds(&self, face: u32) -> Aabb {
        let [a, b, c] = self.corners(face);
        Aabb::from_triangle(a, b, c)
    }

    /// Bounds of every face, or [`Aabb::EMPTY`] for an empty set.
    pub fn bounds(&self) -> Aabb {
        (0..self.faces.len() as u32).fold(Aabb::EMPTY, |acc, face| {
            Aabb::surrounding(&acc, &self.face_bounds(face))
        })
    }

    /// Ray test against one face of the set.
    pub fn intersect(&self, ray: &Ray, face: u32) -> Option<f32> {
        let normal = self.normals[self.faces[face as usize].normal as usize];
        intersect(ray, self.corners(face), normal)
    }
}
