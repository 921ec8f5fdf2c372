use crate::{Interval, Ray, Vec3, EPSILON};

/// Axis-Aligned Bounding Box for the spatial index.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Containment is closed: points on a face of the box are inside it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));
        Self::new(x, y, z)
    }

    /// Create an AABB from its lower and upper corners without reordering or padding.
    ///
    /// Used when cutting existing boxes, where the corners are already ordered.
    pub fn from_corners(lower: Vec3, upper: Vec3) -> Self {
        Self {
            x: Interval::new(lower.x, upper.x),
            y: Interval::new(lower.y, upper.y),
            z: Interval::new(lower.z, upper.z),
        }
    }

    /// The bounds of a triangle.
    pub fn from_triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::from_points(a.min(b).min(c), a.max(b).max(c))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Lower-left-back corner.
    pub fn lower(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Upper-right-front corner.
    pub fn upper(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.midpoint(), self.y.midpoint(), self.z.midpoint())
    }

    /// Absolute volume of the box.
    pub fn volume(&self) -> f32 {
        (self.x.size() * self.y.size() * self.z.size()).abs()
    }

    /// False for boxes with an inverted axis, including [`Aabb::EMPTY`].
    pub fn is_valid(&self) -> bool {
        self.x.min <= self.x.max && self.y.min <= self.y.max && self.z.min <= self.z.max
    }

    /// Closed containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y) && self.z.contains(point.z)
    }

    /// True if the two boxes share at least one point.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x.overlaps(&other.x) && self.y.overlaps(&other.y) && self.z.overlaps(&other.z)
    }

    /// The child box selected by a 3-bit octant code, cut at `plane`.
    ///
    /// A set bit takes the upper half on that axis.
    pub fn octant_child(&self, code: u8, plane: Vec3) -> Aabb {
        let mut lower = self.lower();
        let mut upper = self.upper();
        for axis in 0..3 {
            if code & (1 << axis) != 0 {
                lower[axis] = plane[axis];
            } else {
                upper[axis] = plane[axis];
            }
        }
        Aabb::from_corners(lower, upper)
    }

    /// Cut the box with the plane `axis = value`, returning (lower half, upper half).
    pub fn split_at(&self, axis: usize, value: f32) -> (Aabb, Aabb) {
        let mut low_upper = self.upper();
        let mut high_lower = self.lower();
        low_upper[axis] = value;
        high_lower[axis] = value;
        (
            Aabb::from_corners(self.lower(), low_upper),
            Aabb::from_corners(high_lower, self.upper()),
        )
    }

    /// Test if a ray's parametric range overlaps this AABB (slab method).
    ///
    /// Division by a zero direction component yields infinities, which keep
    /// axis-aligned rays correct. The test admits grazing hits within [`EPSILON`].
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        if !self.is_valid() {
            return false;
        }

        let mut entry = ray_t.min;
        let mut exit = ray_t.max;
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (slab.min - r.origin[axis]) * adinv;
            let mut t1 = (slab.max - r.origin[axis]) * adinv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // f32::max/min ignore the NaN of a ray lying in a slab plane
            entry = entry.max(t0);
            exit = exit.min(t1);
        }
        entry <= exit + EPSILON
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// Contains nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
