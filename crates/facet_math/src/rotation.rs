// Roll-pitch-yaw rotation and octant coding.
//
// Rotations are left-handed and clockwise: the roll (x) and yaw (z) angles turn
// by the negated angle, the pitch (y) angle by the angle itself, applied x, then
// y, then z.

use glam::{Quat, Vec3};

/// Quaternion equivalent of rotating by `rpy` (radians, x then y then z).
pub fn rotation(rpy: Vec3) -> Quat {
    Quat::from_rotation_z(-rpy.z) * Quat::from_rotation_y(rpy.y) * Quat::from_rotation_x(-rpy.x)
}

/// Rotate `v` by the roll-pitch-yaw angles `rpy`.
pub fn rotate(v: Vec3, rpy: Vec3) -> Vec3 {
    rotation(rpy) * v
}

/// Undo [`rotate`]: `unrotate(rotate(v, rpy), rpy) == v`.
pub fn unrotate(v: Vec3, rpy: Vec3) -> Vec3 {
    rotation(rpy).inverse() * v
}

/// 3-bit code naming which side of `plane` the point lies on, one bit per axis.
///
/// Bit 0 is set when `point.x > plane.x`, bit 1 for y, bit 2 for z. Points on
/// the plane fall to the lower side.
pub fn octant(point: Vec3, plane: Vec3) -> u8 {
    let mut code = 0;
    if point.x > plane.x {
        code |= 0b001;
    }
    if point.y > plane.y {
        code |= 0b010;
    }
    if point.z > plane.z {
        code |= 0b100;
    }
    code
}
