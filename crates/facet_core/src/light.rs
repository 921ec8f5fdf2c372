//! Point lights.

use facet_math::Vec3;
use serde::Deserialize;

/// A point light emitting `intensity` (per channel) from `position`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub intensity: Vec3,
}

impl Light {
    pub fn new(position: Vec3, intensity: Vec3) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// Unit-intensity white light.
    pub fn white(position: Vec3) -> Self {
        Self::new(position, Vec3::ONE)
    }
}
