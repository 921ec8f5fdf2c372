//! Pinhole camera and exposure.

use facet_math::{rotate, Vec3};
use serde::Deserialize;

use crate::ray::LightRay;

/// How the finished radiance buffer is mapped into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Exposure {
    /// Divide each channel by its maximum over the image
    #[default]
    AutoLinear,
    /// Divide every channel by a fixed energy
    Manual {
        #[serde(default = "default_max_energy")]
        max_energy: f32,
    },
    /// Auto-linear, then a `1 / gamma` power curve
    AutoGamma {
        #[serde(default = "default_gamma")]
        gamma: f32,
    },
}

fn default_max_energy() -> f32 {
    55.0
}

fn default_gamma() -> f32 {
    2.2
}

impl Exposure {
    /// Manual exposure with the default energy.
    pub fn manual() -> Self {
        Exposure::Manual {
            max_energy: default_max_energy(),
        }
    }

    /// Normalize `pixels` in place and clamp every channel to `[0, 1]`.
    ///
    /// Auto modes leave a channel unscaled when its maximum is not positive.
    pub fn apply(&self, pixels: &mut [Vec3]) {
        let divisor = match *self {
            Exposure::Manual { max_energy } if max_energy > 0.0 => Vec3::splat(max_energy),
            Exposure::Manual { .. } => Vec3::ONE,
            Exposure::AutoLinear | Exposure::AutoGamma { .. } => {
                let max = pixels
                    .iter()
                    .fold(Vec3::splat(f32::NEG_INFINITY), |acc, p| acc.max(*p));
                log::info!("Max luminance ({}, {}, {})", max.x, max.y, max.z);
                Vec3::select(max.cmpgt(Vec3::ZERO), max, Vec3::ONE)
            }
        };

        let inv_gamma = match *self {
            Exposure::AutoGamma { gamma } if gamma > 0.0 => Some(1.0 / gamma),
            _ => None,
        };

        for pixel in pixels.iter_mut() {
            let mut value = (*pixel / divisor).clamp(Vec3::ZERO, Vec3::ONE);
            if let Some(power) = inv_gamma {
                value = value.powf(power);
            }
            *pixel = value;
        }
    }
}

/// A pinhole camera looking down its local +Z axis through a focal plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Roll-pitch-yaw in radians
    pub rotation: Vec3,
    pub focal_plane_distance: f32,
    pub focal_plane_width: f32,
    pub focal_plane_height: f32,
    pub exposure: Exposure,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 4.0, -6.0),
            rotation: Vec3::ZERO,
            focal_plane_distance: 1.0,
            focal_plane_width: 4.0,
            focal_plane_height: 4.0,
            exposure: Exposure::AutoLinear,
        }
    }
}

impl Camera {
    /// Create a camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set camera placement.
    pub fn with_position(mut self, position: Vec3, rotation: Vec3) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    /// Set focal plane geometry.
    pub fn with_focal_plane(mut self, distance: f32, width: f32, height: f32) -> Self {
        self.focal_plane_distance = distance;
        self.focal_plane_width = width;
        self.focal_plane_height = height;
        self
    }

    /// Set exposure mode.
    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    /// Camera ray through pixel `pixel_id` of a `width x height` image (row-major).
    ///
    /// The image centre (integer half width and height) maps to the focal plane
    /// centre; rows grow downwards.
    pub fn primary_ray(&self, width: u32, height: u32, pixel_id: usize) -> LightRay {
        let row = (pixel_id / width as usize) as i64;
        let col = (pixel_id % width as usize) as i64;
        let fold_row = (height / 2) as i64;
        let fold_col = (width / 2) as i64;

        let x = (col - fold_col) as f32 * self.focal_plane_width / width as f32;
        let y = (fold_row - row) as f32 * self.focal_plane_height / height as f32;
        let direction = Vec3::new(x, y, self.focal_plane_distance).normalize();

        LightRay::primary(self.position, rotate(direction, self.rotation))
    }

    /// Apply this camera's exposure to a finished radiance buffer.
    pub fn expose(&self, pixels: &mut [Vec3]) {
        self.exposure.apply(pixels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::new();
        assert_eq!(camera.position, Vec3::new(0.0, 4.0, -6.0));
        assert_eq!(camera.focal_plane_width, 4.0);
        assert_eq!(camera.exposure, Exposure::AutoLinear);
    }

    #[test]
    fn test_centre_pixel_looks_forward() {
        let camera = Camera::new().with_position(Vec3::ZERO, Vec3::ZERO);
        let ray = camera.primary_ray(80, 80, 40 * 80 + 40);
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!((ray.direction - Vec3::Z).length() < 1e-6);
        assert_eq!(ray.intensity, Vec3::ONE);
    }

    #[test]
    fn test_corner_pixels() {
        let camera = Camera::new().with_focal_plane(1.0, 2.0, 2.0);

        // Top-left: -x, +y
        let ray = camera.primary_ray(4, 4, 0);
        let expected = Vec3::new(-1.0, 1.0, 1.0).normalize();
        assert!((ray.direction - expected).length() < 1e-6);

        // Bottom-right: one step short of the far edge
        let ray = camera.primary_ray(4, 4, 15);
        let expected = Vec3::new(0.5, -0.5, 1.0).normalize();
        assert!((ray.direction - expected).length() < 1e-6);
    }

    #[test]
    fn test_rotated_camera() {
        let rotation = Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let camera = Camera::new().with_position(Vec3::ZERO, rotation);
        let ray = camera.primary_ray(10, 10, 55);
        assert!((ray.direction - rotate(Vec3::Z, rotation)).length() < 1e-6);
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_auto_linear_exposure() {
        let mut pixels = vec![
            Vec3::new(2.0, 0.5, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(4.0, 0.25, 0.0),
        ];
        Exposure::AutoLinear.apply(&mut pixels);
        assert_eq!(pixels[0], Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(pixels[2], Vec3::new(1.0, 0.25, 0.0));
    }

    #[test]
    fn test_auto_exposure_is_idempotent() {
        let mut pixels = vec![
            Vec3::new(1.0, 0.2, 0.3),
            Vec3::new(0.5, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 0.7),
        ];
        let before = pixels.clone();
        Exposure::AutoLinear.apply(&mut pixels);
        assert_eq!(pixels, before);
        Exposure::AutoLinear.apply(&mut pixels);
        assert_eq!(pixels, before);
    }

    #[test]
    fn test_manual_exposure_clamps() {
        let mut pixels = vec![Vec3::new(110.0, 27.5, -3.0)];
        Exposure::manual().apply(&mut pixels);
        assert_eq!(pixels[0], Vec3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_gamma_exposure() {
        let mut pixels = vec![Vec3::new(0.25, 1.0, 0.0), Vec3::new(1.0, 0.5, 0.0)];
        Exposure::AutoGamma { gamma: 2.0 }.apply(&mut pixels);
        assert!((pixels[0].x - 0.5).abs() < 1e-6);
        assert!((pixels[1].y - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_exposure_deserialize() {
        let exposure: Exposure = serde_json::from_str(r#"{ "mode": "manual" }"#).unwrap();
        assert_eq!(exposure, Exposure::manual());
        let exposure: Exposure =
            serde_json::from_str(r#"{ "mode": "auto_gamma", "gamma": 2.0 }"#).unwrap();
        assert_eq!(exposure, Exposure::AutoGamma { gamma: 2.0 });
        let exposure: Exposure = serde_json::from_str(r#"{ "mode": "auto_linear" }"#).unwrap();
        assert_eq!(exposure, Exposure::AutoLinear);
    }
}
