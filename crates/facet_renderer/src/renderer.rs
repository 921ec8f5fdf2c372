//! Tile-parallel renderer.
//!
//! A fixed pool of workers drains a shared bucket queue. Each finished bucket
//! goes back to the calling thread over a channel and is copied into the
//! framebuffer there, so pixel storage is never shared between threads.
//! Exposure runs once everything is in.

use std::sync::mpsc;
use std::time::Instant;

use facet_math::Vec3;
use serde::Deserialize;
use thiserror::Error;

use crate::bucket::{
    generate_buckets, render_bucket, BucketResult, TileQueue, DEFAULT_BUCKET_SIZE,
};
use crate::scene::Scene;

/// Errors that can occur while rendering or writing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of a square bucket in pixels
    pub tile_size: u32,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum number of reflections and refractions per camera ray
    pub max_depth: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_BUCKET_SIZE,
            workers: 15,
            max_depth: 32,
        }
    }
}

impl RenderConfig {
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Row-major radiance buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        })
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn blit(&mut self, result: &BucketResult) {
        let ids = result.bucket.pixel_indices(self.width);
        for (id, color) in ids.zip(&result.pixels) {
            self.pixels[id] = *color;
        }
    }
}

/// Render `scene` into `framebuffer`, then apply the camera's exposure.
pub fn render(
    scene: &Scene,
    framebuffer: &mut Framebuffer,
    config: &RenderConfig,
) -> RenderResult<()> {
    let (width, height) = (framebuffer.width, framebuffer.height);
    let workers = config.workers.max(1);
    let buckets = generate_buckets(width, height, config.tile_size);
    let bucket_count = buckets.len();

    log::info!(
        "Rendering {}x{} ({} faces, {} lights) in {} buckets on {} workers",
        width,
        height,
        scene.face_count(),
        scene.lights.len(),
        bucket_count,
        workers
    );

    let start = Instant::now();
    let queue = TileQueue::new(buckets);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
    let (tx, rx) = mpsc::channel::<BucketResult>();

    pool.in_place_scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            s.spawn(move |_| {
                while let Some(bucket) = queue.pop() {
                    let pixels = render_bucket(&bucket, scene, width, height, config.max_depth);
                    if tx.send(BucketResult::new(bucket, pixels)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        for result in rx.iter() {
            framebuffer.blit(&result);
        }
    });

    log::info!(
        "Rendered {} buckets in {:.2}s",
        bucket_count,
        start.elapsed().as_secs_f32()
    );

    scene.camera.expose(&mut framebuffer.pixels);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucket;

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.tile_size, 16);
        assert_eq!(config.workers, 15);
        assert_eq!(config.max_depth, 32);

        let config: RenderConfig = serde_json::from_str(r#"{ "workers": 2 }"#).unwrap();
        assert_eq!(config, RenderConfig::default().with_workers(2));
    }

    #[test]
    fn test_framebuffer_rejects_empty() {
        assert!(matches!(
            Framebuffer::new(0, 4),
            Err(RenderError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_blit_places_bucket() {
        let mut fb = Framebuffer::new(4, 3).unwrap();
        let bucket = Bucket::new(1, 1, 2, 2, 0);
        let pixels = (0..4).map(|i| Vec3::splat(i as f32 + 1.0)).collect();
        fb.blit(&BucketResult::new(bucket, pixels));

        assert_eq!(fb.get(1, 1), Vec3::splat(1.0));
        assert_eq!(fb.get(2, 1), Vec3::splat(2.0));
        assert_eq!(fb.get(1, 2), Vec3::splat(3.0));
        assert_eq!(fb.get(2, 2), Vec3::splat(4.0));
        assert_eq!(fb.get(0, 0), Vec3::ZERO);
        assert_eq!(fb.get(3, 2), Vec3::ZERO);
    }

    #[test]
    fn test_render_empty_scene() {
        let scene = Scene::default();
        let mut fb = Framebuffer::new(20, 10).unwrap();
        render(&scene, &mut fb, &RenderConfig::default().with_workers(3)).unwrap();
        assert!(fb.pixels.iter().all(|p| *p == Vec3::ZERO));
    }
}
