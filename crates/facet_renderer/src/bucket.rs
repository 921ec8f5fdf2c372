//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! by the worker pool. Buckets never overlap, so each pixel is written by
//! exactly one worker.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use facet_math::Vec3;

use crate::scene::Scene;
use crate::transport::trace;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Row-major pixel ids covered by this bucket in an image `image_width` wide.
    pub fn pixel_indices(&self, image_width: u32) -> impl Iterator<Item = usize> + '_ {
        (self.y..self.y + self.height).flat_map(move |row| {
            let start = (row * image_width + self.x) as usize;
            start..start + self.width as usize
        })
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 16;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Edge buckets shrink to fit, so the buckets partition the image for any
/// size. A zero `bucket_size` is treated as 1.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let x = b.x as f32 + b.width as f32 / 2.0;
        let y = b.y as f32 + b.height as f32 / 2.0;
        (x - center_x).powi(2) + (y - center_y).powi(2)
    };

    // Stable sort keeps scanline order between equidistant buckets
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Work queue shared by the render workers.
///
/// The lock is held only while a bucket is popped.
#[derive(Debug, Default)]
pub struct TileQueue {
    buckets: Mutex<VecDeque<Bucket>>,
}

impl TileQueue {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self {
            buckets: Mutex::new(buckets.into()),
        }
    }

    /// Take the next bucket, or `None` once the queue is drained.
    pub fn pop(&self) -> Option<Bucket> {
        let mut queue = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let bucket = queue.pop_front()?;
        log::debug!("Bucket {} claimed, {} remaining", bucket.index, queue.len());
        Some(bucket)
    }

    pub fn len(&self) -> usize {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render a single bucket of a `width x height` image.
///
/// Returns radiance in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    scene: &Scene,
    width: u32,
    height: u32,
    max_depth: u32,
) -> Vec<Vec3> {
    bucket
        .pixel_indices(width)
        .map(|id| {
            let ray = scene.camera.primary_ray(width, height, id);
            trace(&ray, scene, max_depth)
        })
        .collect()
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel radiance in row-major order
    pub pixels: Vec<Vec3>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Vec3>) -> Self {
        Self { bucket, pixels }
    }
}
