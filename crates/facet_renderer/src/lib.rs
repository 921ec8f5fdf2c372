//! facet renderer - tile-parallel Whitted-style ray tracing
//!
//! Camera rays are traced through a read-only [`Scene`] of indexed meshes.
//! Each hit gathers direct light from point lights and splits the rest of
//! its energy between reflection and refraction. Work is handed out in
//! buckets to a fixed pool of workers, and the finished image is exposed
//! in one pass before it is written out.

mod bucket;
mod camera;
mod output;
mod ray;
mod renderer;
mod scene;
mod transport;

pub use bucket::{
    generate_buckets, render_bucket, Bucket, BucketResult, TileQueue, DEFAULT_BUCKET_SIZE,
};
pub use camera::{Camera, Exposure};
pub use output::{channel_to_byte, color_to_rgb};
pub use ray::LightRay;
pub use renderer::{render, Framebuffer, RenderConfig, RenderError, RenderResult};
pub use scene::Scene;
pub use transport::{direct_illumination, fresnel, reflect, refract, trace, ATTENUATION};

/// Re-export Vec3 from facet_math
pub use facet_math::Vec3;
