//! `facet <scene.json> [output]`: render a scene description to an image.

mod config;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use facet_renderer::{render, Framebuffer};

use crate::config::SceneFile;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(scene_path) = args.next().map(PathBuf::from) else {
        bail!("Usage: facet <scene.json> [output]");
    };
    let output_override = args.next().map(PathBuf::from);

    let start = Instant::now();
    let file = SceneFile::load(&scene_path)?;
    let base_dir = scene_path.parent().unwrap_or(Path::new("."));
    let scene = file.build_scene(base_dir)?;
    log::info!(
        "Loaded {} meshes ({} faces) in {:.2}s",
        scene.meshes.len(),
        scene.face_count(),
        start.elapsed().as_secs_f32()
    );

    let mut framebuffer = Framebuffer::new(file.image.width, file.image.height)?;
    render(&scene, &mut framebuffer, &file.render).context("Render failed")?;

    let output = output_override.unwrap_or_else(|| file.image.output.clone());
    framebuffer
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}
