//! Image sinks for an exposed framebuffer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use facet_math::Vec3;

use crate::renderer::{Framebuffer, RenderResult};

/// Map a `[0, 1]` channel to a byte.
#[inline]
pub fn channel_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb(color: Vec3) -> [u8; 3] {
    [
        channel_to_byte(color.x),
        channel_to_byte(color.y),
        channel_to_byte(color.z),
    ]
}

impl Framebuffer {
    /// Row-major RGB bytes, three per pixel.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| color_to_rgb(*p)).collect()
    }

    /// Write a binary PPM (`P6`) image.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> RenderResult<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        writer.write_all(&self.to_rgb())?;
        writer.flush()?;
        Ok(())
    }

    /// Save to `path`: PNG for a `.png` extension, PPM otherwise.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let path = path.as_ref();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

        if is_png {
            image::save_buffer(
                path,
                &self.to_rgb(),
                self.width,
                self.height,
                image::ColorType::Rgb8,
            )?;
        } else {
            self.write_ppm(BufWriter::new(File::create(path)?))?;
        }

        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
