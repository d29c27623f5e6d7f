//! Image serialization.
//!
//! The framebuffer keeps row 0 at the bottom; both writers emit the top row
//! first.

use crate::error::RenderResult;
use crate::renderer::ImageBuffer;
use std::io::Write;
use std::path::Path;

/// Quantize one gamma-encoded channel to a byte value.
///
/// Channels are in [0, 1] by construction, so no clamping happens here.
#[inline]
pub fn quantize(channel: f32) -> i32 {
    (255.99 * channel) as i32
}

/// Write `image` as plain-text PPM (`P3`): a header, then one `R G B` line
/// per pixel, left to right, top row first.
pub fn write_ppm<W: Write>(image: &ImageBuffer, out: &mut W) -> RenderResult<()> {
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", image.width, image.height)?;
    writeln!(out, "255")?;

    for y in (0..image.height).rev() {
        for x in 0..image.width {
            let color = image.get(x, y);
            writeln!(
                out,
                "{} {} {}",
                quantize(color.x),
                quantize(color.y),
                quantize(color.z)
            )?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Save `frame` as an 8-bit PNG, top row first.
pub fn save_png(frame: &ImageBuffer, path: impl AsRef<Path>) -> RenderResult<()> {
    let rgb = image::RgbImage::from_fn(frame.width, frame.height, |x, row| {
        let color = frame.get(x, frame.height - 1 - row);
        image::Rgb([
            quantize(color.x).clamp(0, 255) as u8,
            quantize(color.y).clamp(0, 255) as u8,
            quantize(color.z).clamp(0, 255) as u8,
        ])
    });
    rgb.save(path.as_ref())?;
    log::info!("Saved PNG to {}", path.as_ref().display());
    Ok(())
}
