//! Signature image background removal
//!
//! Scanned signatures arrive as opaque rasters on white or off-white paper.
//! Near-white pixels are keyed out so the template artwork shows through.

use crate::config::Color;
use crate::types::Result;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Decode `bytes` and make every near-white pixel fully transparent.
///
/// Multi-frame inputs (animated GIF) contribute their first frame only.
/// Inputs without an alpha channel are treated as fully opaque.
pub fn make_background_transparent(bytes: &[u8], bg_threshold: u8) -> Result<RgbaImage> {
    let mut image = image::load_from_memory(bytes)?.to_rgba8();
    apply_background_threshold(&mut image, bg_threshold);
    Ok(image)
}

/// Set alpha to 0 where every RGB channel is `>= bg_threshold`.
///
/// This is a per-pixel key, not a flood fill: light specks inside strokes
/// turn transparent too.
pub fn apply_background_threshold(image: &mut RgbaImage, bg_threshold: u8) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r >= bg_threshold && g >= bg_threshold && b >= bg_threshold {
            pixel.0[3] = 0;
        }
    }
}

/// Replace the RGB of visible dark pixels with `target`, keeping alpha.
///
/// A pixel is ink when alpha > 0 and every channel is `< recolor_threshold`.
pub fn recolor_ink(image: &mut RgbaImage, target: Color, recolor_threshold: u8) {
    let [tr, tg, tb] = target.to_rgb8();
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a > 0 && r < recolor_threshold && g < recolor_threshold && b < recolor_threshold {
            pixel.0 = [tr, tg, tb, a];
        }
    }
}

/// Encode as PNG, keeping the alpha channel.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
