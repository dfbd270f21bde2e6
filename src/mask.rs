//! Mask normalization. The predictor treats the mask as a strict selection,
//! so anything nonzero (anti-aliased edges included) means "inpaint this
//! pixel".

use image::{DynamicImage, GrayImage, RgbaImage};

/// Collapse an arbitrary decoded mask into single-channel binary form:
/// every pixel becomes exactly 0 or 255. Idempotent.
pub fn normalize(mask: &RgbaImage) -> GrayImage {
    let mut gray = DynamicImage::ImageRgba8(mask.clone()).to_luma8();
    for px in gray.pixels_mut() {
        px.0[0] = if px.0[0] > 0 { 255 } else { 0 };
    }
    gray
}
