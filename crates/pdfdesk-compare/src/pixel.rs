//! Pixel-level comparison of rasterized pages.

use image::{Rgba, RgbaImage};

use crate::error::CompareError;

/// Result of diffing one aligned page pair.
#[derive(Debug, Clone)]
pub struct PixelDiff {
    pub width: u32,
    pub height: u32,
    pub changed_pixels: u64,
    /// Highlight-colored where the pair differs, transparent elsewhere.
    pub bitmap: RgbaImage,
}

/// Channel-wise diff of two equal-sized bitmaps. A pixel is marked when any
/// RGB channel differs by more than `tolerance`.
pub fn diff_images(
    left: &RgbaImage,
    right: &RgbaImage,
    tolerance: u8,
    highlight: [u8; 4],
) -> Result<PixelDiff, CompareError> {
    if left.dimensions() != right.dimensions() {
        let (left_w, left_h) = left.dimensions();
        let (right_w, right_h) = right.dimensions();
        return Err(CompareError::SizeMismatch {
            left_w,
            left_h,
            right_w,
            right_h,
        });
    }

    let (width, height) = left.dimensions();
    let mut bitmap = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut changed_pixels = 0u64;

    for (x, y, l) in left.enumerate_pixels() {
        let r = right.get_pixel(x, y);
        let differs = l.0[..3]
            .iter()
            .zip(&r.0[..3])
            .any(|(&a, &b)| a.abs_diff(b) > tolerance);
        if differs {
            bitmap.put_pixel(x, y, Rgba(highlight));
            changed_pixels += 1;
        }
    }

    Ok(PixelDiff {
        width,
        height,
        changed_pixels,
        bitmap,
    })
}

/// Flatten a faded base page under the full-opacity diff bitmap, over a
/// white background, producing the page image for the visual report.
pub fn composite(base: &RgbaImage, diff: &RgbaImage, base_opacity: f32) -> RgbaImage {
    let (width, height) = base.dimensions();
    let mut out = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let b = base.get_pixel(x, y);
        let base_a = (b.0[3] as f32 / 255.0) * base_opacity;
        let mut rgb = [0f32; 3];
        for c in 0..3 {
            rgb[c] = b.0[c] as f32 * base_a + 255.0 * (1.0 - base_a);
        }

        if x < diff.width() && y < diff.height() {
            let d = diff.get_pixel(x, y);
            let diff_a = d.0[3] as f32 / 255.0;
            for c in 0..3 {
                rgb[c] = d.0[c] as f32 * diff_a + rgb[c] * (1.0 - diff_a);
            }
        }

        *pixel = Rgba([rgb[0] as u8, rgb[1] as u8, rgb[2] as u8, 255]);
    }
    out
}

/// Strip alpha for embedding as a DeviceRGB image stream.
pub fn to_rgb_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.len() / 4 * 3);
    for pixel in image.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
    }
    rgb
}
