//! Raster drawing primitives over [`BgrImage`]: rectangles, axis-aligned
//! lines, darkening and alpha blending. All coordinates are inclusive and
//! clipped to the image, so callers never bounds-check.

use crate::ndvi::BgrImage;

/// Bright green, the console's signature overlay color (BGR).
pub const GREEN: [u8; 3] = [0, 255, 0];
/// The dimmer green used for histogram bars (BGR).
pub const BAR_GREEN: [u8; 3] = [0, 200, 0];
/// Red in BGR order.
pub const RED: [u8; 3] = [0, 0, 255];
/// White.
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Fill the rectangle with corners (x0, y0) and (x1, y1), both inclusive.
pub fn fill_rect(img: &mut BgrImage, x0: i32, y0: i32, x1: i32, y1: i32, bgr: [u8; 3]) {
    let (lo_x, hi_x) = (x0.min(x1), x0.max(x1));
    let (lo_y, hi_y) = (y0.min(y1), y0.max(y1));
    for y in lo_y.max(0)..=hi_y.min(img.height as i32 - 1) {
        for x in lo_x.max(0)..=hi_x.min(img.width as i32 - 1) {
            img.put_pixel(x as usize, y as usize, bgr);
        }
    }
}

/// Outline the rectangle with corners (x0, y0) and (x1, y1).
///
/// Thickness grows inward from the boundary, one concentric ring per unit.
pub fn rect_outline(
    img: &mut BgrImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    bgr: [u8; 3],
    thickness: i32,
) {
    for k in 0..thickness {
        let (ax, ay) = (x0 + k, y0 + k);
        let (bx, by) = (x1 - k, y1 - k);
        if bx < ax || by < ay {
            break;
        }
        fill_rect(img, ax, ay, bx, ay, bgr);
        fill_rect(img, ax, by, bx, by, bgr);
        fill_rect(img, ax, ay, ax, by, bgr);
        fill_rect(img, bx, ay, bx, by, bgr);
    }
}

/// Horizontal line at row `y` spanning columns x0..=x1.
///
/// Thickness extends downward from `y`.
pub fn hline(img: &mut BgrImage, y: i32, x0: i32, x1: i32, bgr: [u8; 3], thickness: i32) {
    fill_rect(img, x0, y, x1, y + thickness - 1, bgr);
}

/// Vertical line at column `x` spanning rows y0..=y1.
///
/// Thickness extends rightward from `x`.
pub fn vline(img: &mut BgrImage, x: i32, y0: i32, y1: i32, bgr: [u8; 3], thickness: i32) {
    fill_rect(img, x, y0, x + thickness - 1, y1, bgr);
}

/// Scale every channel inside the rectangle by `factor`.
///
/// `factor` 0.4 is the telemetry shade: equivalent to compositing a 60%
/// opaque black panel over the region.
pub fn darken_rect(img: &mut BgrImage, x0: i32, y0: i32, x1: i32, y1: i32, factor: f32) {
    let (lo_x, hi_x) = (x0.min(x1).max(0), x0.max(x1).min(img.width as i32 - 1));
    let (lo_y, hi_y) = (y0.min(y1).max(0), y0.max(y1).min(img.height as i32 - 1));
    for y in lo_y..=hi_y {
        for x in lo_x..=hi_x {
            let i = img.offset(x as usize, y as usize);
            for ch in 0..3 {
                img.data[i + ch] = (img.data[i + ch] as f32 * factor + 0.5) as u8;
            }
        }
    }
}

/// In-place weighted blend: `dst = alpha * dst + (1 - alpha) * other`.
///
/// Images must have equal dimensions; mismatches leave `dst` untouched.
pub fn blend_in_place(dst: &mut BgrImage, other: &BgrImage, alpha: f32) {
    if dst.width != other.width || dst.height != other.height {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    for (d, s) in dst.data.iter_mut().zip(other.data.iter()) {
        *d = (a * *d as f32 + (1.0 - a) * *s as f32 + 0.5) as u8;
    }
}
