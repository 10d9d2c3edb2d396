//! Minimal 5x7 bitmap font for text baked into frames (telemetry, REC tag,
//! preview axis labels).
//!
//! Covers exactly the characters those surfaces emit: digits, `:`, `.`,
//! `-`, space, and the letters of `FPS`, `Mean`, `Ctr` and `REC`. Unknown
//! characters advance without drawing. Glyph rows hold 5 pixels in the low
//! bits, MSB leftmost.

use super::draw::fill_rect;
use crate::ndvi::BgrImage;

#[rustfmt::skip]
fn glyph(c: char) -> Option<[u8; 7]> {
    Some(match c {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        _ => return None,
    })
}

/// Integer pixel magnification for a nominal text scale.
///
/// Callers pass continuous scales; the bitmap font snaps them to whole
/// multiples, so 0.4 and 0.6 render at 1x and 1.0 at 2x.
fn magnification(scale: f32) -> i32 {
    ((scale * 2.0).round() as i32).max(1)
}

/// Advance width of one character cell.
fn advance(scale: f32, thickness: i32) -> i32 {
    6 * magnification(scale) + (thickness - 1)
}

/// Total width of a rendered string in pixels.
pub fn text_width(text: &str, scale: f32, thickness: i32) -> i32 {
    text.chars().count() as i32 * advance(scale, thickness)
}

/// Draw `text` with its left baseline at (x, y).
///
/// The baseline is the bottom row of the glyphs, so text sits above `y`.
/// Pixels falling outside the image are clipped. `thickness` > 1 dilates
/// each glyph pixel right and down.
pub fn draw_text(
    img: &mut BgrImage,
    text: &str,
    x: i32,
    y: i32,
    scale: f32,
    bgr: [u8; 3],
    thickness: i32,
) {
    let m = magnification(scale);
    let t = thickness.max(1);
    let mut pen_x = x;

    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..5 {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let px = pen_x + col as i32 * m;
                    let py = y - (6 - row as i32) * m;
                    fill_rect(img, px, py, px + m - 1 + (t - 1), py + m - 1 + (t - 1), bgr);
                }
            }
        }
        pen_x += advance(scale, t);
    }
}
