//! Half-block image rendering for the video panes.
//!
//! Each character cell carries two vertically stacked pixels: the upper
//! half block glyph takes the top pixel as foreground color and the
//! bottom pixel as background color. Terminal cells are roughly twice as
//! tall as they are wide, so the two stacked pixels come out square and
//! the image keeps its aspect ratio.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::ndvi::{resize_bilinear_into, BgrImage};

/// Glyph whose foreground paints the top half of a cell.
const UPPER_HALF_BLOCK: &str = "\u{2580}";

/// Render an image into at most `cols` x `rows` character cells.
///
/// The image is scaled to fit while preserving aspect ratio, so the
/// returned lines may cover fewer cells than the pane offers. Returns
/// one [`Line`] per cell row, empty when the image or the pane has no
/// area.
pub fn image_lines(img: &BgrImage, cols: u16, rows: u16) -> Vec<Line<'static>> {
    if img.width == 0 || img.height == 0 || cols == 0 || rows == 0 {
        return Vec::new();
    }

    let (dst_w, dst_h) = fit_dimensions(img.width, img.height, cols, rows);

    let mut scaled = BgrImage::new(0, 0);
    resize_bilinear_into(img, dst_w, dst_h, &mut scaled);

    let mut lines = Vec::with_capacity(dst_h / 2);
    for row in 0..dst_h / 2 {
        let mut spans = Vec::with_capacity(dst_w);
        for col in 0..dst_w {
            let top = scaled.pixel(col, row * 2);
            let bottom = scaled.pixel(col, row * 2 + 1);
            let style = Style::default()
                .fg(Color::Rgb(top[2], top[1], top[0]))
                .bg(Color::Rgb(bottom[2], bottom[1], bottom[0]));
            spans.push(Span::styled(UPPER_HALF_BLOCK, style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// Scale (width, height) pixels into a `cols` x `rows` cell pane.
///
/// The pixel grid is `cols` wide and `2 * rows` tall. The result keeps
/// the source aspect ratio, never exceeds the grid, and has an even
/// height so every cell row is fully covered.
fn fit_dimensions(width: usize, height: usize, cols: u16, rows: u16) -> (usize, usize) {
    let grid_w = cols as usize;
    let grid_h = rows as usize * 2;

    let scale = f32::min(
        grid_w as f32 / width as f32,
        grid_h as f32 / height as f32,
    );
    let dst_w = ((width as f32 * scale) as usize).clamp(1, grid_w);
    let mut dst_h = ((height as f32 * scale) as usize).clamp(2, grid_h);
    dst_h &= !1;
    (dst_w, dst_h)
}
