//! Preview panels: the vertical palette colorbar and the 50-bin NDVI
//! histogram, rebuilt on the preview tick.

use super::draw::{fill_rect, hline, BAR_GREEN, GREEN, WHITE};
use super::font::draw_text;
use crate::ndvi::{histogram_bins, BgrImage, Lut, NdviField};

pub const COLORBAR_W: usize = 40;
pub const COLORBAR_H: usize = 200;
pub const HIST_W: usize = 200;
pub const HIST_H: usize = 200;
pub const HIST_BINS: usize = 50;

/// Render the palette ramp with the current range labels.
pub fn render_colorbar(lut: &Lut, vmin: f32, vmax: f32) -> BgrImage {
    let mut out = BgrImage::new(0, 0);
    render_colorbar_into(lut, vmin, vmax, &mut out);
    out
}

/// Render the colorbar into an existing buffer.
///
/// Row i maps to t = 1 - i/(h-1), LUT index floor(t * 255): the high end
/// of the range sits at the top. The LUT is BGR so rows copy entries
/// directly.
pub fn render_colorbar_into(lut: &Lut, vmin: f32, vmax: f32, out: &mut BgrImage) {
    out.reset(COLORBAR_W, COLORBAR_H);
    for i in 0..COLORBAR_H {
        let t = 1.0 - i as f32 / (COLORBAR_H - 1) as f32;
        let idx = (t * 255.0) as u8;
        let c = lut.bgr(idx);
        for x in 0..COLORBAR_W {
            out.put_pixel(x, i, c);
        }
    }
    draw_text(out, &format!("{:.2}", vmax), 2, 5, 0.4, WHITE, 1);
    draw_text(
        out,
        &format!("{:.2}", vmin),
        2,
        COLORBAR_H as i32 - 5,
        0.4,
        WHITE,
        1,
    );
}

/// Render the histogram panel.
///
/// Returns `None` when the field has no finite values; the caller keeps
/// the previous panel in that case.
pub fn render_histogram(field: &NdviField, vmin: f32, vmax: f32) -> Option<BgrImage> {
    let mut out = BgrImage::new(0, 0);
    if render_histogram_into(field, vmin, vmax, &mut out) {
        Some(out)
    } else {
        None
    }
}

/// Render the histogram into an existing buffer.
///
/// Bars are filled in the dimmer bar green, scaled so the tallest bin
/// spans the full plot height above the baseline; the bright green
/// baseline sits at y = h - 20 with the three axis labels below it.
/// Returns false (buffer untouched) when no finite values exist.
pub fn render_histogram_into(field: &NdviField, vmin: f32, vmax: f32, out: &mut BgrImage) -> bool {
    let counts = histogram_bins(field.values.iter().copied(), vmin, vmax, HIST_BINS);
    let total: u32 = counts.iter().sum();
    if total == 0 {
        return false;
    }

    out.reset(HIST_W, HIST_H);
    out.data.fill(0);

    let base = (HIST_H - 20) as i32;
    let mx = counts.iter().copied().max().unwrap_or(1).max(1);
    let bw = (HIST_W / HIST_BINS) as i32;
    for (i, &c) in counts.iter().enumerate() {
        let hgt = (c as f32 / mx as f32 * base as f32) as i32;
        let x = i as i32 * bw;
        fill_rect(out, x, base, x + bw - 1, base - hgt, BAR_GREEN);
    }
    hline(out, base, 0, HIST_W as i32 - 1, GREEN, 1);

    for j in 0..3 {
        let e = vmin + j as f32 * (vmax - vmin) / 2.0;
        let x = (j as f32 * (HIST_W - 1) as f32 / 2.0) as i32;
        draw_text(
            out,
            &format!("{:.2}", e),
            x,
            HIST_H as i32 - 5,
            0.4,
            WHITE,
            1,
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndvi::Palette;

    #[test]
    fn test_colorbar_dimensions() {
        let lut = Palette::NdviClassic.lut();
        let cb = render_colorbar(&lut, -1.0, 1.0);
        assert_eq!(cb.width, COLORBAR_W);
        assert_eq!(cb.height, COLORBAR_H);
    }

    #[test]
    fn test_colorbar_ends_match_lut() {
        let lut = Palette::NdviClassic.lut();
        let cb = render_colorbar(&lut, -1.0, 1.0);
        // away from the labels at the left edge
        assert_eq!(cb.pixel(30, 0), lut.bgr(255));
        assert_eq!(cb.pixel(30, COLORBAR_H - 1), lut.bgr(0));
    }

    #[test]
    fn test_colorbar_midpoint_index() {
        // row 99: t = 100/199, floor(t * 255) = 128
        let lut = Palette::Thermal.lut();
        let cb = render_colorbar(&lut, 0.0, 1.0);
        assert_eq!(cb.pixel(30, 99), lut.bgr(128));
    }

    #[test]
    fn test_colorbar_has_labels() {
        let lut = Palette::Grayscale.lut();
        let cb = render_colorbar(&lut, -0.25, 0.6);
        let white = cb
            .data
            .chunks_exact(3)
            .filter(|px| px == &[255, 255, 255])
            .count();
        assert!(white > 0, "range labels should render in white");
    }

    fn field_of(values: Vec<f32>, w: usize, h: usize) -> NdviField {
        NdviField {
            values,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_histogram_tallest_bin_fills_plot() {
        // all mass in one value: its bin spans the full height above baseline
        let field = field_of(vec![0.5; 64], 8, 8);
        let hi = render_histogram(&field, 0.0, 1.0).unwrap();
        assert_eq!(hi.width, HIST_W);
        assert_eq!(hi.height, HIST_H);
        // bin 25 covers x 100..=103; top row of the bar reaches y = 0
        assert_eq!(hi.pixel(100, 0), BAR_GREEN);
        assert_eq!(hi.pixel(100, 150), BAR_GREEN);
        // neighboring bins stay black above the baseline
        assert_eq!(hi.pixel(50, 100), [0, 0, 0]);
    }

    #[test]
    fn test_histogram_baseline_bright_green() {
        let field = field_of(vec![0.1; 16], 4, 4);
        let hi = render_histogram(&field, 0.0, 1.0).unwrap();
        assert_eq!(hi.pixel(150, HIST_H - 20), GREEN);
    }

    #[test]
    fn test_histogram_all_nan_skipped() {
        let field = field_of(vec![f32::NAN; 16], 4, 4);
        assert!(render_histogram(&field, -1.0, 1.0).is_none());

        let mut out = BgrImage::filled(2, 2, [7, 7, 7]);
        assert!(!render_histogram_into(&field, -1.0, 1.0, &mut out));
        assert_eq!(out.pixel(0, 0), [7, 7, 7]);
    }

    #[test]
    fn test_histogram_half_split_spikes() {
        // half the values at each extreme: spikes land in the end bins
        let mut values = vec![-1.0f32; 32];
        values.extend(std::iter::repeat(1.0).take(32));
        let field = field_of(values, 8, 8);
        let hi = render_histogram(&field, -1.0, 1.0).unwrap();
        // bin 0 covers x 0..=3, bin 49 covers x 196..=199
        assert_eq!(hi.pixel(1, 10), BAR_GREEN);
        assert_eq!(hi.pixel(197, 10), BAR_GREEN);
        // middle bins empty above baseline
        assert_eq!(hi.pixel(100, 10), [0, 0, 0]);
    }
}
