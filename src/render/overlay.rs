//! The overlay stack drawn onto each processed frame: telemetry panel,
//! rule-of-thirds grid, crosshair, ROI rectangle, and the REC tag.
//! Later layers paint over earlier ones.

use super::draw::{darken_rect, hline, rect_outline, vline, GREEN, RED};
use super::font::draw_text;
use crate::ndvi::{mean_finite, BgrImage, NdviField, Roi};

/// Everything the overlay pass reads, assembled per frame by the pipeline.
///
/// The wall-clock string is injected rather than read here so frames are
/// reproducible under test.
pub struct OverlayFrame<'a> {
    pub telemetry: bool,
    pub grid: bool,
    pub crosshair: bool,
    pub crosshair_color: [u8; 3],
    pub roi: Roi,
    pub roi_color: [u8; 3],
    pub recording: bool,
    pub fps: f32,
    pub clock: &'a str,
}

/// Draw the overlay stack in place on a colorized frame.
///
/// Size-preserving: only pixel values change. The telemetry mean is the
/// NaN-excluded mean of the NDVI field; Ctr is the raw center value.
pub fn draw_overlay(img: &mut BgrImage, ndvi: &NdviField, ov: &OverlayFrame) {
    let w = img.width as i32;
    let h = img.height as i32;
    if w == 0 || h == 0 {
        return;
    }

    if ov.telemetry {
        darken_rect(img, 5, 5, 280, 180, 0.4);
        let mean = mean_finite(ndvi.values.iter().copied());
        let ctr = ndvi.center_value();
        draw_text(img, ov.clock, 10, 30, 0.6, GREEN, 2);
        draw_text(img, &format!("FPS:{:.1}", ov.fps), 10, 60, 0.6, GREEN, 2);
        draw_text(img, &format!("Mean:{:.2}", mean), 10, 90, 0.6, GREEN, 2);
        draw_text(img, &format!("Ctr:{:.2}", ctr), 10, 120, 0.6, GREEN, 2);
    }

    if ov.grid {
        for i in 1..=2 {
            vline(img, i * w / 3, 0, h - 1, GREEN, 1);
            hline(img, i * h / 3, 0, w - 1, GREEN, 1);
        }
    }

    if ov.crosshair {
        vline(img, w / 2, 0, h - 1, ov.crosshair_color, 2);
        hline(img, h / 2, 0, w - 1, ov.crosshair_color, 2);
    }

    if ov.roi.enabled {
        if let Some(r) = ov.roi.rect(img.width, img.height) {
            rect_outline(
                img,
                r.x0 as i32,
                r.y0 as i32,
                r.x1 as i32,
                r.y1 as i32,
                ov.roi_color,
                2,
            );
        }
    }

    if ov.recording {
        draw_text(img, "REC", w - 80, 30, 1.0, RED, 2);
    }
}
