//! Region of interest: four percent values and an enable flag, shared by
//! the overlay renderer and the auto-calibrator.

use super::kernel::NdviField;

/// ROI state in slider units (percent of frame dimensions, 0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub enabled: bool,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for Roi {
    fn default() -> Self {
        Self {
            enabled: false,
            left: 0,
            right: 100,
            top: 0,
            bottom: 100,
        }
    }
}

impl Roi {
    /// Resolve the percent sliders against a frame size.
    ///
    /// Corners are `floor(pct/100 * dim)`. Returns `None` for a degenerate
    /// rectangle (`right <= left` or `bottom <= top` after scaling), which
    /// callers treat as "skip the draw" or "fall back to the full frame".
    pub fn rect(&self, width: usize, height: usize) -> Option<RoiRect> {
        let x0 = (self.left as f32 / 100.0 * width as f32) as usize;
        let x1 = (self.right as f32 / 100.0 * width as f32) as usize;
        let y0 = (self.top as f32 / 100.0 * height as f32) as usize;
        let y1 = (self.bottom as f32 / 100.0 * height as f32) as usize;
        if x1 > x0 && y1 > y0 {
            Some(RoiRect { x0, y0, x1, y1 })
        } else {
            None
        }
    }
}

/// A resolved ROI in pixels.
///
/// `x1`/`y1` are exclusive bounds for sampling; drawing uses them as the
/// far corner (clipped at the image edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl RoiRect {
    /// Iterate the NDVI values inside the rectangle, row by row.
    pub fn sample<'a>(&self, field: &'a NdviField) -> impl Iterator<Item = f32> + 'a {
        let x0 = self.x0.min(field.width);
        let x1 = self.x1.min(field.width);
        let y0 = self.y0.min(field.height);
        let y1 = self.y1.min(field.height);
        let w = field.width;
        (y0..y1).flat_map(move |y| {
            let row = &field.values[y * w + x0..y * w + x1];
            row.iter().copied()
        })
    }
}
