//! The NDVI arithmetic kernel: index computation, range normalization,
//! and palette application.

use super::image::BgrImage;
use super::palette::Lut;

/// Denominator guard for the vegetation index; keeps the division finite
/// for any 8-bit input, including R = B = 0.
pub const EPSILON: f32 = 1e-9;

/// A per-pixel NDVI plane with the dimensions of its source frame.
///
/// Values are nominally in [-1, 1]; the epsilon denominator means real
/// camera frames never produce NaN, but the field tolerates non-finite
/// entries so downstream consumers stay NaN-aware.
#[derive(Debug, Clone, Default)]
pub struct NdviField {
    /// Row-major f32 values, `width * height` entries
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl NdviField {
    /// True before the first frame has been processed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at (x, y); NaN-preserving, 0.0 out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.values[y * self.width + x]
    }

    /// The value at the image center (w/2, h/2), unfiltered.
    pub fn center_value(&self) -> f32 {
        self.get(self.width / 2, self.height / 2)
    }
}

/// Compute NDVI = (R - B) / (R + B + epsilon) for every pixel.
///
/// Green is ignored. Channels are promoted to f32 before the arithmetic so
/// the subtraction cannot wrap. Output dimensions always equal input
/// dimensions; a 0x0 frame produces an empty field.
pub fn compute_ndvi(frame: &BgrImage) -> NdviField {
    let mut field = NdviField::default();
    compute_ndvi_into(frame, &mut field);
    field
}

/// Compute NDVI into an existing field, reusing its allocation.
pub fn compute_ndvi_into(frame: &BgrImage, field: &mut NdviField) {
    field.width = frame.width;
    field.height = frame.height;
    field.values.clear();
    field.values.reserve(frame.pixel_count());

    for px in frame.data.chunks_exact(3) {
        let b = px[0] as f32;
        let r = px[2] as f32;
        field.values.push((r - b) / (r + b + EPSILON));
    }
}

/// Normalize one NDVI value into a LUT index.
///
/// `t = (v - vmin) / (vmax - vmin)` clamped to [0, 1], then scaled to an
/// 8-bit index by `round(t * 255)`. NaN normalizes to 0 (no signal); the
/// clamp is explicit because `f32::clamp` propagates NaN.
#[inline]
pub fn lut_index(v: f32, vmin: f32, vmax: f32) -> u8 {
    if vmax <= vmin {
        return 0;
    }
    let t = (v - vmin) / (vmax - vmin);
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    (t * 255.0).round() as u8
}

/// Colorize an NDVI field through a palette LUT.
pub fn colorize(field: &NdviField, vmin: f32, vmax: f32, lut: &Lut) -> BgrImage {
    let mut out = BgrImage::new(0, 0);
    colorize_into(field, vmin, vmax, lut, &mut out);
    out
}

/// Colorize into an existing image, reusing its allocation.
///
/// An inverted or empty range (`vmax <= vmin`) is not an error: every
/// pixel maps to index 0, i.e. the palette's low anchor.
pub fn colorize_into(field: &NdviField, vmin: f32, vmax: f32, lut: &Lut, out: &mut BgrImage) {
    out.reset(field.width, field.height);

    for (v, px) in field.values.iter().zip(out.data.chunks_exact_mut(3)) {
        let i = lut_index(*v, vmin, vmax) as usize;
        px[0] = lut.b[i];
        px[1] = lut.g[i];
        px[2] = lut.r[i];
    }
}
