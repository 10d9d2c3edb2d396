//! Integer digital zoom: center crop plus bilinear upscale back to the
//! source dimensions. The same resampler also serves the display resize.

use super::image::BgrImage;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 4;

/// Apply digital zoom `z` to a frame.
///
/// `z == 1` copies the input through untouched. For larger factors the
/// centered window of `w/z x h/z` pixels (integer division) at origin
/// `(cx - ws/2, cy - hs/2)` is cropped and scaled back up to the full
/// frame size with bilinear interpolation. A window that collapses to
/// zero pixels in either dimension falls back to pass-through.
pub fn zoom_into(src: &BgrImage, z: u8, out: &mut BgrImage) {
    let (w, h) = (src.width, src.height);
    if z <= 1 || w == 0 || h == 0 {
        copy_into(src, out);
        return;
    }

    let ws = w / z as usize;
    let hs = h / z as usize;
    if ws == 0 || hs == 0 {
        copy_into(src, out);
        return;
    }

    let x0 = w / 2 - ws / 2;
    let y0 = h / 2 - hs / 2;
    resample_region_into(src, x0, y0, ws, hs, w, h, out);
}

/// Resize a whole image to new dimensions with bilinear interpolation.
pub fn resize_bilinear_into(src: &BgrImage, dst_w: usize, dst_h: usize, out: &mut BgrImage) {
    if src.width == 0 || src.height == 0 || dst_w == 0 || dst_h == 0 {
        out.reset(0, 0);
        return;
    }
    resample_region_into(src, 0, 0, src.width, src.height, dst_w, dst_h, out);
}

fn copy_into(src: &BgrImage, out: &mut BgrImage) {
    out.reset(src.width, src.height);
    out.data.copy_from_slice(&src.data);
}

/// Bilinear resample of a source sub-rectangle into `dst_w x dst_h`.
///
/// Sample positions follow the half-pixel-center convention
/// `src = (dst + 0.5) * scale - 0.5`, edge-clamped, so an identity resize
/// reproduces the input exactly.
fn resample_region_into(
    src: &BgrImage,
    rx: usize,
    ry: usize,
    rw: usize,
    rh: usize,
    dst_w: usize,
    dst_h: usize,
    out: &mut BgrImage,
) {
    out.reset(dst_w, dst_h);

    let sx = rw as f32 / dst_w as f32;
    let sy = rh as f32 / dst_h as f32;

    for dy in 0..dst_h {
        let fy = (dy as f32 + 0.5) * sy - 0.5;
        let fy = fy.max(0.0);
        let y0 = (fy as usize).min(rh - 1);
        let y1 = (y0 + 1).min(rh - 1);
        let v = fy - y0 as f32;

        for dx in 0..dst_w {
            let fx = (dx as f32 + 0.5) * sx - 0.5;
            let fx = fx.max(0.0);
            let x0 = (fx as usize).min(rw - 1);
            let x1 = (x0 + 1).min(rw - 1);
            let u = fx - x0 as f32;

            let p00 = src.pixel(rx + x0, ry + y0);
            let p10 = src.pixel(rx + x1, ry + y0);
            let p01 = src.pixel(rx + x0, ry + y1);
            let p11 = src.pixel(rx + x1, ry + y1);

            let i = out.offset(dx, dy);
            for ch in 0..3 {
                let top = p00[ch] as f32 + u * (p10[ch] as f32 - p00[ch] as f32);
                let bot = p01[ch] as f32 + u * (p11[ch] as f32 - p01[ch] as f32);
                out.data[i + ch] = (top + v * (bot - top) + 0.5) as u8;
            }
        }
    }
}
