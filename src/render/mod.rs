//! Frame-space rendering: raster draw primitives, the bitmap font, the
//! per-frame overlay stack, and the colorbar/histogram preview panels.
//! Everything here draws into [`BgrImage`](crate::ndvi::BgrImage) buffers;
//! terminal presentation lives in [`crate::terminal`].

pub mod draw;
pub mod font;
mod overlay;
mod preview;

pub use overlay::{draw_overlay, OverlayFrame};
pub use preview::{
    render_colorbar, render_colorbar_into, render_histogram, render_histogram_into, COLORBAR_H,
    COLORBAR_W, HIST_BINS, HIST_H, HIST_W,
};
