//! NDVI processing module: the per-frame path from a raw BGR frame to a
//! false-color image, plus the statistics that drive calibration and the
//! preview panels.
//!
//! The pipeline stages, in frame order:
//!
//! 1. **Zoom** - optional centered digital zoom
//! 2. **Kernel** - NDVI computation, range normalization, LUT colorize
//! 3. **Stats** - NaN-aware mean, percentiles, histogram counts
//!
//! Palettes and their lookup tables live in [`palette`]; the shared
//! [`BgrImage`] container in [`image`].

mod image;
mod kernel;
mod palette;
mod roi;
mod stats;
mod zoom;

pub use image::BgrImage;
pub use kernel::{
    colorize, colorize_into, compute_ndvi, compute_ndvi_into, lut_index, NdviField, EPSILON,
};
pub use palette::{Lut, Palette, ALL_PALETTES};
pub use roi::{Roi, RoiRect};
pub use stats::{histogram_bins, mean_finite, percentile_bounds};
pub use zoom::{resize_bilinear_into, zoom_into, MAX_ZOOM, MIN_ZOOM};
