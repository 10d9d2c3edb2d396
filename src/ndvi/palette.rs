//! Palette definitions and color lookup-table construction.

use std::fmt;

/// The four operator-selectable false-color palettes.
///
/// Each palette is a piecewise-linear ramp through three RGB anchor
/// colors: low end, midpoint, high end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    NdviClassic,
    Infrared,
    Thermal,
    Grayscale,
}

/// All palettes in cycle order.
pub const ALL_PALETTES: [Palette; 4] = [
    Palette::NdviClassic,
    Palette::Infrared,
    Palette::Thermal,
    Palette::Grayscale,
];

impl Palette {
    /// Display name, also the value persisted in settings.
    pub fn name(&self) -> &'static str {
        match self {
            Palette::NdviClassic => "NDVI Classic",
            Palette::Infrared => "Infrared",
            Palette::Thermal => "Thermal",
            Palette::Grayscale => "Grayscale",
        }
    }

    /// Look up a palette by its display name (exact match).
    pub fn from_name(name: &str) -> Option<Palette> {
        ALL_PALETTES.iter().copied().find(|p| p.name() == name)
    }

    /// Next palette in cycle order, wrapping around.
    pub fn next(&self) -> Palette {
        match self {
            Palette::NdviClassic => Palette::Infrared,
            Palette::Infrared => Palette::Thermal,
            Palette::Thermal => Palette::Grayscale,
            Palette::Grayscale => Palette::NdviClassic,
        }
    }

    /// The three RGB anchor colors (low, mid, high), 8-bit channels.
    ///
    /// Two non-obvious constants: dark red is (128,0,0) and the
    /// grayscale midpoint is (160,160,164), not (128,128,128).
    pub fn anchors(&self) -> [[u8; 3]; 3] {
        match self {
            Palette::NdviClassic => [[255, 255, 255], [128, 0, 0], [0, 255, 0]],
            Palette::Infrared => [[0, 0, 0], [255, 0, 0], [255, 255, 255]],
            Palette::Thermal => [[0, 0, 255], [255, 255, 0], [255, 0, 0]],
            Palette::Grayscale => [[0, 0, 0], [160, 160, 164], [255, 255, 255]],
        }
    }

    /// Build the 256-entry LUT for this palette.
    pub fn lut(&self) -> Lut {
        let [c1, c2, c3] = self.anchors();
        Lut::build(c1, c2, c3)
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 256-entry color lookup table stored as three per-channel arrays.
///
/// Channel order is BGR, matching the frame pipeline, so colorize and the
/// colorbar index it directly with no reordering. A LUT is immutable once
/// built; palette changes swap in a freshly built one.
#[derive(Clone)]
pub struct Lut {
    pub b: [u8; 256],
    pub g: [u8; 256],
    pub r: [u8; 256],
}

impl Lut {
    /// Interpolate a LUT from three RGB anchor colors.
    ///
    /// For index i, t = i/255: the first half of the ramp blends c1 to c2,
    /// the second half c2 to c3. Channels are computed in f32 on [0,1] and
    /// quantized by multiplying by 255 and truncating.
    pub fn build(c1: [u8; 3], c2: [u8; 3], c3: [u8; 3]) -> Self {
        let a = to_unit(c1);
        let b = to_unit(c2);
        let c = to_unit(c3);

        let mut lut = Lut {
            b: [0; 256],
            g: [0; 256],
            r: [0; 256],
        };
        for i in 0..256 {
            let t = i as f32 / 255.0;
            let rgb = if t < 0.5 {
                let u = t * 2.0;
                lerp3(a, b, u)
            } else {
                let u = (t - 0.5) * 2.0;
                lerp3(b, c, u)
            };
            lut.r[i] = (rgb[0] * 255.0) as u8;
            lut.g[i] = (rgb[1] * 255.0) as u8;
            lut.b[i] = (rgb[2] * 255.0) as u8;
        }
        lut
    }

    /// The BGR triple at an index.
    #[inline]
    pub fn bgr(&self, idx: u8) -> [u8; 3] {
        let i = idx as usize;
        [self.b[i], self.g[i], self.r[i]]
    }
}

impl fmt::Debug for Lut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lut")
            .field("low", &self.bgr(0))
            .field("mid", &self.bgr(128))
            .field("high", &self.bgr(255))
            .finish()
    }
}

fn to_unit(c: [u8; 3]) -> [f32; 3] {
    [
        c[0] as f32 / 255.0,
        c[1] as f32 / 255.0,
        c[2] as f32 / 255.0,
    ]
}

fn lerp3(a: [f32; 3], b: [f32; 3], u: f32) -> [f32; 3] {
    [
        a[0] + u * (b[0] - a[0]),
        a[1] + u * (b[1] - a[1]),
        a[2] + u * (b[2] - a[2]),
    ]
}
