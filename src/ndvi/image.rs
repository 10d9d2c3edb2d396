//! Packed BGR24 image container shared by the processing and render stages.

use crate::camera::{Frame, FrameFormat};

/// An owned BGR image, 3 bytes per pixel, row-major.
///
/// Channel order matches the camera feed (blue, green, red), so pixel data
/// flows from capture through colorize and overlay drawing without any
/// per-stage channel swapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrImage {
    /// Raw pixel data, `width * height * 3` bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl BgrImage {
    /// Create a black image of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height * 3],
            width,
            height,
        }
    }

    /// Create an image filled with a single BGR color.
    pub fn filled(width: usize, height: usize, bgr: [u8; 3]) -> Self {
        let mut img = Self::new(width, height);
        for px in img.data.chunks_exact_mut(3) {
            px.copy_from_slice(&bgr);
        }
        img
    }

    /// Reshape this image, reusing the allocation where possible.
    ///
    /// Contents are unspecified afterwards; callers overwrite every pixel.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height * 3, 0);
    }

    /// Byte offset of the pixel at (x, y).
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 3
    }

    /// Read the BGR triple at (x, y). Out-of-bounds reads return black.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Write the BGR triple at (x, y). Out-of-bounds writes are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, bgr: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i] = bgr[0];
        self.data[i + 1] = bgr[1];
        self.data[i + 2] = bgr[2];
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl From<&Frame> for BgrImage {
    fn from(frame: &Frame) -> Self {
        debug_assert_eq!(frame.format, FrameFormat::Bgr24);
        Self {
            data: frame.data.clone(),
            width: frame.width as usize,
            height: frame.height as usize,
        }
    }
}

impl From<Frame> for BgrImage {
    fn from(frame: Frame) -> Self {
        debug_assert_eq!(frame.format, FrameFormat::Bgr24);
        Self {
            data: frame.data,
            width: frame.width as usize,
            height: frame.height as usize,
        }
    }
}
