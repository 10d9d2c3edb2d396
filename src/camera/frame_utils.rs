//! Frame conversion utilities.

use nokhwa::pixel_format::RgbFormat;
use std::time::Instant;

use super::types::{Frame, FrameFormat};

/// Convert a nokhwa buffer to our BGR Frame format.
///
/// Handles various camera formats (MJPEG, YUYV, NV12, etc.) by using
/// nokhwa's built-in decode_image which automatically converts from
/// the camera's native format to RGB. The vegetation-index pipeline
/// works on BGR throughout, so the channel order is swapped here on
/// the capture thread and never touched again downstream.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn convert_to_bgr(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    let mut data = decoded.into_raw();
    swap_red_blue_in_place(&mut data);

    Some(Frame {
        data,
        width: resolution.width(),
        height: resolution.height(),
        format: FrameFormat::Bgr24,
        timestamp: Instant::now(),
    })
}

/// Swap the first and third channels of packed 3-byte pixels in place.
///
/// Converts RGB to BGR and back; the swap is its own inverse, so the
/// snapshot and recording encoders use the same call to go the other way.
pub fn swap_red_blue_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}
