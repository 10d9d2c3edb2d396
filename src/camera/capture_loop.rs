//! Background capture thread implementation.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

use super::frame_utils::convert_to_bgr;
use super::types::{CameraError, CameraSettings, Frame};

/// Run the capture loop in a background thread.
///
/// Frames are published over `tx` as owned messages. The channel is bounded;
/// when the render side lags, `try_send` fails and the frame is dropped so
/// the feed never builds up latency.
///
/// If the device cannot be opened or streamed, a single sentinel frame is
/// sent instead and the thread exits. Dropping the sender is how the render
/// side learns the feed ended, whatever the reason.
pub fn run_capture_loop(settings: CameraSettings, tx: Sender<Frame>, stop: Arc<AtomicBool>) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            log::warn!("{}", e);
            let _ = tx.blocking_send(Frame::sentinel());
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        log::warn!("{}", CameraError::StreamFailed(e.to_string()));
        let _ = tx.blocking_send(Frame::sentinel());
        return;
    }

    let res = camera.resolution();
    log::info!(
        "Capture stream open: {}x{} @ {} fps",
        res.width(),
        res.height(),
        camera.frame_rate()
    );

    while !stop.load(Ordering::Relaxed) {
        match camera.frame() {
            Ok(raw_frame) => {
                // Conversion failures skip the frame; the next one may decode
                if let Some(frame) = convert_to_bgr(&raw_frame) {
                    match tx.try_send(frame) {
                        Ok(()) => {}
                        // Render side is behind; drop this frame
                        Err(TrySendError::Full(_)) => {}
                        // Render side is gone; nothing left to capture for
                        Err(TrySendError::Closed(_)) => break,
                    }
                }
            }
            Err(e) => {
                log::warn!("Frame read failed: {}", e);
                break;
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    let _ = camera.stop_stream();
}

/// Open the device, trying formats from most to least specific: NV12
/// at the requested size, then MJPEG, then whatever the device offers
/// at its highest resolution.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let wanted =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);
    let attempts = [
        RequestedFormatType::Closest(CameraFormat::new(wanted, NokhwaFrameFormat::NV12, settings.fps)),
        RequestedFormatType::Closest(CameraFormat::new(wanted, NokhwaFrameFormat::MJPEG, settings.fps)),
        RequestedFormatType::AbsoluteHighestResolution,
    ];

    let mut last_error = None;
    for format_type in attempts {
        match Camera::new(index.clone(), RequestedFormat::new::<RgbFormat>(format_type)) {
            Ok(cam) => return Ok(cam),
            Err(e) => last_error = Some(e),
        }
    }
    Err(classify_open_error(last_error))
}

/// Fold the backend's stringly error into the two cases the operator
/// can act on: a permission problem or a plain open failure.
fn classify_open_error(error: Option<nokhwa::NokhwaError>) -> CameraError {
    let Some(e) = error else {
        return CameraError::OpenFailed("no formats attempted".to_string());
    };
    let msg = e.to_string().to_lowercase();
    let denied = ["permission", "denied", "authorization", "access"];
    if denied.iter().any(|k| msg.contains(k)) {
        CameraError::PermissionDenied
    } else {
        CameraError::OpenFailed(e.to_string())
    }
}
