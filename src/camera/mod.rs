//! Webcam access and frame delivery.
//!
//! [`list_devices`] enumerates cameras; [`CameraCapture`] owns the
//! thread that reads one and publishes BGR [`Frame`]s over a bounded
//! channel, signalling open failure with a single sentinel frame.

mod capture;
mod capture_loop;
mod device;
mod frame_utils;
mod types;

pub use capture::CameraCapture;
pub use device::list_devices;
pub use frame_utils::swap_red_blue_in_place;
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, FrameFormat, Resolution};
