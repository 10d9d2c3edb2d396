//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

/// One enumerated camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Capture resolution in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// The advisory capture size the console requests (640x480).
    ///
    /// The device may negotiate something else; the pipeline adapts to
    /// whatever dimensions frames actually arrive with.
    pub const STANDARD: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Blue-green-red, 3 bytes per pixel, the pipeline's native order
    Bgr24,
}

/// A captured camera frame.
///
/// Frames are owned messages: the capture thread builds one per capture
/// and publishes it across the channel exactly once, so no buffer is ever
/// shared between the capture and render contexts.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixels, `width * height * 3` bytes in BGR order
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
    /// Capture time on the publishing thread's clock
    pub timestamp: Instant,
}

impl Frame {
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Bgr24 => 3,
        }
    }

    /// The zero-sized frame the capture thread publishes exactly once to
    /// signal that the device could not be opened.
    pub fn sentinel() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            format: FrameFormat::Bgr24,
            timestamp: Instant::now(),
        }
    }

    /// True for the open-failure sentinel. Real devices never produce
    /// zero-sized frames.
    pub fn is_sentinel(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Capture configuration.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device_index: u32,
    /// Requested resolution, advisory only
    pub resolution: Resolution,
    /// Requested frame rate, advisory only
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
        }
    }
}

/// Failures raised by the capture stack.
///
/// Display strings are written for the event log pane, where the
/// operator sees them verbatim.
#[derive(Debug)]
pub enum CameraError {
    QueryFailed(String),
    OpenFailed(String),
    PermissionDenied,
    DeviceNotFound(u32),
    StreamFailed(String),
    AlreadyRunning,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::QueryFailed(msg) => write!(f, "Camera query failed: {}", msg),
            CameraError::OpenFailed(msg) => write!(f, "Cannot open camera: {}", msg),
            CameraError::PermissionDenied => {
                write!(
                    f,
                    "Camera access denied. On macOS grant it under System Settings > Privacy & Security > Camera"
                )
            }
            CameraError::DeviceNotFound(index) => {
                write!(
                    f,
                    "Camera {} not found; run list-cameras for the available indices",
                    index
                )
            }
            CameraError::StreamFailed(msg) => {
                write!(f, "Camera stream failed to start: {}", msg)
            }
            CameraError::AlreadyRunning => write!(f, "Capture thread already running"),
        }
    }
}

impl std::error::Error for CameraError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_info_display() {
        let info = CameraInfo {
            index: 0,
            name: "Test Camera".to_string(),
            description: "Built-in".to_string(),
        };
        assert_eq!(format!("{}", info), "[0] Test Camera (Built-in)");
    }

    #[test]
    fn test_default_settings() {
        let settings = CameraSettings::default();
        assert_eq!(settings.device_index, 0);
        assert_eq!(settings.resolution.width, 640);
        assert_eq!(settings.resolution.height, 480);
        assert_eq!(settings.fps, 30);
    }

    #[test]
    fn test_sentinel_frame_is_recognizable() {
        let s = Frame::sentinel();
        assert!(s.is_sentinel());
        assert!(s.data.is_empty());

        let real = Frame {
            data: vec![0; 6],
            width: 2,
            height: 1,
            format: FrameFormat::Bgr24,
            timestamp: Instant::now(),
        };
        assert!(!real.is_sentinel());
        assert_eq!(real.bytes_per_pixel(), 3);
    }

    #[test]
    fn test_error_strings_read_as_log_lines() {
        assert_eq!(
            format!("{}", CameraError::QueryFailed("no backend".to_string())),
            "Camera query failed: no backend"
        );
        assert_eq!(
            format!("{}", CameraError::DeviceNotFound(5)),
            "Camera 5 not found; run list-cameras for the available indices"
        );
        assert!(format!("{}", CameraError::PermissionDenied).contains("access denied"));
        assert_eq!(
            format!("{}", CameraError::AlreadyRunning),
            "Capture thread already running"
        );
    }
}
