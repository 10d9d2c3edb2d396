//! The camera handle the console holds while a feed is live.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc::Sender;

use super::capture_loop::run_capture_loop;
use super::device::list_devices;
use super::types::{CameraError, CameraSettings, Frame};

/// Handle to a camera and the thread that reads it.
///
/// `open` only validates that the device index exists; the device
/// itself is opened on the capture thread, because the backend handle
/// is not `Send` on every platform. Frames go out over the bounded
/// channel handed to [`CameraCapture::start`].
pub struct CameraCapture {
    capture_thread: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    settings: CameraSettings,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Check that `settings.device_index` names a real device and build
    /// an idle handle for it.
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        Ok(Self {
            capture_thread: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
        })
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Spawn the capture thread.
    ///
    /// Returns immediately; frames begin arriving once the stream is
    /// up. If the device cannot be opened the thread publishes a single
    /// sentinel frame (see [`Frame::is_sentinel`]), then exits and
    /// drops `tx`, which closes the channel from the reader's side.
    pub fn start(&mut self, tx: Sender<Frame>) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();

        self.capture_thread = Some(std::thread::spawn(move || {
            run_capture_loop(settings, tx, stop);
        }));
        Ok(())
    }

    /// Signal the capture thread to stop and join it.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
