//! Async event loop for concurrent handling of terminal, camera, and timers.
//!
//! This module separates the console's run loop from initialization,
//! keeping the operator command handling testable without a TTY.

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use chrono::Local;

use crate::camera::{CameraCapture, CameraSettings, Frame};
use crate::event_log::EventLog;
use crate::input::{handle_key_event, KeyAction};
use crate::pipeline::{
    AutoCalOutcome, AutoCalSample, NdviPipeline, DISPLAY_HEIGHT, DISPLAY_WIDTH, SLIDER_STEP,
};
use crate::record::{save_snapshot, timestamped_filename, AviWriter};
use crate::settings::{self, SettingsError};
use crate::terminal::{ConsoleView, StatusBar, Tui};

/// Frame channel depth. The capture thread drops frames on the floor
/// when the console falls behind instead of queueing stale video.
const FRAME_CHANNEL_CAPACITY: usize = 2;

/// Preview synthesizer cadence (colorbar and histogram).
const PREVIEW_INTERVAL: Duration = Duration::from_millis(200);

/// Console redraw cadence (~30 FPS).
const DRAW_INTERVAL: Duration = Duration::from_millis(33);

/// Startup configuration for the console.
pub struct ConsoleOptions {
    /// Camera device index to engage
    pub camera_index: u32,
    /// Settings file location
    pub settings_path: PathBuf,
    /// Directory receiving snapshots and recordings
    pub output_dir: PathBuf,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            camera_index: 0,
            settings_path: settings::default_path(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// The running console: processing state, operator log, and the
/// camera / recording endpoints the event loop drives.
pub struct Console {
    pipeline: NdviPipeline,
    log: EventLog,
    status_bar: StatusBar,
    camera_index: u32,
    settings_path: PathBuf,
    output_dir: PathBuf,
    capture: Option<CameraCapture>,
    frame_rx: Option<mpsc::Receiver<Frame>>,
    recorder: Option<AviWriter>,
}

impl Console {
    pub fn new(opts: ConsoleOptions) -> Self {
        Self {
            pipeline: NdviPipeline::new(),
            log: EventLog::new(),
            status_bar: StatusBar::new(),
            camera_index: opts.camera_index,
            settings_path: opts.settings_path,
            output_dir: opts.output_dir,
            capture: None,
            frame_rx: None,
            recorder: None,
        }
    }

    /// Processing state, for rendering and assertions.
    pub fn pipeline(&self) -> &NdviPipeline {
        &self.pipeline
    }

    /// Operator-visible event history.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Restore persisted settings, logging each applied value.
    ///
    /// A missing file is not an event; a malformed one is reported and
    /// the defaults stay in place.
    pub fn restore_settings(&mut self) {
        match settings::load(Some(&self.settings_path)) {
            Ok(Some(persisted)) => {
                let applied = self.pipeline.apply_persisted(&persisted);
                if let Some(v) = applied.min {
                    self.log.push(format!("Min {:.2}", v));
                }
                if let Some(v) = applied.max {
                    self.log.push(format!("Max {:.2}", v));
                }
                if let Some(name) = applied.palette {
                    self.log.push(format!("Palette {}", name));
                }
                if let Some(name) = &applied.unknown_palette {
                    self.log.push(format!("Unknown palette {}", name));
                }
                self.log.push("Settings restored");
            }
            Ok(None) => {}
            Err(e @ SettingsError::ParseError { .. }) => {
                log::warn!("{}", e);
                self.log.push("Settings restore failed: parse error");
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Set the NDVI range minimum from slider units (hundredths).
    pub fn set_min_units(&mut self, units: i32) {
        let v = self.pipeline.set_min_units(units);
        self.log.push(format!("Min {:.2}", v));
    }

    /// Set the NDVI range maximum from slider units (hundredths).
    pub fn set_max_units(&mut self, units: i32) {
        let v = self.pipeline.set_max_units(units);
        self.log.push(format!("Max {:.2}", v));
    }

    /// Select a palette by display name.
    pub fn select_palette(&mut self, name: &str) {
        match self.pipeline.set_palette_by_name(name) {
            Ok(applied) => self.log.push(format!("Palette {}", applied)),
            Err(()) => self.log.push(format!("Unknown palette {}", name)),
        }
    }

    /// Set the region of interest bounds (percentages) and enable it.
    pub fn set_roi_bounds(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        let roi = &mut self.pipeline.roi;
        roi.left = left;
        roi.top = top;
        roi.right = right;
        roi.bottom = bottom;
        self.log.push("ROI changed");
        if !self.pipeline.roi.enabled {
            self.pipeline.toggle_roi();
            self.log.push("Toggle changed");
        }
    }

    /// Set the crosshair overlay color (BGR).
    pub fn set_crosshair_color(&mut self, bgr: [u8; 3]) {
        self.pipeline.crosshair_color = bgr;
        self.log
            .push(format!("Xhair #{:02x}{:02x}{:02x}", bgr[2], bgr[1], bgr[0]));
    }

    /// Set the ROI overlay color (BGR).
    pub fn set_roi_color(&mut self, bgr: [u8; 3]) {
        self.pipeline.roi_color = bgr;
        self.log
            .push(format!("ROI #{:02x}{:02x}{:02x}", bgr[2], bgr[1], bgr[0]));
    }

    /// Drive the console until the operator quits or the terminal
    /// event stream ends.
    ///
    /// Four concurrent concerns:
    /// 1. Terminal events (keyboard) via crossterm EventStream
    /// 2. Camera frames via the capture thread's channel
    /// 3. Preview refresh tick (200 ms)
    /// 4. Console redraw tick (~30 FPS)
    pub async fn run(
        &mut self,
        tui: &mut Tui,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut event_stream = EventStream::new();

        let mut preview_interval = tokio::time::interval(PREVIEW_INTERVAL);
        preview_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut draw_interval = tokio::time::interval(DRAW_INTERVAL);
        draw_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Keyboard input. Resize needs no handling here: ratatui
                // picks up the new size on the next draw.
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key_event))) => {
                            match handle_key_event(key_event) {
                                KeyAction::Quit => break,
                                action => self.apply_action(action),
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(Box::new(e)),
                        None => break,
                    }
                }

                // Camera frames. A zero-sized sentinel or a closed channel
                // means the capture thread is done.
                maybe_frame = recv_frame(&mut self.frame_rx) => {
                    match maybe_frame {
                        Some(frame) if !frame.is_sentinel() => self.on_frame(&frame),
                        _ => self.stop_feed(),
                    }
                }

                _ = preview_interval.tick() => {
                    self.pipeline.refresh_previews();
                }

                _ = draw_interval.tick() => {
                    let view = ConsoleView {
                        pipeline: &self.pipeline,
                        log: &self.log,
                        feed_live: self.capture.is_some(),
                        recording: self.recorder.is_some(),
                    };
                    tui.draw(&view, &self.status_bar)?;
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Dispatch one decoded key command.
    fn apply_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::ToggleFeed => self.toggle_feed(),
            KeyAction::CyclePalette => {
                let name = self.pipeline.cycle_palette();
                self.log.push(format!("Palette {}", name));
            }
            KeyAction::MinDown => {
                let v = self.pipeline.adjust_min(-SLIDER_STEP);
                self.log.push(format!("Min {:.2}", v));
            }
            KeyAction::MinUp => {
                let v = self.pipeline.adjust_min(SLIDER_STEP);
                self.log.push(format!("Min {:.2}", v));
            }
            KeyAction::MaxDown => {
                let v = self.pipeline.adjust_max(-SLIDER_STEP);
                self.log.push(format!("Max {:.2}", v));
            }
            KeyAction::MaxUp => {
                let v = self.pipeline.adjust_max(SLIDER_STEP);
                self.log.push(format!("Max {:.2}", v));
            }
            KeyAction::CycleZoom => {
                let z = self.pipeline.cycle_zoom();
                self.log.push(format!("Zoom {}x", z));
            }
            KeyAction::ToggleTelemetry => {
                self.pipeline.toggle_telemetry();
                self.log.push("Toggle changed");
            }
            KeyAction::ToggleGrid => {
                self.pipeline.toggle_grid();
                self.log.push("Toggle changed");
            }
            KeyAction::ToggleCrosshair => {
                self.pipeline.toggle_crosshair();
                self.log.push("Toggle changed");
            }
            KeyAction::ToggleBlend => {
                self.pipeline.toggle_blend();
                self.log.push("Toggle changed");
            }
            KeyAction::AlphaDown => {
                let a = self.pipeline.adjust_alpha(-SLIDER_STEP);
                self.log.push(format!("Alpha {}", a));
            }
            KeyAction::AlphaUp => {
                let a = self.pipeline.adjust_alpha(SLIDER_STEP);
                self.log.push(format!("Alpha {}", a));
            }
            KeyAction::ToggleRoi => {
                self.pipeline.toggle_roi();
                self.log.push("Toggle changed");
            }
            KeyAction::AutoCalibrate => self.auto_calibrate(),
            KeyAction::Snapshot => self.snapshot(),
            KeyAction::ToggleRecording => self.toggle_recording(),
            KeyAction::Quit | KeyAction::None => {}
        }
    }

    fn toggle_feed(&mut self) {
        if self.capture.is_some() {
            self.stop_feed();
        } else {
            self.engage_feed();
        }
    }

    /// Start the capture thread and wire its frame channel in.
    fn engage_feed(&mut self) {
        if self.capture.is_some() {
            self.log.push("Camera already running");
            return;
        }

        let camera_settings = CameraSettings {
            device_index: self.camera_index,
            ..CameraSettings::default()
        };
        let mut capture = match CameraCapture::open(camera_settings) {
            Ok(capture) => capture,
            Err(e) => {
                self.log.push(format!("{}", e));
                return;
            }
        };

        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        if let Err(e) = capture.start(tx) {
            self.log.push(format!("{}", e));
            return;
        }

        self.frame_rx = Some(rx);
        self.capture = Some(capture);
        self.pipeline.reset_timing();
        self.log.push(format!("Feed on (Cam {})", self.camera_index));
    }

    /// Stop the capture thread, drop the frame channel, and report.
    ///
    /// Also the landing point for a feed that dies on its own; an open
    /// failure in the capture thread surfaces here via the sentinel.
    fn stop_feed(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
        }
        self.frame_rx = None;
        self.log.push("Feed off");
    }

    /// Feed one camera frame through the pipeline, recording the
    /// processed display image when a recording is active.
    fn on_frame(&mut self, frame: &Frame) {
        let now = Instant::now();
        let clock = Local::now().format("%H:%M:%S").to_string();
        let processed = self
            .pipeline
            .handle_frame(frame, now, &clock, self.recorder.is_some());

        if processed {
            if let Some(writer) = self.recorder.as_mut() {
                if let Err(e) = writer.write_frame(self.pipeline.display_image()) {
                    log::warn!("Record write failed: {}", e);
                    self.stop_recording();
                }
            }
        }
    }

    fn auto_calibrate(&mut self) {
        match self.pipeline.auto_calibrate() {
            AutoCalOutcome::NoFrame => self.log.push("AutoCalib: no frame yet"),
            AutoCalOutcome::NoValidValues(sample) => {
                self.log.push(sample_line(sample));
                self.log.push("AutoCalib: no valid NDVI values");
            }
            AutoCalOutcome::Calibrated {
                sample,
                p2,
                p98,
                new_min,
                new_max,
            } => {
                self.log.push(sample_line(sample));
                self.log.push(format!("Min {:.2}", new_min));
                self.log.push(format!("Max {:.2}", new_max));
                self.log.push(format!("AutoCalib {:.2} .. {:.2}", p2, p98));
            }
        }
    }

    fn snapshot(&mut self) {
        if !self.pipeline.has_display() {
            self.log.push("No frame yet - snapshot ignored");
            return;
        }
        let name = timestamped_filename("snap", "png");
        let path = self.output_dir.join(&name);
        match save_snapshot(self.pipeline.display_image(), &path) {
            Ok(()) => self.log.push(format!("Snapshot saved -> {}", name)),
            Err(e) => {
                log::warn!("Snapshot failed: {}", e);
                self.log.push("Snapshot failed");
            }
        }
    }

    fn toggle_recording(&mut self) {
        if self.recorder.is_some() {
            self.stop_recording();
            return;
        }

        let name = timestamped_filename("rec", "avi");
        let path = self.output_dir.join(&name);
        match AviWriter::create(&path, DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32) {
            Ok(writer) => {
                self.recorder = Some(writer);
                self.log.push(format!("Recording started -> {}", name));
            }
            Err(e) => {
                log::warn!("Recorder init failed: {}", e);
                self.log.push("Record init failed");
            }
        }
    }

    fn stop_recording(&mut self) {
        if let Some(writer) = self.recorder.take() {
            if let Err(e) = writer.finish() {
                log::warn!("Recorder close failed: {}", e);
            }
            self.log.push("Recording stopped");
        }
    }

    /// Quit path: stop the feed, persist settings, close any recording.
    fn shutdown(&mut self) {
        if self.capture.is_some() {
            self.stop_feed();
        }
        self.save_settings();
        if let Some(writer) = self.recorder.take() {
            if let Err(e) = writer.finish() {
                log::warn!("Recorder close failed: {}", e);
            }
        }
    }

    fn save_settings(&mut self) {
        match settings::save(Some(&self.settings_path), &self.pipeline.persisted()) {
            Ok(()) => self.log.push("Settings saved"),
            Err(e) => {
                log::warn!("{}", e);
                self.log.push("Settings save failed: cannot open file");
            }
        }
    }
}

/// Await the next camera frame, or park forever while the feed is off
/// so the select! branch never fires.
async fn recv_frame(rx: &mut Option<mpsc::Receiver<Frame>>) -> Option<Frame> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn sample_line(sample: AutoCalSample) -> &'static str {
    match sample {
        AutoCalSample::RoiRegion => "AutoCalib: using ROI region",
        AutoCalSample::InvalidRoiFullFrame => "AutoCalib: invalid ROI, using full frame",
        AutoCalSample::FullFrame => "AutoCalib: using full frame",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FrameFormat;
    use tempfile::tempdir;

    fn test_console(dir: &std::path::Path) -> Console {
        Console::new(ConsoleOptions {
            camera_index: 0,
            settings_path: dir.join("settings.json"),
            output_dir: dir.to_path_buf(),
        })
    }

    fn last_lines(console: &Console, n: usize) -> Vec<String> {
        console.log().tail(n).map(String::from).collect()
    }

    fn bgr_frame(width: u32, height: u32, bgr: [u8; 3]) -> Frame {
        let mut data = vec![0u8; (width * height * 3) as usize];
        for px in data.chunks_exact_mut(3) {
            px.copy_from_slice(&bgr);
        }
        Frame {
            data,
            width,
            height,
            format: FrameFormat::Bgr24,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_knob_actions_log_lines() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());

        console.apply_action(KeyAction::CyclePalette);
        console.apply_action(KeyAction::MinDown);
        console.apply_action(KeyAction::AlphaDown);
        console.apply_action(KeyAction::CycleZoom);
        console.apply_action(KeyAction::ToggleGrid);

        let lines = last_lines(&console, 5);
        assert!(lines[0].ends_with("Palette Infrared"), "{}", lines[0]);
        assert!(lines[1].ends_with("Min -0.05"), "{}", lines[1]);
        assert!(lines[2].ends_with("Alpha 95"), "{}", lines[2]);
        assert!(lines[3].ends_with("Zoom 2x"), "{}", lines[3]);
        assert!(lines[4].ends_with("Toggle changed"), "{}", lines[4]);
        assert!(console.pipeline().grid);
    }

    #[test]
    fn test_range_adjust_clamps_at_bounds() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());

        // Max starts at the ceiling; raising it stays put
        console.apply_action(KeyAction::MaxUp);
        let lines = last_lines(&console, 1);
        assert!(lines[0].ends_with("Max 1.00"), "{}", lines[0]);
        assert_eq!(console.pipeline().vmax_units(), 100);
    }

    #[test]
    fn test_autocal_without_frame() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.apply_action(KeyAction::AutoCalibrate);
        let lines = last_lines(&console, 1);
        assert!(lines[0].ends_with("AutoCalib: no frame yet"), "{}", lines[0]);
    }

    #[test]
    fn test_autocal_after_frame_reports_range() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());

        let frame = bgr_frame(64, 48, [10, 20, 200]);
        console.on_frame(&frame);
        console.apply_action(KeyAction::AutoCalibrate);

        let lines = last_lines(&console, 4);
        assert!(lines[0].ends_with("AutoCalib: using full frame"), "{}", lines[0]);
        assert!(lines[1].contains("Min "), "{}", lines[1]);
        assert!(lines[2].contains("Max "), "{}", lines[2]);
        assert!(lines[3].contains("AutoCalib ") && lines[3].contains(" .. "), "{}", lines[3]);
    }

    #[test]
    fn test_snapshot_without_frame_ignored() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.apply_action(KeyAction::Snapshot);
        let lines = last_lines(&console, 1);
        assert!(
            lines[0].ends_with("No frame yet - snapshot ignored"),
            "{}",
            lines[0]
        );
    }

    #[test]
    fn test_snapshot_after_frame_writes_png() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());

        console.on_frame(&bgr_frame(64, 48, [30, 60, 90]));
        console.apply_action(KeyAction::Snapshot);

        let lines = last_lines(&console, 1);
        assert!(lines[0].contains("Snapshot saved -> snap_"), "{}", lines[0]);

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "png"))
            .collect();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn test_record_toggle_creates_and_closes_avi() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());

        console.apply_action(KeyAction::ToggleRecording);
        assert!(console.recorder.is_some());
        let lines = last_lines(&console, 1);
        assert!(lines[0].contains("Recording started -> rec_"), "{}", lines[0]);

        // A processed frame lands in the file
        console.on_frame(&bgr_frame(64, 48, [0, 0, 255]));

        console.apply_action(KeyAction::ToggleRecording);
        assert!(console.recorder.is_none());
        let lines = last_lines(&console, 1);
        assert!(lines[0].ends_with("Recording stopped"), "{}", lines[0]);

        let avi: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "avi"))
            .collect();
        assert_eq!(avi.len(), 1);
        let bytes = std::fs::read(avi[0].path()).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"AVI ");
    }

    #[test]
    fn test_settings_round_trip_through_console() {
        let dir = tempdir().unwrap();

        {
            let mut console = test_console(dir.path());
            console.set_min_units(-25);
            console.set_max_units(60);
            console.select_palette("Thermal");
            console.save_settings();
            let lines = last_lines(&console, 1);
            assert!(lines[0].ends_with("Settings saved"), "{}", lines[0]);
        }

        let mut console = test_console(dir.path());
        console.restore_settings();
        assert_eq!(console.pipeline().vmin_units(), -25);
        assert_eq!(console.pipeline().vmax_units(), 60);
        assert_eq!(console.pipeline().palette().name(), "Thermal");

        let lines = last_lines(&console, 4);
        assert!(lines[0].ends_with("Min -0.25"), "{}", lines[0]);
        assert!(lines[1].ends_with("Max 0.60"), "{}", lines[1]);
        assert!(lines[2].ends_with("Palette Thermal"), "{}", lines[2]);
        assert!(lines[3].ends_with("Settings restored"), "{}", lines[3]);
    }

    #[test]
    fn test_restore_settings_missing_file_is_silent() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.restore_settings();
        assert!(console.log().is_empty());
    }

    #[test]
    fn test_restore_settings_parse_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        let mut console = test_console(dir.path());
        console.restore_settings();
        let lines = last_lines(&console, 1);
        assert!(
            lines[0].ends_with("Settings restore failed: parse error"),
            "{}",
            lines[0]
        );
    }

    #[test]
    fn test_unknown_palette_logged() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.select_palette("Sepia");
        let lines = last_lines(&console, 1);
        assert!(lines[0].ends_with("Unknown palette Sepia"), "{}", lines[0]);
        assert_eq!(console.pipeline().palette().name(), "NDVI Classic");
    }

    #[test]
    fn test_roi_bounds_enable_and_log() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.set_roi_bounds(10, 20, 90, 80);

        let roi = console.pipeline().roi;
        assert!(roi.enabled);
        assert_eq!((roi.left, roi.top, roi.right, roi.bottom), (10, 20, 90, 80));

        let lines = last_lines(&console, 2);
        assert!(lines[0].ends_with("ROI changed"), "{}", lines[0]);
        assert!(lines[1].ends_with("Toggle changed"), "{}", lines[1]);
    }

    #[test]
    fn test_overlay_color_overrides_log_hex() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.set_crosshair_color([255, 0, 0]);
        console.set_roi_color([0, 255, 255]);

        let lines = last_lines(&console, 2);
        assert!(lines[0].ends_with("Xhair #0000ff"), "{}", lines[0]);
        assert!(lines[1].ends_with("ROI #ffff00"), "{}", lines[1]);
        assert_eq!(console.pipeline().crosshair_color, [255, 0, 0]);
        assert_eq!(console.pipeline().roi_color, [0, 255, 255]);
    }

    #[test]
    fn test_stop_feed_without_capture_still_reports() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.stop_feed();
        let lines = last_lines(&console, 1);
        assert!(lines[0].ends_with("Feed off"), "{}", lines[0]);
    }

    #[test]
    fn test_sentinel_frame_is_rejected_by_pipeline() {
        let dir = tempdir().unwrap();
        let mut console = test_console(dir.path());
        console.on_frame(&Frame::sentinel());
        assert_eq!(console.pipeline().raw_frames(), 0);
    }
}
