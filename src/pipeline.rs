//! Frame scheduling and console state.
//!
//! [`NdviPipeline`] owns every operator-adjustable knob plus the image
//! buffers the panes render from. Raw frames update the raw pane
//! unthrottled; the expensive path (zoom, NDVI, colorize, blend, overlay,
//! display resize) runs at most once per throttle interval. All buffers
//! are reused across frames, so steady-state processing allocates only
//! for overlay text formatting.

use std::time::{Duration, Instant};

use crate::camera::Frame;
use crate::ndvi::{
    colorize_into, compute_ndvi_into, percentile_bounds, resize_bilinear_into, zoom_into,
    BgrImage, Lut, NdviField, Palette, Roi, MAX_ZOOM, MIN_ZOOM,
};
use crate::render::draw::blend_in_place;
use crate::render::{
    draw_overlay, render_colorbar_into, render_histogram_into, OverlayFrame, COLORBAR_H,
    COLORBAR_W, HIST_H, HIST_W,
};
use crate::settings::PersistedSettings;

/// Fixed size of the processed display image; recordings and snapshots
/// use these dimensions too.
pub const DISPLAY_WIDTH: usize = 560;
pub const DISPLAY_HEIGHT: usize = 320;

/// Minimum wall-clock gap between processed-path runs.
pub const PROCESS_INTERVAL: Duration = Duration::from_millis(100);

/// How much one hotkey press moves the range and alpha sliders.
pub const SLIDER_STEP: i32 = 5;

/// Wall-clock gate for the processed path.
///
/// The first frame always passes. Time is injected so tests can drive
/// the schedule with synthetic instants.
#[derive(Debug)]
pub struct ProcessThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProcessThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true when enough wall time has passed since the last
    /// accepted frame, and marks `now` as the new reference.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Processed-path frame rate, measured as the inverse wall-clock gap
/// between consecutive processed frames.
#[derive(Debug, Default)]
pub struct FpsCounter {
    last: Option<Instant>,
    fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, now: Instant) -> f32 {
        if let Some(last) = self.last {
            let dt = now.duration_since(last).as_secs_f32();
            if dt > 0.0 {
                self.fps = 1.0 / dt;
            }
        }
        self.last = Some(now);
        self.fps
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.fps = 0.0;
    }
}

/// Which region an auto-calibration sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCalSample {
    RoiRegion,
    InvalidRoiFullFrame,
    FullFrame,
}

/// Result of an auto-calibration request. The caller turns this into
/// log lines; the slider writeback has already happened on `Calibrated`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoCalOutcome {
    /// No NDVI field exists yet
    NoFrame,
    /// The sampled region held no finite values; range unchanged
    NoValidValues(AutoCalSample),
    Calibrated {
        sample: AutoCalSample,
        p2: f32,
        p98: f32,
        /// New lower bound after rounding and clamping, in NDVI units
        new_min: f32,
        /// New upper bound after rounding and clamping, in NDVI units
        new_max: f32,
    },
}

/// What a settings restore actually changed, for caller-side logging.
#[derive(Debug, Default, PartialEq)]
pub struct AppliedSettings {
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub palette: Option<&'static str>,
    pub unknown_palette: Option<String>,
}

/// The console's processing core.
pub struct NdviPipeline {
    // Operator knobs. Range and alpha are kept in slider units, the
    // integer form the settings file stores.
    vmin_units: i32,
    vmax_units: i32,
    palette: Palette,
    lut: Lut,
    zoom: u8,
    alpha: i32,
    pub blend: bool,
    pub telemetry: bool,
    pub grid: bool,
    pub crosshair: bool,
    pub roi: Roi,
    pub crosshair_color: [u8; 3],
    pub roi_color: [u8; 3],

    throttle: ProcessThrottle,
    fps: FpsCounter,
    fps_value: f32,

    // Image state, reused across frames
    raw: BgrImage,
    zoomed: BgrImage,
    ndvi: NdviField,
    colorized: BgrImage,
    display: BgrImage,
    colorbar: BgrImage,
    histogram: BgrImage,

    raw_frames: u64,
    processed_frames: u64,
}

impl NdviPipeline {
    pub fn new() -> Self {
        let palette = Palette::NdviClassic;
        Self {
            vmin_units: 0,
            vmax_units: 100,
            palette,
            lut: palette.lut(),
            zoom: MIN_ZOOM,
            alpha: 100,
            blend: false,
            telemetry: true,
            grid: false,
            crosshair: false,
            roi: Roi::default(),
            crosshair_color: [0, 255, 0],
            roi_color: [0, 0, 255],
            throttle: ProcessThrottle::new(PROCESS_INTERVAL),
            fps: FpsCounter::default(),
            fps_value: 0.0,
            raw: BgrImage::new(0, 0),
            zoomed: BgrImage::new(0, 0),
            ndvi: NdviField::default(),
            colorized: BgrImage::new(0, 0),
            display: BgrImage::new(0, 0),
            colorbar: BgrImage::new(COLORBAR_W, COLORBAR_H),
            histogram: BgrImage::new(HIST_W, HIST_H),
            raw_frames: 0,
            processed_frames: 0,
        }
    }

    /// Lower display bound in NDVI units.
    pub fn vmin(&self) -> f32 {
        self.vmin_units as f32 / 100.0
    }

    /// Upper display bound in NDVI units.
    pub fn vmax(&self) -> f32 {
        self.vmax_units as f32 / 100.0
    }

    pub fn vmin_units(&self) -> i32 {
        self.vmin_units
    }

    pub fn vmax_units(&self) -> i32 {
        self.vmax_units
    }

    pub fn set_min_units(&mut self, units: i32) -> f32 {
        self.vmin_units = units.clamp(-100, 100);
        self.vmin()
    }

    pub fn set_max_units(&mut self, units: i32) -> f32 {
        self.vmax_units = units.clamp(-100, 100);
        self.vmax()
    }

    pub fn adjust_min(&mut self, delta: i32) -> f32 {
        self.set_min_units(self.vmin_units + delta)
    }

    pub fn adjust_max(&mut self, delta: i32) -> f32 {
        self.set_max_units(self.vmax_units + delta)
    }

    pub fn alpha(&self) -> i32 {
        self.alpha
    }

    pub fn adjust_alpha(&mut self, delta: i32) -> i32 {
        self.alpha = (self.alpha + delta).clamp(0, 100);
        self.alpha
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.lut = palette.lut();
    }

    /// Switch palette by display name. `Err` carries nothing; the caller
    /// already has the rejected name for its log line.
    pub fn set_palette_by_name(&mut self, name: &str) -> Result<&'static str, ()> {
        match Palette::from_name(name) {
            Some(p) => {
                self.set_palette(p);
                Ok(p.name())
            }
            None => Err(()),
        }
    }

    pub fn cycle_palette(&mut self) -> &'static str {
        self.set_palette(self.palette.next());
        self.palette.name()
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn cycle_zoom(&mut self) -> u8 {
        self.zoom = if self.zoom >= MAX_ZOOM {
            MIN_ZOOM
        } else {
            self.zoom + 1
        };
        self.zoom
    }

    pub fn toggle_telemetry(&mut self) -> bool {
        self.telemetry = !self.telemetry;
        self.telemetry
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.grid = !self.grid;
        self.grid
    }

    pub fn toggle_crosshair(&mut self) -> bool {
        self.crosshair = !self.crosshair;
        self.crosshair
    }

    pub fn toggle_blend(&mut self) -> bool {
        self.blend = !self.blend;
        self.blend
    }

    pub fn toggle_roi(&mut self) -> bool {
        self.roi.enabled = !self.roi.enabled;
        self.roi.enabled
    }

    /// Apply a restored settings document. Only keys present in the file
    /// change anything; an unrecognized palette name is reported back
    /// instead of applied.
    pub fn apply_persisted(&mut self, settings: &PersistedSettings) -> AppliedSettings {
        let mut applied = AppliedSettings::default();
        if let Some(min) = settings.min {
            applied.min = Some(self.set_min_units(min));
        }
        if let Some(max) = settings.max {
            applied.max = Some(self.set_max_units(max));
        }
        if let Some(name) = &settings.palette {
            match self.set_palette_by_name(name) {
                Ok(applied_name) => applied.palette = Some(applied_name),
                Err(()) => applied.unknown_palette = Some(name.clone()),
            }
        }
        applied
    }

    /// The document to persist on shutdown.
    pub fn persisted(&self) -> PersistedSettings {
        PersistedSettings {
            min: Some(self.vmin_units),
            max: Some(self.vmax_units),
            palette: Some(self.palette.name().to_string()),
        }
    }

    /// Forget throttle and FPS history, e.g. when a new feed engages.
    pub fn reset_timing(&mut self) {
        self.throttle.reset();
        self.fps.reset();
        self.fps_value = 0.0;
    }

    /// Feed one raw frame through the console at time `now`.
    ///
    /// The raw pane always updates. Returns true when the throttle let
    /// the frame through the processed path, which also refreshes the
    /// display image (and is the caller's cue to push it to an active
    /// recording).
    pub fn handle_frame(
        &mut self,
        frame: &Frame,
        now: Instant,
        clock: &str,
        recording: bool,
    ) -> bool {
        let w = frame.width as usize;
        let h = frame.height as usize;
        if w == 0 || h == 0 || frame.data.len() != w * h * 3 {
            return false;
        }

        self.raw.reset(w, h);
        self.raw.data.copy_from_slice(&frame.data);
        self.raw_frames += 1;

        if !self.throttle.ready(now) {
            return false;
        }
        self.process(now, clock, recording);
        true
    }

    fn process(&mut self, now: Instant, clock: &str, recording: bool) {
        self.fps_value = self.fps.tick(now);

        zoom_into(&self.raw, self.zoom, &mut self.zoomed);
        compute_ndvi_into(&self.zoomed, &mut self.ndvi);
        colorize_into(
            &self.ndvi,
            self.vmin(),
            self.vmax(),
            &self.lut,
            &mut self.colorized,
        );

        if self.blend {
            // Alpha weights the false-color layer; the remainder is the
            // zoomed raw input showing through
            blend_in_place(
                &mut self.colorized,
                &self.zoomed,
                self.alpha as f32 / 100.0,
            );
        }

        let overlay = OverlayFrame {
            telemetry: self.telemetry,
            grid: self.grid,
            crosshair: self.crosshair,
            crosshair_color: self.crosshair_color,
            roi: self.roi,
            roi_color: self.roi_color,
            recording,
            fps: self.fps_value,
            clock,
        };
        draw_overlay(&mut self.colorized, &self.ndvi, &overlay);

        resize_bilinear_into(&self.colorized, DISPLAY_WIDTH, DISPLAY_HEIGHT, &mut self.display);
        self.processed_frames += 1;
    }

    /// Re-render the colorbar and histogram previews.
    ///
    /// Skipped entirely until the first processed frame exists. The
    /// histogram keeps its previous contents when the current field has
    /// no finite values. Returns true when anything was redrawn.
    pub fn refresh_previews(&mut self) -> bool {
        if self.ndvi.is_empty() {
            return false;
        }
        render_colorbar_into(&self.lut, self.vmin(), self.vmax(), &mut self.colorbar);
        render_histogram_into(&self.ndvi, self.vmin(), self.vmax(), &mut self.histogram);
        true
    }

    /// Set the range to the 2nd/98th percentiles of the last NDVI field,
    /// sampling the ROI region when one is enabled and valid.
    pub fn auto_calibrate(&mut self) -> AutoCalOutcome {
        if self.ndvi.is_empty() {
            return AutoCalOutcome::NoFrame;
        }

        let (sample, bounds) = if self.roi.enabled {
            match self.roi.rect(self.ndvi.width, self.ndvi.height) {
                Some(rect) => (
                    AutoCalSample::RoiRegion,
                    percentile_bounds(rect.sample(&self.ndvi)),
                ),
                None => (
                    AutoCalSample::InvalidRoiFullFrame,
                    percentile_bounds(self.ndvi.values.iter().copied()),
                ),
            }
        } else {
            (
                AutoCalSample::FullFrame,
                percentile_bounds(self.ndvi.values.iter().copied()),
            )
        };

        match bounds {
            None => AutoCalOutcome::NoValidValues(sample),
            Some((p2, p98)) => {
                let new_min = self.set_min_units((p2 * 100.0).round() as i32);
                let new_max = self.set_max_units((p98 * 100.0).round() as i32);
                AutoCalOutcome::Calibrated {
                    sample,
                    p2,
                    p98,
                    new_min,
                    new_max,
                }
            }
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps_value
    }

    /// Most recent raw frame; zero-sized until one arrives.
    pub fn raw_image(&self) -> &BgrImage {
        &self.raw
    }

    /// Processed display image at 560x320; zero-sized until the first
    /// processed frame.
    pub fn display_image(&self) -> &BgrImage {
        &self.display
    }

    pub fn colorbar_image(&self) -> &BgrImage {
        &self.colorbar
    }

    pub fn histogram_image(&self) -> &BgrImage {
        &self.histogram
    }

    pub fn has_display(&self) -> bool {
        self.display.pixel_count() > 0
    }

    pub fn ndvi_field(&self) -> &NdviField {
        &self.ndvi
    }

    pub fn raw_frames(&self) -> u64 {
        self.raw_frames
    }

    pub fn processed_frames(&self) -> u64 {
        self.processed_frames
    }
}

impl Default for NdviPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FrameFormat;

    fn frame_filled(width: u32, height: u32, bgr: [u8; 3]) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&bgr);
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
    fn test_throttle_first_frame_passes() {
        let mut t = ProcessThrottle::new(Duration::from_millis(100));
        let now = Instant::now();
        assert!(t.ready(now));
        assert!(!t.ready(now + Duration::from_millis(50)));
        assert!(t.ready(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_throttle_reset_reopens_gate() {
        let mut t = ProcessThrottle::new(Duration::from_millis(100));
        let now = Instant::now();
        assert!(t.ready(now));
        t.reset();
        assert!(t.ready(now + Duration::from_millis(1)));
    }

    #[test]
    fn test_fps_counter_wall_clock_delta() {
        let mut f = FpsCounter::default();
        let t0 = Instant::now();
        assert_eq!(f.tick(t0), 0.0);
        let fps = f.tick(t0 + Duration::from_millis(100));
        assert!((fps - 10.0).abs() < 0.01, "fps was {}", fps);
        let fps = f.tick(t0 + Duration::from_millis(600));
        assert!((fps - 2.0).abs() < 0.01, "fps was {}", fps);
    }

    #[test]
    fn test_defaults_match_the_panel() {
        let p = NdviPipeline::new();
        assert_eq!(p.vmin_units(), 0);
        assert_eq!(p.vmax_units(), 100);
        assert_eq!(p.palette(), Palette::NdviClassic);
        assert_eq!(p.zoom(), 1);
        assert_eq!(p.alpha(), 100);
        assert!(!p.blend);
        assert!(p.telemetry);
        assert!(!p.grid);
        assert!(!p.crosshair);
        assert!(!p.roi.enabled);
        assert_eq!(p.crosshair_color, [0, 255, 0]);
        assert_eq!(p.roi_color, [0, 0, 255]);
    }

    #[test]
    fn test_slider_clamps() {
        let mut p = NdviPipeline::new();
        assert_eq!(p.adjust_min(-300), -1.0);
        assert_eq!(p.adjust_max(300), 1.0);
        assert_eq!(p.adjust_alpha(50), 100);
        assert_eq!(p.adjust_alpha(-250), 0);
    }

    #[test]
    fn test_cycle_zoom_wraps() {
        let mut p = NdviPipeline::new();
        assert_eq!(p.cycle_zoom(), 2);
        assert_eq!(p.cycle_zoom(), 3);
        assert_eq!(p.cycle_zoom(), 4);
        assert_eq!(p.cycle_zoom(), 1);
    }

    #[test]
    fn test_throttled_processing_counts() {
        // 100 frames 10 ms apart span one second; a 100 ms gate lets
        // exactly every tenth frame through, starting with the first
        let mut p = NdviPipeline::new();
        let frame = frame_filled(8, 8, [128, 128, 128]);
        let t0 = Instant::now();

        let mut processed = 0;
        for i in 0..100u64 {
            let now = t0 + Duration::from_millis(i * 10);
            if p.handle_frame(&frame, now, "12:00:00", false) {
                processed += 1;
            }
        }
        assert_eq!(p.raw_frames(), 100);
        assert_eq!(processed, 10);
        assert_eq!(p.processed_frames(), 10);
    }

    #[test]
    fn test_handle_frame_rejects_sentinel() {
        let mut p = NdviPipeline::new();
        let sentinel = Frame::sentinel();
        assert!(!p.handle_frame(&sentinel, Instant::now(), "12:00:00", false));
        assert_eq!(p.raw_frames(), 0);
    }

    #[test]
    fn test_display_image_is_fixed_size() {
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        let frame = frame_filled(64, 48, [0, 0, 200]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));
        assert_eq!(p.display_image().width, DISPLAY_WIDTH);
        assert_eq!(p.display_image().height, DISPLAY_HEIGHT);
        assert!(p.has_display());
    }

    #[test]
    fn test_red_frame_over_full_range_is_palette_top() {
        // Red-only input pushes NDVI to +1; over (-1, 1) that lands on
        // the last LUT entry, green for the classic palette
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        p.set_min_units(-100);
        p.set_max_units(100);
        let frame = frame_filled(64, 48, [0, 0, 200]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));
        let display = p.display_image();
        // Sample away from edges: the uniform field resizes to itself
        assert_eq!(display.pixel(100, 100), [0, 255, 0]);
        assert_eq!(display.pixel(400, 250), [0, 255, 0]);
    }

    #[test]
    fn test_gray_frame_over_full_range_is_palette_midpoint() {
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        p.set_min_units(-100);
        p.set_max_units(100);
        let frame = frame_filled(64, 48, [128, 128, 128]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));
        let expected = Palette::NdviClassic.lut().bgr(128);
        assert_eq!(p.display_image().pixel(280, 160), expected);
    }

    #[test]
    fn test_blend_at_full_alpha_is_pure_false_color() {
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        p.blend = true; // alpha stays at its default 100
        p.set_min_units(-100);
        p.set_max_units(100);
        let frame = frame_filled(64, 48, [0, 0, 200]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));
        assert_eq!(p.display_image().pixel(100, 100), [0, 255, 0]);
    }

    #[test]
    fn test_blend_at_zero_alpha_shows_raw() {
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        p.blend = true;
        p.adjust_alpha(-100);
        p.set_min_units(-100);
        p.set_max_units(100);
        let frame = frame_filled(64, 48, [10, 20, 200]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));
        assert_eq!(p.display_image().pixel(100, 100), [10, 20, 200]);
    }

    #[test]
    fn test_auto_calibrate_without_frame() {
        let mut p = NdviPipeline::new();
        assert_eq!(p.auto_calibrate(), AutoCalOutcome::NoFrame);
    }

    #[test]
    fn test_auto_calibrate_full_frame_split() {
        // Left half pure red (NDVI -> +1), right half pure blue (-> -1)
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        let mut frame = frame_filled(64, 48, [0, 0, 255]);
        for y in 0..48usize {
            for x in 32..64usize {
                let off = (y * 64 + x) * 3;
                frame.data[off] = 255;
                frame.data[off + 2] = 0;
            }
        }
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));

        match p.auto_calibrate() {
            AutoCalOutcome::Calibrated {
                sample,
                new_min,
                new_max,
                ..
            } => {
                assert_eq!(sample, AutoCalSample::FullFrame);
                assert!(new_min <= -0.99, "min was {}", new_min);
                assert!(new_max >= 0.99, "max was {}", new_max);
            }
            other => panic!("expected Calibrated, got {:?}", other),
        }
        assert_eq!(p.vmin_units(), -100);
        assert_eq!(p.vmax_units(), 100);
    }

    #[test]
    fn test_auto_calibrate_invalid_roi_falls_back() {
        let mut p = NdviPipeline::new();
        p.telemetry = false;
        p.roi.enabled = true;
        p.roi.left = 80;
        p.roi.right = 20; // right <= left: invalid
        let frame = frame_filled(32, 32, [128, 128, 128]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));

        match p.auto_calibrate() {
            AutoCalOutcome::Calibrated { sample, .. } => {
                assert_eq!(sample, AutoCalSample::InvalidRoiFullFrame);
            }
            other => panic!("expected Calibrated, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_previews_waits_for_first_frame() {
        let mut p = NdviPipeline::new();
        assert!(!p.refresh_previews());
        let frame = frame_filled(16, 16, [0, 0, 200]);
        assert!(p.handle_frame(&frame, Instant::now(), "12:00:00", false));
        assert!(p.refresh_previews());
        assert_eq!(p.colorbar_image().width, COLORBAR_W);
        assert_eq!(p.histogram_image().height, HIST_H);
    }

    #[test]
    fn test_apply_persisted_reports_changes() {
        let mut p = NdviPipeline::new();
        let applied = p.apply_persisted(&PersistedSettings {
            min: Some(-25),
            max: Some(60),
            palette: Some("Thermal".to_string()),
        });
        assert_eq!(applied.min, Some(-0.25));
        assert_eq!(applied.max, Some(0.6));
        assert_eq!(applied.palette, Some("Thermal"));
        assert!(applied.unknown_palette.is_none());
        assert_eq!(p.palette(), Palette::Thermal);
    }

    #[test]
    fn test_apply_persisted_rejects_unknown_palette() {
        let mut p = NdviPipeline::new();
        let applied = p.apply_persisted(&PersistedSettings {
            min: None,
            max: None,
            palette: Some("Sepia".to_string()),
        });
        assert_eq!(applied.unknown_palette.as_deref(), Some("Sepia"));
        assert_eq!(p.palette(), Palette::NdviClassic);
    }

    #[test]
    fn test_persisted_round_trip_through_pipeline() {
        let mut p = NdviPipeline::new();
        p.set_min_units(-25);
        p.set_max_units(60);
        p.set_palette(Palette::Thermal);

        let doc = p.persisted();
        let mut q = NdviPipeline::new();
        q.apply_persisted(&doc);
        assert_eq!(q.vmin_units(), -25);
        assert_eq!(q.vmax_units(), 60);
        assert_eq!(q.palette(), Palette::Thermal);
    }
}
