//! Status bar summarizing console state at the bottom of the screen.

use crate::pipeline::NdviPipeline;

/// Status bar for displaying console state at the bottom of the screen.
///
/// Shows: palette | range | zoom | alpha | toggle flags | feed state
#[derive(Debug, Clone)]
pub struct StatusBar {
    /// Whether the status bar is visible
    pub visible: bool,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    /// Create a new status bar with default settings (visible).
    pub fn new() -> Self {
        Self { visible: true }
    }

    /// Format the status bar text from the console state.
    ///
    /// Toggle flags read `TGCBR` for telemetry, grid, crosshair, blend
    /// and ROI, with a dash for each one that is off. The feed slot shows
    /// `REC` while recording, `LIVE` while the feed runs unrecorded and
    /// `OFF` otherwise.
    pub fn format(&self, pipeline: &NdviPipeline, feed_live: bool, recording: bool) -> String {
        let flags = [
            (pipeline.telemetry, 'T'),
            (pipeline.grid, 'G'),
            (pipeline.crosshair, 'C'),
            (pipeline.blend, 'B'),
            (pipeline.roi.enabled, 'R'),
        ]
        .iter()
        .map(|&(on, c)| if on { c } else { '-' })
        .collect::<String>();

        let feed = if recording {
            "REC"
        } else if feed_live {
            "LIVE"
        } else {
            "OFF"
        };

        format!(
            " {} | {:.2}..{:.2} | zoom {}x | alpha {}% | {} | {} ",
            pipeline.palette().name(),
            pipeline.vmin(),
            pipeline.vmax(),
            pipeline.zoom(),
            pipeline.alpha(),
            flags,
            feed,
        )
    }
}
