//! Operator event log.
//!
//! Every operator-visible action (feed changes, calibration results,
//! recording state, settings IO) lands here as a timestamped line. The
//! console renders the tail of this buffer in its log pane. Messages are
//! mirrored to the `log` facade so embedders can capture the stream; the
//! binary itself installs no logger, keeping the terminal clean for the UI.

use std::collections::VecDeque;

use chrono::Local;

/// Number of lines retained before the oldest are evicted.
pub const EVENT_LOG_CAPACITY: usize = 200;

/// Bounded ring of timestamped status lines.
#[derive(Debug)]
pub struct EventLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Stamp a message with the local wall clock and append it, evicting
    /// the oldest line once the buffer is full.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);

        let stamped = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(stamped);
    }

    /// All retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The last `n` lines, oldest first. Used by the log pane, which only
    /// has room for its own height.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
