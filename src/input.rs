//! Keyboard input handling.
//!
//! Translates crossterm key events into console commands. Every control
//! on the panel is reachable from a single key, no modifier chords
//! except Ctrl+C for quit.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A console command decoded from a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Engage the feed if idle, abort it if running
    ToggleFeed,
    /// Cycle to the next palette
    CyclePalette,
    /// Lower the NDVI minimum by one slider step
    MinDown,
    /// Raise the NDVI minimum by one slider step
    MinUp,
    /// Lower the NDVI maximum by one slider step
    MaxDown,
    /// Raise the NDVI maximum by one slider step
    MaxUp,
    /// Cycle zoom 1x -> 2x -> 3x -> 4x -> 1x
    CycleZoom,
    /// Toggle the telemetry overlay
    ToggleTelemetry,
    /// Toggle the alignment grid
    ToggleGrid,
    /// Toggle the crosshair
    ToggleCrosshair,
    /// Toggle raw/false-color blending
    ToggleBlend,
    /// Lower the blend alpha by one step
    AlphaDown,
    /// Raise the blend alpha by one step
    AlphaUp,
    /// Toggle the region of interest
    ToggleRoi,
    /// Run percentile auto-calibration
    AutoCalibrate,
    /// Save a snapshot of the processed view
    Snapshot,
    /// Start or stop AVI recording
    ToggleRecording,
    /// Shut the console down
    Quit,
    /// Key is not bound
    None,
}

/// Decode a key event into a console command.
///
/// Only key presses are considered; repeat and release events map to
/// [`KeyAction::None`] so terminals that report them do not double-fire
/// toggles.
pub fn handle_key_event(event: KeyEvent) -> KeyAction {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind != KeyEventKind::Press {
        return KeyAction::None;
    }

    // Ctrl+C quits like any terminal program
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    match code {
        KeyCode::Char('e') | KeyCode::Char('E') => KeyAction::ToggleFeed,
        KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::CyclePalette,
        KeyCode::Char('[') => KeyAction::MinDown,
        KeyCode::Char(']') => KeyAction::MinUp,
        KeyCode::Char('-') => KeyAction::MaxDown,
        KeyCode::Char('=') | KeyCode::Char('+') => KeyAction::MaxUp,
        KeyCode::Char('z') | KeyCode::Char('Z') => KeyAction::CycleZoom,
        KeyCode::Char('t') | KeyCode::Char('T') => KeyAction::ToggleTelemetry,
        KeyCode::Char('g') | KeyCode::Char('G') => KeyAction::ToggleGrid,
        KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::ToggleCrosshair,
        KeyCode::Char('b') | KeyCode::Char('B') => KeyAction::ToggleBlend,
        KeyCode::Char(',') => KeyAction::AlphaDown,
        KeyCode::Char('.') => KeyAction::AlphaUp,
        KeyCode::Char('o') | KeyCode::Char('O') => KeyAction::ToggleRoi,
        KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::AutoCalibrate,
        KeyCode::Char('n') | KeyCode::Char('N') => KeyAction::Snapshot,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::ToggleRecording,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}
