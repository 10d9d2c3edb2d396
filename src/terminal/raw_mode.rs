//! Panic-safe terminal restoration.
//!
//! Raw mode plus the alternate screen make a panic unreadable: the
//! message prints into a screen that vanishes, with line endings
//! mangled. A process-wide hook undoes both before the default hook
//! runs. The flag lives here rather than in the session wrapper
//! because the hook outlives any one session.

use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::terminal::disable_raw_mode;

static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Record whether the process currently holds raw mode and the
/// alternate screen.
pub(crate) fn set_terminal_active(active: bool) {
    TERMINAL_ACTIVE.store(active, Ordering::SeqCst);
}

#[cfg(test)]
pub(crate) fn terminal_active() -> bool {
    TERMINAL_ACTIVE.load(Ordering::SeqCst)
}

/// Undo raw mode and the alternate screen, ignoring failures. Safe to
/// call when the terminal was never claimed.
pub(crate) fn emergency_restore() {
    if TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        let _ = crossterm::execute!(
            io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show,
        );
        let _ = disable_raw_mode();
    }
}

/// Chain terminal restoration in front of the default panic hook.
/// Installs at most once per process.
pub(crate) fn install_restore_hook() {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        emergency_restore();
        default_hook(info);
    }));
}
