//! Terminal session wrapper around ratatui with the crossterm backend.

use std::io::{self, Stdout};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::raw_mode::{install_restore_hook, set_terminal_active};
use super::rendering::{self, ConsoleView};
use super::StatusBar;

/// Owns the terminal for the lifetime of the console.
///
/// Construction claims raw mode and the alternate screen; dropping the
/// value (or calling [`Tui::restore`]) gives both back. A panic hook
/// installed on first construction restores the terminal before the
/// panic message prints, so a crash never leaves the shell raw.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// False once restored; drop becomes a no-op
    active: bool,
}

impl Tui {
    /// Claim the terminal: raw mode, alternate screen, hidden cursor.
    pub fn new() -> io::Result<Self> {
        install_restore_hook();

        enable_raw_mode()?;
        set_terminal_active(true);

        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide,
        )?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Render one console frame.
    pub fn draw(&mut self, view: &ConsoleView, status_bar: &StatusBar) -> io::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            rendering::render_console(frame, view, status_bar, area);
        })?;
        Ok(())
    }

    /// Give the terminal back. Idempotent; drop after this is a no-op.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        set_terminal_active(false);

        crossterm::execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show,
        )?;
        disable_raw_mode()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            set_terminal_active(false);
            let _ = crossterm::execute!(
                self.terminal.backend_mut(),
                crossterm::terminal::LeaveAlternateScreen,
                crossterm::cursor::Show,
            );
            let _ = disable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::raw_mode::terminal_active;

    // These need a real TTY; headless runs skip with a note.

    #[test]
    fn test_claim_and_drop_release_terminal() {
        match Tui::new() {
            Ok(tui) => {
                assert!(tui.is_active());
                assert!(terminal_active());
                drop(tui);
                assert!(!terminal_active());
            }
            Err(e) => eprintln!("Skipping test (no TTY): {}", e),
        }
    }

    #[test]
    fn test_restore_is_idempotent() {
        match Tui::new() {
            Ok(mut tui) => {
                tui.restore().expect("restore");
                assert!(!tui.is_active());
                assert!(!terminal_active());
                tui.restore().expect("second restore");
                drop(tui);
                assert!(!terminal_active());
            }
            Err(e) => eprintln!("Skipping test (no TTY): {}", e),
        }
    }
}
