//! Terminal side of the console: session lifecycle, layout, status bar.

mod pane;
mod raw_mode;
mod rendering;
mod status_bar;
mod tui;

pub use pane::image_lines;
pub use rendering::{ConsoleView, CONSOLE_TITLE};
pub use status_bar::StatusBar;
pub use tui::Tui;
