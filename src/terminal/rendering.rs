//! Rendering functions for the console UI.
//!
//! This module contains pure rendering logic separated from terminal
//! lifecycle management. All functions operate on ratatui Frame objects
//! without managing terminal state.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::pane::image_lines;
use super::StatusBar;
use crate::event_log::EventLog;
use crate::ndvi::BgrImage;
use crate::pipeline::NdviPipeline;

/// Banner shown on the console's top row.
pub const CONSOLE_TITLE: &str = "RAZIEL | NDVI Console v2.2 | CLASSIFIED";

/// Everything the renderer needs for one frame of the console.
pub struct ConsoleView<'a> {
    /// Processing state: images, range, toggles
    pub pipeline: &'a NdviPipeline,
    /// Operator-visible event history
    pub log: &'a EventLog,
    /// Whether the camera feed is currently engaged
    pub feed_live: bool,
    /// Whether an AVI recording is in progress
    pub recording: bool,
}

/// Render the complete console.
///
/// Layout, top to bottom:
/// 1. Title banner (one row)
/// 2. Main area: processed and raw feeds on the left, colorbar,
///    histogram and event log on the right
/// 3. Status bar (bottom row, if visible)
pub fn render_console(
    frame: &mut ratatui::Frame,
    view: &ConsoleView,
    status_bar: &StatusBar,
    area: Rect,
) {
    // Reserve the bottom row for the status bar
    let show_status = status_bar.visible && area.height > 1;
    let main_area = if show_status {
        Rect {
            height: area.height.saturating_sub(1),
            ..area
        }
    } else {
        area
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(main_area);

    render_title(frame, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[0]);

    let pipeline = view.pipeline;
    render_video_pane(
        frame,
        " Processed ",
        pipeline.display_image(),
        pipeline.has_display(),
        "awaiting feed",
        left[0],
    );
    render_video_pane(
        frame,
        " Raw ",
        pipeline.raw_image(),
        pipeline.raw_frames() > 0,
        "feed off",
        left[1],
    );

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(columns[1]);

    let previews = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(right[0]);

    render_video_pane(
        frame,
        " Colorbar ",
        pipeline.colorbar_image(),
        true,
        "",
        previews[0],
    );
    render_video_pane(
        frame,
        " Histogram ",
        pipeline.histogram_image(),
        true,
        "",
        previews[1],
    );

    render_event_log(frame, view.log, right[1]);
    render_key_hints(frame, right[2]);

    if show_status {
        render_status_bar(frame, status_bar, view, area);
    }
}

/// Render the title banner.
fn render_title(frame: &mut ratatui::Frame, area: Rect) {
    let title = Paragraph::new(CONSOLE_TITLE)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
    frame.render_widget(title, area);
}

/// Render one bordered image pane.
///
/// When `available` is false the pane shows `placeholder` instead of
/// image content.
fn render_video_pane(
    frame: &mut ratatui::Frame,
    title: &'static str,
    img: &BgrImage,
    available: bool,
    placeholder: &'static str,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if available {
        let lines = image_lines(img, inner.width, inner.height);
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
    } else {
        let paragraph = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
    }
}

/// Render the hotkey reminder footer.
fn render_key_hints(frame: &mut ratatui::Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Keys ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let hints = vec![
        Line::raw("e feed  p palette  z zoom  a autocal  n snapshot  r record"),
        Line::raw("[ ] min  - = max  , . alpha  t g c b o toggles  q quit"),
    ];
    let paragraph = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, inner);
}

/// Render the event log pane with the newest entries that fit.
fn render_event_log(frame: &mut ratatui::Frame, log: &EventLog, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Event Log ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let lines: Vec<Line> = log.tail(inner.height as usize).map(Line::raw).collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the status bar on the bottom row.
pub fn render_status_bar(
    frame: &mut ratatui::Frame,
    status_bar: &StatusBar,
    view: &ConsoleView,
    area: Rect,
) {
    let status_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };
    let status_text = status_bar.format(view.pipeline, view.feed_live, view.recording);
    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().fg(Color::Black).bg(Color::White));
    frame.render_widget(status_paragraph, status_area);
}
