//! UI rendering
//!
//! Rendering functions that convert dashboard state into terminal output
//! using ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

pub mod notifications;
pub mod servers;
pub mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use voltvpn_app::Dashboard;

const KEY_HINTS: &str =
    " ↑/↓ select  enter connect  b quick connect  d disconnect  r refresh  s reload  q quit";

/// Render the entire UI.
pub fn render<I>(frame: &mut Frame, dashboard: &Dashboard<I>) {
    const STATUS_HEIGHT: u16 = 5;
    const SERVERS_MIN_HEIGHT: u16 = 4;
    const HELP_HEIGHT: u16 = 1;

    let notifications_height = notifications::height(dashboard);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Min(SERVERS_MIN_HEIGHT),
            Constraint::Length(notifications_height),
            Constraint::Length(HELP_HEIGHT),
        ])
        .split(frame.area());

    let [status_area, servers_area, notifications_area, help_area] = chunks.as_ref() else {
        return;
    };

    status::render(frame, dashboard, *status_area);
    servers::render(frame, dashboard, *servers_area);
    notifications::render(frame, dashboard, *notifications_area);
    render_help(frame, dashboard, *help_area);
}

/// Key hints and the service URL.
fn render_help<I>(frame: &mut Frame, dashboard: &Dashboard<I>, area: ratatui::layout::Rect) {
    let line = Line::from(vec![
        Span::raw(KEY_HINTS),
        Span::styled(format!("  [{}]", dashboard.api_url()), Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}
