//! Notification area
//!
//! Most recent notifications, oldest first. Hidden when there are none.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use voltvpn_app::Dashboard;
use voltvpn_core::Severity;

const BORDER_SIZE: u16 = 2;

/// Rows the area needs for the current notifications, borders included.
pub fn height<I>(dashboard: &Dashboard<I>) -> u16 {
    match dashboard.notifications().len() {
        0 => 0,
        n => n as u16 + BORDER_SIZE,
    }
}

/// Render the notification area.
pub fn render<I>(frame: &mut Frame, dashboard: &Dashboard<I>, area: Rect) {
    if area.height == 0 {
        return;
    }

    let items: Vec<ListItem> = dashboard
        .notifications()
        .iter()
        .map(|notification| {
            let (mark, color) = match notification.severity {
                Severity::Success => ("✓ ", Color::Green),
                Severity::Error => ("✗ ", Color::Red),
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(notification.message.clone()),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Notifications ");
    frame.render_widget(List::new(items).block(block), area);
}
