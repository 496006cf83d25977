//! Server list
//!
//! One row per server in service order. The selected row is highlighted and
//! the server the tunnel terminates at is marked.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use voltvpn_app::Dashboard;
use voltvpn_core::ServerDescriptor;

const CURRENT_MARKER: &str = "● ";
const OTHER_MARKER: &str = "  ";
const NAME_WIDTH: usize = 18;
const LOCATION_WIDTH: usize = 24;

/// Columns of one server row, without markers.
pub fn row_text(server: &ServerDescriptor) -> String {
    let load = server.load.map_or_else(|| "-".to_string(), |load| load.to_string());
    let ping = server.ping.as_deref().unwrap_or("-");
    format!(
        "{:<NAME_WIDTH$} {:<LOCATION_WIDTH$} load {load:>4}  ping {ping}",
        server.name, server.location
    )
}

/// Render the server list.
pub fn render<I>(frame: &mut Frame, dashboard: &Dashboard<I>, area: Rect) {
    let snapshot = dashboard.snapshot();
    let block = Block::default().borders(Borders::ALL).title(" Servers ");

    if snapshot.servers.is_empty() {
        let empty = ListItem::new(Line::from(Span::styled(
            "No servers loaded (press s to reload)",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(List::new(vec![empty]).block(block), area);
        return;
    }

    let current = snapshot.connection.current_server_id.as_deref().filter(|_| snapshot.connection.connected);
    let items: Vec<ListItem> = snapshot
        .servers
        .iter()
        .map(|server| {
            let is_current = current == Some(server.id.as_str());
            let (marker, style) = if is_current {
                (CURRENT_MARKER, Style::default().fg(Color::Green))
            } else {
                (OTHER_MARKER, Style::default())
            };
            let flag = server.flag.as_deref().map_or_else(String::new, |f| format!("{f} "));

            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::raw(flag),
                Span::styled(row_text(server), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(dashboard.selected()));

    frame.render_stateful_widget(list, area, &mut state);
}
