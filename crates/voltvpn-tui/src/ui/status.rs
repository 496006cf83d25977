//! Status panel
//!
//! Connection state, public IP, and what the controller is doing right now.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use voltvpn_app::{Dashboard, Freshness, StoreSnapshot};
use voltvpn_core::LifecyclePhase;

/// Headline text for the connection state.
pub fn status_line<I>(snapshot: &StoreSnapshot<I>) -> String {
    match snapshot.freshness {
        Freshness::Unknown => return "Checking VPN status…".to_string(),
        Freshness::Unreachable { .. } => return "Service unreachable".to_string(),
        Freshness::Fresh { .. } | Freshness::Stale { .. } => {},
    }
    if !snapshot.connection.connected {
        return "Not connected".to_string();
    }

    match snapshot.current_server() {
        Some(server) if server.location.is_empty() => format!("Connected to {}", server.name),
        Some(server) => format!("Connected to {} ({})", server.name, server.location),
        None => match &snapshot.connection.current_server_id {
            Some(id) => format!("Connected to {id}"),
            None => "Connected".to_string(),
        },
    }
}

/// Public IP text, with the pre-tunnel IP when it changed.
pub fn ip_line<I>(snapshot: &StoreSnapshot<I>) -> String {
    let connection = &snapshot.connection;
    let current = connection.current_ip.as_deref().unwrap_or("-");

    match connection.original_ip.as_deref() {
        Some(original) if connection.ip_changed && original != current => {
            format!("IP {current} (was {original})")
        },
        _ => format!("IP {current}"),
    }
}

/// In-flight operation or staleness, if either applies.
pub fn activity_line<I>(snapshot: &StoreSnapshot<I>, phase: &LifecyclePhase) -> Option<String> {
    match phase {
        LifecyclePhase::Connecting { server_id } => {
            let name = snapshot.server(server_id).map_or(server_id.as_str(), |s| s.name.as_str());
            Some(format!("Connecting to {name}…"))
        },
        LifecyclePhase::Disconnecting => Some("Disconnecting…".to_string()),
        LifecyclePhase::Idle => match &snapshot.freshness {
            Freshness::Unreachable { reason, .. } => Some(format!("Retrying: {reason}")),
            Freshness::Stale { reason, .. } => Some(format!("Status may be outdated: {reason}")),
            Freshness::Unknown | Freshness::Fresh { .. } => None,
        },
    }
}

/// Render the status panel.
pub fn render<I>(frame: &mut Frame, dashboard: &Dashboard<I>, area: Rect) {
    let snapshot = dashboard.snapshot();

    let headline_style = match snapshot.freshness {
        Freshness::Unknown => Style::default().fg(Color::DarkGray),
        Freshness::Unreachable { .. } => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        },
        Freshness::Fresh { .. } | Freshness::Stale { .. } if snapshot.connection.connected => {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        },
        Freshness::Fresh { .. } | Freshness::Stale { .. } => Style::default().fg(Color::Red),
    };

    let mut lines = vec![
        Line::from(Span::styled(status_line(snapshot), headline_style)),
        Line::from(Span::raw(ip_line(snapshot))),
    ];
    if let Some(activity) = activity_line(snapshot, dashboard.phase()) {
        let color = if snapshot.freshness.failure().is_some() && dashboard.phase().is_idle() {
            Color::Magenta
        } else {
            Color::Yellow
        };
        lines.push(Line::from(Span::styled(activity, Style::default().fg(color))));
    }

    let block = Block::default().borders(Borders::ALL).title(" VPN ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use voltvpn_core::{ConnectionState, ServerDescriptor, TransportError};

    use super::*;

    fn snapshot(connection: ConnectionState, freshness: Freshness<u64>) -> StoreSnapshot<u64> {
        StoreSnapshot {
            connection,
            servers: vec![
                ServerDescriptor::new("uk", "United Kingdom").with_location("London, UK"),
                ServerDescriptor::new("b", "b"),
            ],
            freshness,
            revision: 1,
        }
    }

    fn connected_to(id: &str) -> ConnectionState {
        ConnectionState {
            connected: true,
            current_server_id: Some(id.into()),
            current_ip: Some("10.8.0.4".into()),
            original_ip: Some("203.0.113.7".into()),
            ip_changed: true,
        }
    }

    #[test]
    fn headline_names_current_server() {
        let connected = snapshot(connected_to("uk"), Freshness::Fresh { at: 0 });
        insta::assert_snapshot!(status_line(&connected), @"Connected to United Kingdom (London, UK)");

        let unlisted = snapshot(connected_to("mars"), Freshness::Fresh { at: 0 });
        insta::assert_snapshot!(status_line(&unlisted), @"Connected to mars");

        let down = snapshot(ConnectionState::disconnected("203.0.113.7"), Freshness::Fresh { at: 0 });
        insta::assert_snapshot!(status_line(&down), @"Not connected");
    }

    #[test]
    fn headline_when_service_never_answered() {
        let unreachable = snapshot(ConnectionState::default(), Freshness::Unreachable {
            since: 0,
            reason: TransportError::unreachable("connection refused"),
        });

        insta::assert_snapshot!(status_line(&unreachable), @"Service unreachable");
        assert_eq!(
            activity_line(&unreachable, &LifecyclePhase::Idle).as_deref(),
            Some("Retrying: service unreachable: connection refused")
        );

        let checking = snapshot(ConnectionState::default(), Freshness::Unknown);
        insta::assert_snapshot!(status_line(&checking), @"Checking VPN status…");
    }

    #[test]
    fn ip_line_shows_original_when_changed() {
        let connected = snapshot(connected_to("uk"), Freshness::Fresh { at: 0 });
        insta::assert_snapshot!(ip_line(&connected), @"IP 10.8.0.4 (was 203.0.113.7)");

        let down = snapshot(ConnectionState::disconnected("203.0.113.7"), Freshness::Fresh { at: 0 });
        insta::assert_snapshot!(ip_line(&down), @"IP 203.0.113.7");
    }

    #[test]
    fn activity_prefers_phase_over_staleness() {
        let stale = snapshot(
            ConnectionState::disconnected("203.0.113.7"),
            Freshness::Stale { since: 0, reason: TransportError::unreachable("connection refused") },
        );

        let connecting = LifecyclePhase::Connecting { server_id: "uk".into() };
        assert_eq!(
            activity_line(&stale, &connecting).as_deref(),
            Some("Connecting to United Kingdom…")
        );
        assert_eq!(
            activity_line(&stale, &LifecyclePhase::Idle).as_deref(),
            Some("Status may be outdated: service unreachable: connection refused")
        );

        let fresh = snapshot(ConnectionState::default(), Freshness::Fresh { at: 0 });
        assert_eq!(activity_line(&fresh, &LifecyclePhase::Idle), None);
    }
}
