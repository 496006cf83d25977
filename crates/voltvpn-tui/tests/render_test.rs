//! Rendering the dashboard into an in-memory terminal.

use std::time::{Duration, Instant};

use ratatui::{Terminal, backend::TestBackend};
use voltvpn_app::{Dashboard, DashboardEvent, Freshness, Notification, StoreSnapshot};
use voltvpn_core::{ConnectionState, LifecyclePhase, Severity, TransportError};
use voltvpn_harness::{ORIGINAL_IP, default_servers};
use voltvpn_tui::ui;

fn dashboard(connection: ConnectionState, freshness: Freshness<Instant>) -> Dashboard<Instant> {
    let mut dashboard = Dashboard::new("http://localhost:8080", Duration::from_secs(3));
    let _ = dashboard.handle(DashboardEvent::StoreChanged(StoreSnapshot {
        connection,
        servers: default_servers(),
        freshness,
        revision: 2,
    }));
    dashboard
}

fn connected_uk() -> ConnectionState {
    ConnectionState {
        connected: true,
        current_server_id: Some("uk".into()),
        current_ip: Some("10.8.0.4".into()),
        original_ip: Some(ORIGINAL_IP.into()),
        ip_changed: true,
    }
}

fn draw(dashboard: &Dashboard<Instant>, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui::render(frame, dashboard)).unwrap();

    let buffer = terminal.backend().buffer();
    buffer
        .content()
        .chunks(usize::from(buffer.area.width))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn connected_dashboard_shows_server_and_ip() {
    let dashboard = dashboard(connected_uk(), Freshness::Fresh { at: Instant::now() });

    let screen = draw(&dashboard, 100, 20);

    assert!(screen.contains("Connected to United Kingdom (London, UK)"));
    assert!(screen.contains("IP 10.8.0.4 (was 203.0.113.7)"));
    assert!(screen.contains("USA East Coast"));
    assert!(screen.contains("Netherlands"));
    assert!(screen.contains("●"), "current server is marked");
    assert!(screen.contains("http://localhost:8080"));
}

#[test]
fn selection_is_highlighted() {
    let mut dashboard = dashboard(ConnectionState::disconnected(ORIGINAL_IP), Freshness::Unknown);
    let _ = dashboard.handle(DashboardEvent::Key(voltvpn_app::KeyInput::Down));

    let screen = draw(&dashboard, 100, 20);

    let selected_row = screen.lines().find(|line| line.contains("> ")).unwrap();
    assert!(selected_row.contains("USA West Coast"));
    assert!(screen.contains("Checking VPN status"));
}

#[test]
fn empty_server_list_shows_hint() {
    let mut dashboard = Dashboard::new("http://localhost:8080", Duration::from_secs(3));
    let _ = dashboard.handle(DashboardEvent::StoreChanged(StoreSnapshot {
        connection: ConnectionState::disconnected(ORIGINAL_IP),
        servers: Vec::new(),
        freshness: Freshness::Fresh { at: Instant::now() },
        revision: 1,
    }));

    let screen = draw(&dashboard, 80, 16);

    assert!(screen.contains("Not connected"));
    assert!(screen.contains("No servers loaded"));
}

#[test]
fn phase_and_notifications_are_shown() {
    let mut dashboard = dashboard(ConnectionState::disconnected(ORIGINAL_IP), Freshness::Unknown);
    let _ = dashboard.handle(DashboardEvent::PhaseChanged(LifecyclePhase::Connecting {
        server_id: "de".into(),
    }));
    let _ = dashboard.handle(DashboardEvent::Notified(Notification {
        severity: Severity::Error,
        message: "Connection failed: server full".into(),
        raised_at: Instant::now(),
    }));

    let screen = draw(&dashboard, 100, 24);

    assert!(screen.contains("Connecting to Germany…"));
    assert!(screen.contains("Notifications"));
    assert!(screen.contains("Connection failed: server full"));
}

#[test]
fn stale_status_is_flagged() {
    let dashboard = dashboard(connected_uk(), Freshness::Stale {
        since: Instant::now(),
        reason: TransportError::unreachable("connection refused"),
    });

    let screen = draw(&dashboard, 100, 20);

    assert!(screen.contains("Connected to United Kingdom"), "last status is kept");
    assert!(screen.contains("Status may be outdated"));
}

#[test]
fn unreachable_service_is_not_shown_as_disconnected() {
    let dashboard = dashboard(ConnectionState::default(), Freshness::Unreachable {
        since: Instant::now(),
        reason: TransportError::unreachable("connection refused"),
    });

    let screen = draw(&dashboard, 100, 20);

    assert!(screen.contains("Service unreachable"));
    assert!(screen.contains("Retrying"));
    assert!(!screen.contains("Not connected"));
}

#[test]
fn tiny_terminal_does_not_panic() {
    let dashboard = dashboard(connected_uk(), Freshness::Fresh { at: Instant::now() });
    let _ = draw(&dashboard, 10, 3);
}
