//! Lifecycle behavior of a widget against the simulated service.

use std::time::Duration;

use voltvpn_app::{SystemEnv, Widget, WidgetConfig};
use voltvpn_core::{LifecycleError, LifecyclePhase, Severity, TransportErrorKind};
use voltvpn_harness::SimVpnApi;

/// Started widget without a poller, so status calls come only from the
/// controller.
async fn started(api: &SimVpnApi) -> Widget<SimVpnApi, SystemEnv> {
    let config = WidgetConfig { auto_refresh: false, ..WidgetConfig::default() };
    let mut widget = Widget::new(api.clone(), SystemEnv, config).unwrap();
    widget.start().await;
    widget
}

#[tokio::test]
async fn start_loads_servers_and_status_once() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;

    let calls = api.calls();
    assert_eq!((calls.servers, calls.status), (1, 1));
    assert!(!widget.is_polling());

    let snapshot = widget.snapshot();
    assert_eq!(snapshot.servers.len(), 6);
    assert!(!snapshot.is_empty());
    assert!(!snapshot.connection.connected);
}

#[tokio::test]
async fn second_connect_while_first_in_flight_is_rejected() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut notes = widget.notifications();

    api.hold();
    let controller = widget.controller().clone();
    let first = tokio::spawn(async move { controller.connect("uk").await });
    api.wait_parked(1).await;

    let err = widget.connect("de").await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::OperationInProgress { phase: LifecyclePhase::Connecting { ref server_id } }
            if server_id == "uk"
    ));
    assert_eq!(api.calls().connect, 1);
    assert!(notes.try_recv().is_err(), "guard rejection must not notify");

    api.release();
    first.await.unwrap().unwrap();

    assert_eq!(api.calls().connect, 1);
    assert_eq!(notes.recv().await.unwrap().message, "Connected to United Kingdom");
}

#[tokio::test]
async fn disconnect_while_connecting_is_rejected() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;

    api.hold();
    let controller = widget.controller().clone();
    let first = tokio::spawn(async move { controller.connect("nl").await });
    api.wait_parked(1).await;

    assert!(widget.disconnect().await.unwrap_err().is_in_progress());
    assert!(widget.quick_connect().await.unwrap_err().is_in_progress());
    assert_eq!(api.calls().disconnect, 0);

    api.release();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn quick_connect_picks_first_least_loaded() {
    let api = SimVpnApi::with_loads(&[30.0, 10.0, 10.0]);
    let widget = started(&api).await;

    widget.quick_connect().await.unwrap();

    assert_eq!(api.connection().current_server_id.as_deref(), Some("b"));
    assert_eq!(widget.snapshot().connection.current_server_id.as_deref(), Some("b"));
}

#[tokio::test]
async fn quick_connect_with_no_servers_notifies_and_skips_call() {
    let api = SimVpnApi::with_servers(Vec::new());
    let widget = started(&api).await;
    let mut notes = widget.notifications();

    let err = widget.quick_connect().await.unwrap_err();

    assert_eq!(err, LifecycleError::NoServersAvailable);
    assert_eq!(api.calls().connect, 0);
    let note = notes.recv().await.unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert_eq!(note.message, "No VPN servers available");
}

#[tokio::test]
async fn every_outcome_returns_to_idle_with_one_refresh() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;

    type Scenario = (&'static str, fn(&SimVpnApi));
    let scenarios: [Scenario; 3] = [
        ("accepted", |_| {}),
        ("rejected", |api| {
            api.reject_next_connect("server full");
            api.reject_next_disconnect("busy");
        }),
        ("transport", |api| api.set_reachable(false)),
    ];

    for (label, arrange) in scenarios {
        api.set_reachable(true);
        arrange(&api);

        let before = api.calls().status;
        let _ = widget.connect("uk").await;
        assert!(widget.phase().is_idle(), "{label}: connect left phase busy");
        assert_eq!(api.calls().status, before + 1, "{label}: connect refreshes once");

        let before = api.calls().status;
        let _ = widget.disconnect().await;
        assert!(widget.phase().is_idle(), "{label}: disconnect left phase busy");
        assert_eq!(api.calls().status, before + 1, "{label}: disconnect refreshes once");
    }
}

#[tokio::test]
async fn successful_disconnect_clears_connection() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut notes = widget.notifications();

    widget.connect("jp").await.unwrap();
    assert!(widget.snapshot().connection.connected);

    widget.disconnect().await.unwrap();

    let connection = widget.snapshot().connection;
    assert!(!connection.connected);
    assert_eq!(connection.current_server_id, None);
    assert_eq!(notes.recv().await.unwrap().message, "Connected to Japan");
    assert_eq!(notes.recv().await.unwrap().message, "VPN disconnected");
}

#[tokio::test]
async fn rejection_message_is_shown_verbatim() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut notes = widget.notifications();
    let before = widget.snapshot();

    api.reject_next_connect("server full");
    let err = widget.connect("uk").await.unwrap_err();

    assert_eq!(err, LifecycleError::Rejected { message: "server full".into() });
    let note = notes.recv().await.unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert_eq!(note.message, "Connection failed: server full");

    // Only the post-settlement refresh wrote, and it saw the same status.
    let after = widget.snapshot();
    assert_eq!(after.revision, before.revision + 1);
    assert_eq!(after.connection, before.connection);
}

#[tokio::test]
async fn service_rejections_are_surfaced() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut notes = widget.notifications();

    let err = widget.disconnect().await.unwrap_err();
    assert_eq!(err, LifecycleError::Rejected { message: "Not connected".into() });
    assert_eq!(notes.recv().await.unwrap().message, "Disconnection failed: Not connected");

    let _ = widget.connect("mars").await;
    assert_eq!(notes.recv().await.unwrap().message, "Connection failed: Server mars not available");
}

#[tokio::test]
async fn transport_failures_use_generic_messages() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut notes = widget.notifications();

    api.set_reachable(false);

    let err = widget.connect("uk").await.unwrap_err();
    assert!(matches!(err, LifecycleError::Transport(ref e) if e.kind == TransportErrorKind::Unreachable));
    assert_eq!(notes.recv().await.unwrap().message, "Connection error");

    let _ = widget.disconnect().await;
    assert_eq!(notes.recv().await.unwrap().message, "Disconnection error");

    // Refreshes failed too: stale, but the last status is kept.
    let snapshot = widget.snapshot();
    assert!(snapshot.freshness.is_stale());
    assert!(!snapshot.is_empty());
}

#[tokio::test]
async fn failed_server_reload_keeps_previous_list() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;

    api.fail_servers(1);
    assert!(widget.reload_servers().await.is_err());
    assert_eq!(widget.snapshot().servers.len(), 6);

    api.set_servers(Vec::new());
    widget.reload_servers().await.unwrap();
    assert!(widget.snapshot().servers.is_empty());
}

#[tokio::test]
async fn phase_receiver_observes_transitions() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut phases = widget.subscribe_phase();

    api.hold();
    let controller = widget.controller().clone();
    let call = tokio::spawn(async move { controller.disconnect().await });
    api.wait_parked(1).await;

    phases.changed().await.unwrap();
    assert_eq!(*phases.borrow_and_update(), LifecyclePhase::Disconnecting);

    api.release();
    let _ = call.await.unwrap();
    assert_eq!(*phases.borrow_and_update(), LifecyclePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn abandoned_connect_still_settles() {
    let api = SimVpnApi::new();
    let widget = started(&api).await;
    let mut notes = widget.notifications();
    let mut phases = widget.subscribe_phase();

    api.hold();
    let abandoned = tokio::time::timeout(Duration::from_millis(50), widget.connect("uk")).await;
    assert!(abandoned.is_err());
    assert_eq!(widget.phase(), LifecyclePhase::Connecting { server_id: "uk".into() });

    api.release();
    phases.wait_for(LifecyclePhase::is_idle).await.unwrap();
    assert_eq!(notes.recv().await.unwrap().message, "Connected to United Kingdom");
    assert_eq!(api.calls().connect, 1);

    // Guard is free again.
    widget.disconnect().await.unwrap();
    assert!(!widget.snapshot().connection.connected);
}
