//! Dashboard view model.
//!
//! This module defines the [`Dashboard`] state machine, which holds what the
//! terminal renders, completely decoupled from I/O and from the controller.
//!
//! This is a pure state machine: it consumes [`crate::DashboardEvent`]s and
//! produces [`crate::DashboardAction`]s for the runtime to execute. It only
//! ever reads store snapshots; it never writes connection state.
//!
//! # Keys
//!
//! | Key            | Action                       |
//! |----------------|------------------------------|
//! | `Up` / `Down`  | move the server selection    |
//! | `Enter` / `c`  | connect to the selection     |
//! | `b`            | quick connect (least loaded) |
//! | `d`            | disconnect                   |
//! | `r`            | refresh status               |
//! | `s`            | reload server list           |
//! | `q` / `Esc`    | quit                         |
//!
//! Lifecycle keys are ignored while an operation is in flight, mirroring the
//! controller's single-flight guard.

use std::{ops::Sub, time::Duration};

use voltvpn_core::{LifecyclePhase, ServerDescriptor};

use crate::{DashboardAction, DashboardEvent, KeyInput, Notification, StoreSnapshot};

/// Notifications kept on screen at once; older ones are dropped first.
const MAX_VISIBLE_NOTIFICATIONS: usize = 5;

/// Dashboard view model.
#[derive(Debug, Clone)]
pub struct Dashboard<I> {
    /// Service base URL, for the header.
    api_url: String,
    /// Last store snapshot received.
    snapshot: StoreSnapshot<I>,
    /// Last lifecycle phase received.
    phase: LifecyclePhase,
    /// Index into `snapshot.servers`.
    selected: usize,
    /// Visible notifications, oldest first.
    notifications: Vec<Notification<I>>,
    /// How long a notification stays visible.
    notification_ttl: Duration,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
}

impl<I> Dashboard<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an empty dashboard.
    pub fn new(api_url: impl Into<String>, notification_ttl: Duration) -> Self {
        Self {
            api_url: api_url.into(),
            snapshot: StoreSnapshot::empty(),
            phase: LifecyclePhase::Idle,
            selected: 0,
            notifications: Vec::new(),
            notification_ttl,
            terminal_size: (80, 24),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: DashboardEvent<I>) -> Vec<DashboardAction> {
        match event {
            DashboardEvent::Key(key) => self.handle_key(key),
            DashboardEvent::Tick(now) => {
                let before = self.notifications.len();
                let ttl = self.notification_ttl;
                self.notifications.retain(|n| now - n.raised_at < ttl);

                if self.notifications.len() == before { vec![] } else { vec![DashboardAction::Render] }
            },
            DashboardEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![DashboardAction::Render]
            },
            DashboardEvent::StoreChanged(snapshot) => {
                let anchor = self.selected_server().map(|s| s.id.clone());
                self.snapshot = snapshot;
                self.selected = anchor
                    .and_then(|id| self.snapshot.servers.iter().position(|s| s.id == id))
                    .unwrap_or_else(|| self.selected.min(self.snapshot.servers.len().saturating_sub(1)));
                vec![DashboardAction::Render]
            },
            DashboardEvent::PhaseChanged(phase) => {
                self.phase = phase;
                vec![DashboardAction::Render]
            },
            DashboardEvent::Notified(notification) => {
                self.notifications.push(notification);
                if self.notifications.len() > MAX_VISIBLE_NOTIFICATIONS {
                    self.notifications.remove(0);
                }
                vec![DashboardAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<DashboardAction> {
        match key {
            KeyInput::Char('q') | KeyInput::Esc => vec![DashboardAction::Quit],
            KeyInput::Up => self.select(self.selected.saturating_sub(1)),
            KeyInput::Down => self.select(self.selected + 1),
            KeyInput::Home => self.select(0),
            KeyInput::End => self.select(usize::MAX),
            KeyInput::Char('r') => vec![DashboardAction::Refresh],
            KeyInput::Char('s') => vec![DashboardAction::ReloadServers],
            KeyInput::Enter | KeyInput::Char('c') if self.phase.is_idle() => {
                match self.selected_server() {
                    Some(server) => vec![DashboardAction::Connect { server_id: server.id.clone() }],
                    None => vec![],
                }
            },
            KeyInput::Char('b') if self.phase.is_idle() => vec![DashboardAction::QuickConnect],
            KeyInput::Char('d') if self.phase.is_idle() => vec![DashboardAction::Disconnect],
            KeyInput::Enter | KeyInput::Char(_) => vec![],
        }
    }

    fn select(&mut self, index: usize) -> Vec<DashboardAction> {
        let last = self.snapshot.servers.len().saturating_sub(1);
        let index = index.min(last);
        if index == self.selected {
            return vec![];
        }
        self.selected = index;
        vec![DashboardAction::Render]
    }
}

impl<I> Dashboard<I> {
    /// Service base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Last store snapshot.
    pub fn snapshot(&self) -> &StoreSnapshot<I> {
        &self.snapshot
    }

    /// Last lifecycle phase.
    pub fn phase(&self) -> &LifecyclePhase {
        &self.phase
    }

    /// Index of the selected server.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Selected server. `None` while the list is empty.
    pub fn selected_server(&self) -> Option<&ServerDescriptor> {
        self.snapshot.servers.get(self.selected)
    }

    /// Visible notifications, oldest first.
    pub fn notifications(&self) -> &[Notification<I>] {
        &self.notifications
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}
