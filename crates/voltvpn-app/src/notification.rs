//! Fire-and-forget notifications for the presentation layer.

use tokio::sync::broadcast;
use voltvpn_core::{Notice, Severity};

/// Buffered notifications per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 16;

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification<I> {
    /// Success or error.
    pub severity: Severity,
    /// Message to show.
    pub message: String,
    /// When it was raised.
    pub raised_at: I,
}

/// Broadcast side of the notification feed.
#[derive(Debug)]
pub(crate) struct Notifier<I> {
    tx: broadcast::Sender<Notification<I>>,
}

impl<I> Clone for Notifier<I> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<I: Clone> Notifier<I> {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Notification<I>> {
        self.tx.subscribe()
    }

    /// Emit without waiting. Nobody listening is not an error.
    pub(crate) fn emit(&self, notice: Notice, raised_at: I) {
        match notice.severity {
            Severity::Success => tracing::info!(message = %notice.message, "notification"),
            Severity::Error => tracing::warn!(message = %notice.message, "notification"),
        }

        let notification =
            Notification { severity: notice.severity, message: notice.message, raised_at };
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped, no subscribers");
        }
    }
}
