//! Dashboard input events.
//!
//! Events come from two sources: the user (keys, resize) through the
//! [`crate::Driver`], and the widget (store writes, phase changes,
//! notifications) through the [`crate::Runtime`].

use voltvpn_core::LifecyclePhase;

use crate::{KeyInput, Notification, StoreSnapshot};

/// Events processed by the [`crate::Dashboard`].
#[derive(Debug, Clone)]
pub enum DashboardEvent<I> {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick carrying the current time.
    Tick(I),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// The store was written.
    StoreChanged(StoreSnapshot<I>),

    /// The lifecycle phase changed.
    PhaseChanged(LifecyclePhase),

    /// A notification was raised.
    Notified(Notification<I>),
}
