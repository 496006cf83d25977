//! Connection lifecycle state machine.
//!
//! Single-flight guard for connect/disconnect intents. Follows the action
//! pattern: the caller asks to begin an operation, performs the remote call
//! itself, then reports the [`Settlement`] and executes the returned
//! [`LifecycleAction`]s. The machine never performs I/O.
//!
//! # State Machine
//!
//! ```text
//!            begin_connect              settle (any outcome)
//!   ┌──────┐ ─────────────> ┌────────────┐ ─────────────┐
//!   │ Idle │                │ Connecting │              │
//!   └──────┘ <───────────── └────────────┘              │
//!      │ ^                                              │
//!      │ └──────────────────────────────────────────────┘
//!      │ begin_disconnect   ┌───────────────┐
//!      └──────────────────> │ Disconnecting │ ── settle ──> Idle
//!                           └───────────────┘
//! ```
//!
//! A begin call outside `Idle` fails with
//! [`LifecycleError::OperationInProgress`]; requests are rejected, never
//! queued.

use std::fmt;

use crate::error::LifecycleError;

/// Current lifecycle phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No operation in flight.
    #[default]
    Idle,
    /// Connect call in flight.
    Connecting {
        /// Server being connected to.
        server_id: String,
    },
    /// Disconnect call in flight.
    Disconnecting,
}

impl LifecyclePhase {
    /// True when no operation is in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting { server_id } => write!(f, "connecting to {server_id}"),
            Self::Disconnecting => f.write_str("disconnecting"),
        }
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// User-facing message produced by a terminal lifecycle outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl Notice {
    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    /// Notice for a quick connect against an empty server list.
    pub fn no_servers() -> Self {
        Self::error("No VPN servers available")
    }
}

/// How the remote call of an in-flight operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// `success: true`.
    Accepted {
        /// Display name of the server, when the reply or list supplied one.
        server_name: Option<String>,
    },
    /// `success: false` with the service's message.
    Rejected {
        /// Message supplied by the service.
        message: String,
    },
    /// Transport failure; the outcome at the service is unknown.
    TransportFailed,
}

/// Actions for the caller to execute after a settlement, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Fetch `/api/status` once and replace the store.
    RefreshStatus,
    /// Emit this notification.
    Notify(Notice),
}

/// Single-flight lifecycle state machine.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    phase: LifecyclePhase,
    settled: u64,
}

impl Lifecycle {
    /// Create a machine in [`LifecyclePhase::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> &LifecyclePhase {
        &self.phase
    }

    /// Number of operations settled so far.
    pub fn settled_count(&self) -> u64 {
        self.settled
    }

    /// Enter `Connecting`.
    ///
    /// # Errors
    ///
    /// - `LifecycleError::OperationInProgress` if not `Idle`
    pub fn begin_connect(&mut self, server_id: &str) -> Result<(), LifecycleError> {
        self.ensure_idle()?;
        self.phase = LifecyclePhase::Connecting { server_id: server_id.to_string() };
        Ok(())
    }

    /// Enter `Disconnecting`.
    ///
    /// # Errors
    ///
    /// - `LifecycleError::OperationInProgress` if not `Idle`
    pub fn begin_disconnect(&mut self) -> Result<(), LifecycleError> {
        self.ensure_idle()?;
        self.phase = LifecyclePhase::Disconnecting;
        Ok(())
    }

    /// Report the end of the in-flight remote call.
    ///
    /// Always returns to `Idle`, then yields exactly one
    /// [`LifecycleAction::RefreshStatus`] followed by exactly one
    /// [`LifecycleAction::Notify`].
    ///
    /// # Errors
    ///
    /// - `LifecycleError::InvalidState` if nothing is in flight
    pub fn settle(
        &mut self,
        settlement: Settlement,
    ) -> Result<Vec<LifecycleAction>, LifecycleError> {
        let phase = std::mem::take(&mut self.phase);

        let notice = match (&phase, settlement) {
            (LifecyclePhase::Idle, _) => {
                return Err(LifecycleError::InvalidState {
                    phase: LifecyclePhase::Idle,
                    operation: "settle",
                });
            },
            (LifecyclePhase::Connecting { server_id }, Settlement::Accepted { server_name }) => {
                let label = server_name.unwrap_or_else(|| server_id.clone());
                Notice::success(format!("Connected to {label}"))
            },
            (LifecyclePhase::Connecting { .. }, Settlement::Rejected { message }) => {
                Notice::error(format!("Connection failed: {message}"))
            },
            (LifecyclePhase::Connecting { .. }, Settlement::TransportFailed) => {
                Notice::error("Connection error")
            },
            (LifecyclePhase::Disconnecting, Settlement::Accepted { .. }) => {
                Notice::success("VPN disconnected")
            },
            (LifecyclePhase::Disconnecting, Settlement::Rejected { message }) => {
                Notice::error(format!("Disconnection failed: {message}"))
            },
            (LifecyclePhase::Disconnecting, Settlement::TransportFailed) => {
                Notice::error("Disconnection error")
            },
        };

        self.settled += 1;
        Ok(vec![LifecycleAction::RefreshStatus, LifecycleAction::Notify(notice)])
    }

    fn ensure_idle(&self) -> Result<(), LifecycleError> {
        if self.phase.is_idle() {
            Ok(())
        } else {
            Err(LifecycleError::OperationInProgress { phase: self.phase.clone() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_connect("uk").unwrap();

        let err = lifecycle.begin_connect("de").unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::OperationInProgress { phase: LifecyclePhase::Connecting { ref server_id } }
                if server_id == "uk"
        ));
        assert!(lifecycle.begin_disconnect().unwrap_err().is_in_progress());
    }

    #[test]
    fn settle_returns_to_idle_for_every_outcome() {
        let outcomes = [
            Settlement::Accepted { server_name: None },
            Settlement::Rejected { message: "nope".into() },
            Settlement::TransportFailed,
        ];

        for outcome in outcomes {
            let mut lifecycle = Lifecycle::new();
            lifecycle.begin_disconnect().unwrap();
            let actions = lifecycle.settle(outcome).unwrap();

            assert!(lifecycle.phase().is_idle());
            assert_eq!(actions.len(), 2);
            assert_eq!(actions[0], LifecycleAction::RefreshStatus);
            assert!(matches!(actions[1], LifecycleAction::Notify(_)));
        }
    }

    #[test]
    fn rejection_message_is_verbatim() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_connect("uk").unwrap();
        let actions = lifecycle.settle(Settlement::Rejected { message: "server full".into() });

        assert_eq!(
            actions.unwrap()[1],
            LifecycleAction::Notify(Notice::error("Connection failed: server full"))
        );
    }

    #[test]
    fn accepted_connect_falls_back_to_server_id() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_connect("jp").unwrap();
        let actions = lifecycle.settle(Settlement::Accepted { server_name: None }).unwrap();

        assert_eq!(actions[1], LifecycleAction::Notify(Notice::success("Connected to jp")));
    }

    #[test]
    fn settle_while_idle_is_invalid() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.settle(Settlement::TransportFailed).unwrap_err();

        assert!(matches!(err, LifecycleError::InvalidState { operation: "settle", .. }));
        assert_eq!(lifecycle.settled_count(), 0);
    }

    #[test]
    fn settled_count_tracks_operations() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_connect("uk").unwrap();
        lifecycle.settle(Settlement::TransportFailed).unwrap();
        lifecycle.begin_disconnect().unwrap();
        lifecycle.settle(Settlement::Accepted { server_name: None }).unwrap();

        assert_eq!(lifecycle.settled_count(), 2);
    }
}
