//! Connection state store.
//!
//! Single source of truth for what the dashboard renders: the last connection
//! status, the last server list, and how fresh the status is. Backed by a
//! `tokio::sync::watch` channel so every reader sees whole snapshots and can
//! await changes.
//!
//! # Invariants
//!
//! - Once a status has been stored, the store never returns to the empty
//!   state. A failed refresh only changes [`Freshness`].
//! - `revision` increases by exactly one per write.
//! - Writes are last-write-wins in completion order.

use std::{fmt::Debug, sync::Arc};

use tokio::sync::watch;
use voltvpn_core::{ConnectionState, ServerDescriptor, TransportError};

/// How current the stored status is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness<I> {
    /// No status fetch has completed yet.
    Unknown,
    /// Last status fetch succeeded.
    Fresh {
        /// When the status was stored.
        at: I,
    },
    /// No status has been stored yet and fetches are failing.
    Unreachable {
        /// First failure.
        since: I,
        /// Most recent failure.
        reason: TransportError,
    },
    /// Status fetches have been failing since the last stored status.
    Stale {
        /// First failure of the current run of failures.
        since: I,
        /// Most recent failure.
        reason: TransportError,
    },
}

impl<I> Freshness<I> {
    /// True for [`Freshness::Stale`].
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// True while no status has been stored.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown | Self::Unreachable { .. })
    }

    /// Most recent fetch failure, if the last fetch failed.
    pub fn failure(&self) -> Option<&TransportError> {
        match self {
            Self::Unreachable { reason, .. } | Self::Stale { reason, .. } => Some(reason),
            Self::Unknown | Self::Fresh { .. } => None,
        }
    }
}

/// Everything the view needs, as of one store revision.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<I> {
    /// Last status reported by the service.
    pub connection: ConnectionState,
    /// Last server list, in service order.
    pub servers: Vec<ServerDescriptor>,
    /// Freshness of `connection`.
    pub freshness: Freshness<I>,
    /// Write counter.
    pub revision: u64,
}

impl<I> StoreSnapshot<I> {
    pub(crate) fn empty() -> Self {
        Self {
            connection: ConnectionState::default(),
            servers: Vec::new(),
            freshness: Freshness::Unknown,
            revision: 0,
        }
    }

    /// True until the first successful status fetch, failed fetches
    /// included.
    pub fn is_empty(&self) -> bool {
        self.freshness.is_unknown()
    }

    /// Descriptor of the server the service reports as current.
    pub fn current_server(&self) -> Option<&ServerDescriptor> {
        self.connection.current_server(&self.servers)
    }

    /// Look up a server by id.
    pub fn server(&self, id: &str) -> Option<&ServerDescriptor> {
        self.servers.iter().find(|server| server.id == id)
    }
}

/// Shared handle to the connection state store.
///
/// Cloning is cheap; all clones observe the same state. Only the poller and
/// the controller write.
#[derive(Debug)]
pub struct Store<I> {
    tx: Arc<watch::Sender<StoreSnapshot<I>>>,
}

impl<I> Clone for Store<I> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<I> Store<I>
where
    I: Copy + Debug + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(StoreSnapshot::empty());
        Self { tx: Arc::new(tx) }
    }

    /// Current snapshot.
    pub fn get(&self) -> StoreSnapshot<I> {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every write.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot<I>> {
        self.tx.subscribe()
    }

    /// Run `f` against the current snapshot without cloning it.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreSnapshot<I>) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Overwrite the connection status and mark it fresh.
    pub(crate) fn replace(&self, connection: ConnectionState, now: I) {
        self.tx.send_modify(|snapshot| {
            snapshot.connection = connection;
            snapshot.freshness = Freshness::Fresh { at: now };
            snapshot.revision += 1;
            warn_if_inconsistent(snapshot);
        });
    }

    /// Record a failed status fetch, keeping the last status.
    ///
    /// Before any status was stored this yields [`Freshness::Unreachable`],
    /// never [`Freshness::Stale`].
    pub(crate) fn mark_stale(&self, now: I, reason: TransportError) {
        self.tx.send_modify(|snapshot| {
            snapshot.freshness = match snapshot.freshness {
                Freshness::Unknown => Freshness::Unreachable { since: now, reason },
                Freshness::Unreachable { since, .. } => Freshness::Unreachable { since, reason },
                Freshness::Fresh { .. } => Freshness::Stale { since: now, reason },
                Freshness::Stale { since, .. } => Freshness::Stale { since, reason },
            };
            snapshot.revision += 1;
        });
    }

    /// Replace the server list wholesale.
    pub(crate) fn replace_servers(&self, servers: Vec<ServerDescriptor>) {
        self.tx.send_modify(|snapshot| {
            snapshot.servers = servers;
            snapshot.revision += 1;
            warn_if_inconsistent(snapshot);
        });
    }
}

fn warn_if_inconsistent<I>(snapshot: &StoreSnapshot<I>) {
    // Nothing to compare against before the first list arrives.
    if snapshot.servers.is_empty() {
        return;
    }
    if !snapshot.connection.is_consistent_with(&snapshot.servers) {
        tracing::warn!(
            server_id = ?snapshot.connection.current_server_id,
            servers = snapshot.servers.len(),
            "service reports a connection to a server missing from the list"
        );
    }
}
