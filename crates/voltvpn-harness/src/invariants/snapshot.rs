//! Observable state history for invariant checking.
//!
//! Observations capture what the store held at the moment it was rendered.
//! Invariants operate on the recorded history rather than live state so that
//! properties spanning several writes (no erasure, monotonic revisions) can
//! be checked.

use voltvpn_app::StoreSnapshot;

/// What one store snapshot showed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// Store revision.
    pub revision: u64,
    /// No status had been stored yet.
    pub empty: bool,
    /// Connection flag.
    pub connected: bool,
    /// Current server id.
    pub current_server_id: Option<String>,
    /// Ids of the listed servers, in order.
    pub server_ids: Vec<String>,
}

impl Observation {
    /// Reduce a store snapshot to an observation.
    pub fn from_store<I>(snapshot: &StoreSnapshot<I>) -> Self {
        Self {
            revision: snapshot.revision,
            empty: snapshot.is_empty(),
            connected: snapshot.connection.connected,
            current_server_id: snapshot.connection.current_server_id.clone(),
            server_ids: snapshot.servers.iter().map(|s| s.id.clone()).collect(),
        }
    }
}

/// Ordered history of observations.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Observations in the order they were made.
    pub observations: Vec<Observation>,
}

impl SystemSnapshot {
    /// Create an empty history.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a history from observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Append an observation.
    pub fn record(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }
}
