//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// The store never returns to the empty state.
///
/// Once a status fetch has succeeded, every later observation carries a
/// status. Failed refreshes may only mark it stale.
pub struct NoErasure;

impl Invariant for NoErasure {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoErasure
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(first_valid) = state.observations.iter().position(|o| !o.empty) else {
            return Ok(());
        };

        if let Some(erased) = state.observations[first_valid..].iter().find(|o| o.empty) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "revision {} is empty after revision {} held a status",
                    erased.revision, state.observations[first_valid].revision
                ),
            });
        }
        Ok(())
    }
}

/// Store revisions never decrease.
///
/// Observations are made in render order; a smaller revision after a larger
/// one means a stale snapshot overwrote a newer one on screen.
pub struct RevisionMonotonicity;

impl Invariant for RevisionMonotonicity {
    fn kind(&self) -> InvariantKind {
        InvariantKind::RevisionMonotonicity
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for window in state.observations.windows(2) {
            if window[1].revision < window[0].revision {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "revision decreased {} → {}",
                        window[0].revision, window[1].revision
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A connected status names a server from the list.
///
/// Advisory in production, where the remote service is authoritative. A
/// consistent simulated service must never violate it.
pub struct ConnectedServerKnown;

impl Invariant for ConnectedServerKnown {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ConnectedServerKnown
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(latest) = state.latest() else { return Ok(()) };
        if !latest.connected || latest.server_ids.is_empty() {
            return Ok(());
        }

        let known = latest
            .current_server_id
            .as_ref()
            .is_some_and(|id| latest.server_ids.contains(id));
        if known {
            Ok(())
        } else {
            Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "revision {}: connected to {:?}, not in {:?}",
                    latest.revision, latest.current_server_id, latest.server_ids
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::Observation;

    fn observed(revision: u64, empty: bool) -> Observation {
        Observation { revision, empty, ..Observation::default() }
    }

    #[test]
    fn erasure_after_valid_status_is_detected() {
        let history =
            SystemSnapshot::from_observations(vec![observed(0, true), observed(1, false), observed(2, true)]);

        let violation = NoErasure.check(&history).unwrap_err();
        assert_eq!(violation.invariant, InvariantKind::NoErasure);
    }

    #[test]
    fn empty_before_first_status_is_fine() {
        let history = SystemSnapshot::from_observations(vec![observed(0, true), observed(1, true)]);
        assert!(NoErasure.check(&history).is_ok());
    }

    #[test]
    fn decreasing_revision_is_detected() {
        let history = SystemSnapshot::from_observations(vec![observed(3, false), observed(2, false)]);
        assert!(RevisionMonotonicity.check(&history).is_err());
    }

    #[test]
    fn unknown_connected_server_is_detected() {
        let history = SystemSnapshot::from_observations(vec![Observation {
            revision: 1,
            connected: true,
            current_server_id: Some("mars".into()),
            server_ids: vec!["uk".into()],
            ..Observation::default()
        }]);

        assert!(ConnectedServerKnown.check(&history).is_err());
    }

    #[test]
    fn connected_before_list_loads_is_not_judged() {
        let history = SystemSnapshot::from_observations(vec![Observation {
            connected: true,
            current_server_id: Some("uk".into()),
            ..Observation::default()
        }]);

        assert!(ConnectedServerKnown.check(&history).is_ok());
    }
}
