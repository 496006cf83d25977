//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold while the dashboard runs.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all execution paths.
//!
//! # Architecture
//!
//! Every store snapshot the dashboard renders is reduced to an
//! [`Observation`] and appended to a [`SystemSnapshot`]. Registered
//! [`Invariant`]s then check the whole history.
//!
//! # Usage
//!
//! ```ignore
//! let driver = SimDriver::new(script).with_invariants(InvariantRegistry::standard());
//! Runtime::new(driver, widget).run().await?;
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{ConnectedServerKnown, NoErasure, RevisionMonotonicity};
pub use snapshot::{Observation, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies which invariant was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantKind {
    /// A valid status was followed by the empty state.
    NoErasure,
    /// Store revisions went backwards.
    RevisionMonotonicity,
    /// Connected to a server missing from the list.
    ConnectedServerKnown,
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoErasure => "no_erasure",
            Self::RevisionMonotonicity => "revision_monotonicity",
            Self::ConnectedServerKnown => "connected_server_known",
        };
        f.write_str(name)
    }
}

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// The violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against observed history.
pub trait Invariant: Send + Sync {
    /// Which invariant this is.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant.
    ///
    /// Returns `Ok(())` if it holds, or a [`Violation`] describing what went
    /// wrong.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard invariants.
    ///
    /// Includes:
    /// - [`NoErasure`]: the store never returns to empty
    /// - [`RevisionMonotonicity`]: revisions never decrease
    /// - [`ConnectedServerKnown`]: connected implies a listed server (only
    ///   meaningful against a consistent service such as `SimVpnApi`)
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(NoErasure);
        registry.add(RevisionMonotonicity);
        registry.add(ConnectedServerKnown);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given history.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn empty_history_passes_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&SystemSnapshot::empty()).is_ok());
    }

    #[test]
    fn violation_display_names_invariant() {
        let violation =
            Violation { invariant: InvariantKind::NoErasure, message: "revision 4".into() };
        assert_eq!(violation.to_string(), "no_erasure: revision 4");
    }
}
