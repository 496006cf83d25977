//! Deterministic simulation harness for the VoltVPN dashboard.
//!
//! In-process implementations of the service and driver traits, so the
//! production widget and runtime can be exercised without a network or a
//! terminal. Run under tokio's paused clock for reproducible timing.
//!
//! # Components
//!
//! - [`SimVpnApi`]: scripted VPN service with call counters, failure
//!   injection and gates that hold lifecycle calls in flight
//! - [`SimDriver`]: scripted input, recorded renders
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties over the history of
//! rendered store snapshots. Use [`InvariantRegistry::standard()`] for the
//! common set.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod sim_api;
pub mod sim_driver;

pub use invariants::{
    ConnectedServerKnown, Invariant, InvariantKind, InvariantRegistry, InvariantResult,
    NoErasure, Observation, RevisionMonotonicity, SystemSnapshot, Violation,
};
pub use sim_api::{CallCounts, ORIGINAL_IP, SimVpnApi, default_servers};
pub use sim_driver::{RenderedFrame, SimDriver, SimDriverError, SimInput, SimRecorder};
