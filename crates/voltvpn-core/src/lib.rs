//! VoltVPN core
//!
//! Pure building blocks for the VoltVPN dashboard: the data model, the
//! normalization of the remote service's JSON replies, and the single-flight
//! lifecycle state machine.
//!
//! # Architecture
//!
//! Nothing in this crate performs I/O. The wire module turns response bodies
//! into model types, and the [`Lifecycle`] machine follows the action pattern:
//! callers feed it intents and settlements, it returns [`LifecycleAction`]s
//! for the caller to execute. Time enters only through the [`Environment`]
//! trait, so the same logic runs against the system clock and in simulation.
//!
//! # Components
//!
//! - [`ServerDescriptor`], [`ConnectionState`]: the model rendered by the view
//! - [`wire`]: status, server-list and acknowledgement parsing
//! - [`Lifecycle`]: `Idle` / `Connecting` / `Disconnecting` guard
//! - [`Environment`]: clock and sleep abstraction

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod wire;

pub use env::Environment;
pub use error::{LifecycleError, TransportError, TransportErrorKind};
pub use lifecycle::{
    Lifecycle, LifecycleAction, LifecyclePhase, Notice, Settlement, Severity,
};
pub use model::{ConnectionState, Percent, ServerDescriptor, select_least_loaded};
pub use wire::{ConnectAck, DisconnectAck, Reply};
