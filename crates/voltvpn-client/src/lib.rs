//! Client
//!
//! Remote VPN service client for the VoltVPN dashboard. Wraps the four REST
//! calls of the local VPN service behind the [`VpnApi`] trait so the
//! controller can run against the real service or a simulated one.
//!
//! # Components
//!
//! - [`VpnApi`]: one method per remote call, no retries
//! - [`ApiError`]: transport failure vs. logical rejection
//!
//! # HTTP (optional)
//!
//! With the `http` feature enabled (the default), this crate also provides
//! [`http::HttpVpnApi`], a `reqwest`-based implementation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
mod error;

#[cfg(feature = "http")]
pub mod http;

pub use api::{DEFAULT_BASE_URL, VpnApi};
pub use error::ApiError;
pub use voltvpn_core::{
    ConnectAck, ConnectionState, DisconnectAck, ServerDescriptor, TransportError,
    TransportErrorKind,
};
