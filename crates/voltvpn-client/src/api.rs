//! Remote service abstraction.

use std::future::Future;

use voltvpn_core::{ConnectAck, ConnectionState, DisconnectAck, ServerDescriptor, TransportError};

use crate::ApiError;

/// Default location of the local VPN service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// The four calls of the remote VPN service.
///
/// Each method performs exactly one remote call and never retries; retry
/// policy belongs to the caller. Results are already normalized: the server
/// list is always a list, whatever shape the service used.
///
/// # Implementations
///
/// - [`crate::http::HttpVpnApi`]: HTTP via reqwest
/// - `voltvpn_harness::SimVpnApi`: in-process scripted service
pub trait VpnApi: Send + Sync + 'static {
    /// `GET /api/status`.
    fn fetch_status(&self) -> impl Future<Output = Result<ConnectionState, TransportError>> + Send;

    /// `GET /api/servers`.
    fn fetch_servers(
        &self,
    ) -> impl Future<Output = Result<Vec<ServerDescriptor>, TransportError>> + Send;

    /// `POST /api/connect/:server_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the service answers
    /// `success: false`, [`ApiError::Transport`] otherwise.
    fn connect(&self, server_id: &str) -> impl Future<Output = Result<ConnectAck, ApiError>> + Send;

    /// `POST /api/disconnect`.
    ///
    /// # Errors
    ///
    /// Same classification as [`VpnApi::connect`].
    fn disconnect(&self) -> impl Future<Output = Result<DisconnectAck, ApiError>> + Send;
}
