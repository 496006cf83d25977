//! HTTP transport for the client.
//!
//! Provides [`HttpVpnApi`], a thin reqwest layer that sends the four REST
//! calls and hands the raw bodies to [`voltvpn_core::wire`]. All JSON
//! interpretation stays in the core crate.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use voltvpn_core::{
    ConnectAck, ConnectionState, DisconnectAck, Reply, ServerDescriptor, TransportError,
    TransportErrorKind, wire,
};

use crate::{ApiError, DEFAULT_BASE_URL, VpnApi};

/// Longest body excerpt carried in a status error.
const BODY_EXCERPT_LEN: usize = 200;

const USER_AGENT: &str = concat!("voltvpn/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Service base URL. A trailing `/api` segment is accepted and not
    /// duplicated.
    pub base_url: String,
    /// Per-request timeout. `None` leaves timing to the OS.
    pub request_timeout: Option<Duration>,
}

impl HttpConfig {
    /// Configuration with the given base URL and no timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), request_timeout: None }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Status and body of a completed exchange.
struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    fn status_error(&self) -> TransportError {
        let excerpt: String =
            String::from_utf8_lossy(&self.body).chars().take(BODY_EXCERPT_LEN).collect();
        TransportError::status(self.status.as_u16(), excerpt)
    }

    fn ensure_success(self) -> Result<Self, TransportError> {
        if self.status.is_success() { Ok(self) } else { Err(self.status_error()) }
    }
}

/// [`VpnApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpVpnApi {
    http: reqwest::Client,
    base: Url,
    /// Base URL already ends in `/api`.
    api_in_base: bool,
}

impl HttpVpnApi {
    /// Client for the given base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns `TransportErrorKind::InvalidEndpoint` if the URL cannot be
    /// parsed or cannot carry a path.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_config(HttpConfig::new(base_url))
    }

    /// Client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`HttpVpnApi::new`], or if the HTTP client cannot be built.
    pub fn with_config(config: HttpConfig) -> Result<Self, TransportError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            TransportError::new(TransportErrorKind::InvalidEndpoint, format!("{}: {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(TransportError::new(
                TransportErrorKind::InvalidEndpoint,
                format!("{} cannot be used as a base URL", config.base_url),
            ));
        }
        let api_in_base =
            base.path_segments().and_then(|mut s| s.rfind(|seg| !seg.is_empty())) == Some("api");

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::InvalidEndpoint, e.to_string()))?;

        Ok(Self { http, base, api_in_base })
    }

    /// Configured base URL.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Build `<base>/api/<segments..>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                TransportError::new(TransportErrorKind::InvalidEndpoint, "base URL cannot carry a path")
            })?;
            path.pop_if_empty();
            if !self.api_in_base {
                path.push("api");
            }
            path.extend(segments);
        }
        Ok(url)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<RawResponse, TransportError> {
        let response =
            request.send().await.map_err(|e| TransportError::unreachable(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::unreachable(format!("reading body: {e}")))?
            .to_vec();

        tracing::debug!(%status, bytes = body.len(), "service replied");
        Ok(RawResponse { status, body })
    }
}

impl VpnApi for HttpVpnApi {
    async fn fetch_status(&self) -> Result<ConnectionState, TransportError> {
        let url = self.endpoint(&["status"])?;
        tracing::debug!(%url, "fetching status");

        let raw = self.execute(self.http.get(url)).await?.ensure_success()?;
        wire::parse_status(&raw.body)
    }

    async fn fetch_servers(&self) -> Result<Vec<ServerDescriptor>, TransportError> {
        let url = self.endpoint(&["servers"])?;
        tracing::debug!(%url, "fetching servers");

        let raw = self.execute(self.http.get(url)).await?.ensure_success()?;
        wire::parse_servers(&raw.body)
    }

    async fn connect(&self, server_id: &str) -> Result<ConnectAck, ApiError> {
        let url = self.endpoint(&["connect", server_id])?;
        tracing::debug!(%url, "requesting connect");

        let raw = self.execute(self.http.post(url)).await?;

        // The service pairs rejections with 4xx/5xx statuses, so the body
        // decides before the status does.
        match wire::parse_connect(&raw.body, server_id) {
            Ok(Reply::Rejected { message }) => Err(ApiError::Rejected { message }),
            Ok(Reply::Accepted(ack)) if raw.status.is_success() => Ok(ack),
            Ok(Reply::Accepted(_)) => Err(raw.status_error().into()),
            Err(e) if raw.status.is_success() => Err(e.into()),
            Err(_) => Err(raw.status_error().into()),
        }
    }

    async fn disconnect(&self) -> Result<DisconnectAck, ApiError> {
        let url = self.endpoint(&["disconnect"])?;
        tracing::debug!(%url, "requesting disconnect");

        let raw = self.execute(self.http.post(url)).await?;

        match wire::parse_disconnect(&raw.body) {
            Ok(Reply::Rejected { message }) => Err(ApiError::Rejected { message }),
            Ok(Reply::Accepted(ack)) if raw.status.is_success() => Ok(ack),
            Ok(Reply::Accepted(_)) => Err(raw.status_error().into()),
            Err(e) if raw.status.is_success() => Err(e.into()),
            Err(_) => Err(raw.status_error().into()),
        }
    }
}
