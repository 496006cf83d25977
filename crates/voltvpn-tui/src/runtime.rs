//! Launch
//!
//! Builds a widget over the selected service backend and runs the generic
//! [`voltvpn_app::Runtime`] with the terminal driver until the user quits.
//!
//! Supports two backends:
//! - HTTP: the local VPN service at the configured URL
//! - Simulated: an in-process service, for trying the dashboard offline

use thiserror::Error;
use voltvpn_app::{ConfigError, Runtime, SystemEnv, Widget, WidgetConfig};
use voltvpn_client::{
    TransportError, VpnApi,
    http::{HttpConfig, HttpVpnApi},
};
use voltvpn_harness::SimVpnApi;

use crate::{TerminalDriver, TerminalError};

/// Launch errors.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Invalid widget configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built for the configured URL.
    #[error("cannot use API URL: {0}")]
    Endpoint(#[from] TransportError),

    /// Terminal setup, input or rendering failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] TerminalError),
}

/// Which VPN service the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The service at `WidgetConfig::api_url`.
    Http,
    /// In-process simulated service.
    Simulated,
}

/// Build the HTTP client settings for a widget configuration.
pub fn http_config(config: &WidgetConfig) -> HttpConfig {
    HttpConfig { base_url: config.api_url.clone(), request_timeout: config.request_timeout }
}

/// Run the dashboard until the user quits.
///
/// # Errors
///
/// Fails before touching the terminal on an invalid configuration or URL,
/// afterwards only on terminal I/O errors. Service failures never end the
/// run; they show up in the dashboard.
pub async fn run(config: WidgetConfig, backend: Backend) -> Result<(), LaunchError> {
    match backend {
        Backend::Http => {
            let api = HttpVpnApi::with_config(http_config(&config))?;
            drive(api, config).await
        },
        Backend::Simulated => drive(SimVpnApi::new(), config).await,
    }
}

async fn drive<A: VpnApi>(api: A, config: WidgetConfig) -> Result<(), LaunchError> {
    let widget = Widget::new(api, SystemEnv, config)?;
    tracing::info!(
        api_url = %widget.config().api_url,
        poll_interval = ?widget.config().poll_interval,
        "dashboard starting"
    );

    let driver = TerminalDriver::new()?;
    Runtime::new(driver, widget).run().await?;

    tracing::info!("dashboard stopped");
    Ok(())
}
