//! VoltVPN TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Local service on the default port
//! voltvpn-tui
//!
//! # Another service, polled every 10 seconds
//! voltvpn-tui --api-url http://10.0.0.2:8080 --poll-interval 10
//!
//! # In-process simulated service
//! voltvpn-tui --simulate
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use voltvpn_app::{DEFAULT_NOTIFICATION_TTL, WidgetConfig};
use voltvpn_client::DEFAULT_BASE_URL;
use voltvpn_tui::{Backend, logging};

/// VoltVPN terminal dashboard
#[derive(Parser, Debug)]
#[command(name = "voltvpn-tui")]
#[command(about = "Terminal dashboard for the local VPN service")]
#[command(version)]
struct Args {
    /// Base URL of the VPN service
    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Status polling interval in seconds (1-300)
    #[arg(short, long, default_value = "5")]
    poll_interval: u64,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, default_value = "10")]
    request_timeout: u64,

    /// Fetch the status once at start instead of polling
    #[arg(long)]
    no_auto_refresh: bool,

    /// Run against an in-process simulated service
    #[arg(long)]
    simulate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file (the terminal is taken over by the dashboard)
    #[arg(long, default_value = "voltvpn-tui.log")]
    log_file: PathBuf,
}

impl Args {
    fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            api_url: self.api_url.clone(),
            poll_interval: Duration::from_secs(self.poll_interval),
            request_timeout: (self.request_timeout > 0)
                .then(|| Duration::from_secs(self.request_timeout)),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            auto_refresh: !self.no_auto_refresh,
        }
    }

    fn backend(&self) -> Backend {
        if self.simulate { Backend::Simulated } else { Backend::Http }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(&args.log_level, &args.log_file)?;

    Ok(voltvpn_tui::run(args.widget_config(), args.backend()).await?)
}
