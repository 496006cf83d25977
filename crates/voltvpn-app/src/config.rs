//! Widget configuration.

use std::time::Duration;

use thiserror::Error;
use voltvpn_client::DEFAULT_BASE_URL;

/// Default status polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest accepted polling cadence.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Longest accepted polling cadence.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Default per-request timeout for the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a notification stays on screen.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Invalid widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Poll interval outside `[MIN_POLL_INTERVAL, MAX_POLL_INTERVAL]`.
    #[error("poll interval {interval:?} outside {min:?}..={max:?}")]
    PollIntervalOutOfRange {
        /// Requested interval.
        interval: Duration,
        /// Lower bound.
        min: Duration,
        /// Upper bound.
        max: Duration,
    },

    /// API URL is empty.
    #[error("API URL must not be empty")]
    EmptyApiUrl,

    /// A duration that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Base URL of the VPN service.
    pub api_url: String,
    /// Status polling cadence.
    pub poll_interval: Duration,
    /// Per-request timeout. `None` disables it.
    pub request_timeout: Option<Duration>,
    /// Lifetime of a notification in the dashboard.
    pub notification_ttl: Duration,
    /// Start the status poller with the widget. When off, status is fetched
    /// once at start and then only on demand.
    pub auto_refresh: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            auto_refresh: true,
        }
    }
}

impl WidgetConfig {
    /// Check bounds.
    ///
    /// # Errors
    ///
    /// - `ConfigError::PollIntervalOutOfRange` for a cadence outside 1-300 s
    /// - `ConfigError::EmptyApiUrl` for a blank URL
    /// - `ConfigError::ZeroDuration` for a zero timeout or notification TTL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&self.poll_interval) {
            return Err(ConfigError::PollIntervalOutOfRange {
                interval: self.poll_interval,
                min: MIN_POLL_INTERVAL,
                max: MAX_POLL_INTERVAL,
            });
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration { field: "request_timeout" });
        }
        if self.notification_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration { field: "notification_ttl" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = WidgetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn poll_interval_bounds_are_inclusive() {
        for secs in [1, 300] {
            let config =
                WidgetConfig { poll_interval: Duration::from_secs(secs), ..Default::default() };
            assert!(config.validate().is_ok(), "{secs}s should be accepted");
        }

        for interval in [Duration::from_millis(999), Duration::from_secs(301)] {
            let config = WidgetConfig { poll_interval: interval, ..Default::default() };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::PollIntervalOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn blank_url_is_rejected() {
        let config = WidgetConfig { api_url: "  ".into(), ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::EmptyApiUrl));
    }

    #[test]
    fn zero_durations_are_rejected() {
        let config = WidgetConfig { request_timeout: Some(Duration::ZERO), ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration { field: "request_timeout" }));

        let config = WidgetConfig { request_timeout: None, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = WidgetConfig { notification_ttl: Duration::ZERO, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration { field: "notification_ttl" }));
    }
}
