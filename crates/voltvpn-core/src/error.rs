//! Error types for the VoltVPN core.
//!
//! Two layers: [`TransportError`] for anything that goes wrong reaching or
//! parsing the remote service, and [`LifecycleError`] for the outcome of a
//! connect/disconnect intent. A logical refusal by the remote service is a
//! [`LifecycleError::Rejected`], never a transport error.

use std::fmt;

use thiserror::Error;

use crate::lifecycle::LifecyclePhase;

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The service could not be reached (refused, reset, timed out).
    Unreachable,
    /// The service answered with a non-2xx status and no usable body.
    Status(u16),
    /// The body could not be parsed into the expected shape.
    Malformed,
    /// The endpoint URL could not be built from the configured base.
    InvalidEndpoint,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => f.write_str("service unreachable"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Malformed => f.write_str("malformed response"),
            Self::InvalidEndpoint => f.write_str("invalid endpoint"),
        }
    }
}

/// Failure to reach the remote service or to parse its reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// Human-readable detail (underlying error text).
    pub detail: String,
}

impl TransportError {
    /// Create a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    /// Service could not be reached.
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unreachable, detail)
    }

    /// Reply body did not match the expected shape.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Malformed, detail)
    }

    /// Non-2xx status without a structured body.
    pub fn status(code: u16, detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Status(code), detail)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Errors returned by the lifecycle entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Another connect/disconnect is still in flight.
    #[error("operation already in progress ({phase})")]
    OperationInProgress {
        /// Phase that was active when the request arrived.
        phase: LifecyclePhase,
    },

    /// Quick connect was requested with an empty server list.
    #[error("no VPN servers available")]
    NoServersAvailable,

    /// Remote service answered with `success: false`.
    #[error("rejected by service: {message}")]
    Rejected {
        /// Message supplied by the remote service.
        message: String,
    },

    /// The remote call failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Settlement arrived for a phase that was not in flight.
    #[error("invalid state transition: cannot {operation} from {phase}")]
    InvalidState {
        /// Phase when the transition was attempted.
        phase: LifecyclePhase,
        /// Operation that was attempted.
        operation: &'static str,
    },
}

impl LifecycleError {
    /// True for the single-flight guard rejection, which the UI ignores.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::OperationInProgress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_includes_kind_and_detail() {
        let err = TransportError::status(502, "bad gateway");
        assert_eq!(err.to_string(), "HTTP status 502: bad gateway");
    }

    #[test]
    fn serde_errors_are_malformed() {
        let err: TransportError =
            serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind, TransportErrorKind::Malformed);
    }

    #[test]
    fn only_guard_rejection_is_in_progress() {
        assert!(LifecycleError::OperationInProgress { phase: LifecyclePhase::Disconnecting }
            .is_in_progress());
        assert!(!LifecycleError::NoServersAvailable.is_in_progress());
        assert!(!LifecycleError::Rejected { message: "server full".into() }.is_in_progress());
    }
}
