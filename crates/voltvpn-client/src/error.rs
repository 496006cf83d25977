//! Client error type.

use thiserror::Error;
use voltvpn_core::{LifecycleError, TransportError};

/// Failure of a connect/disconnect call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service could not be reached or its reply could not be parsed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered `success: false`.
    #[error("rejected by service: {message}")]
    Rejected {
        /// Message supplied by the service, verbatim.
        message: String,
    },
}

impl From<ApiError> for LifecycleError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => Self::Transport(e),
            ApiError::Rejected { message } => Self::Rejected { message },
        }
    }
}
