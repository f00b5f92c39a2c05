//! Relay error taxonomy.
//!
//! All distinct, all distinguishable by the caller. Display strings are
//! what clients see; transport detail goes to the logs only.

use thiserror::Error;

/// A result type using `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure modes of a relay call.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required gateway metadata field is absent.
    #[error("gateway {0} not configured")]
    NotConfigured(&'static str),

    /// The gateway did not answer within the configured timeout.
    #[error("gateway request timed out after {seconds} seconds")]
    Timeout {
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// Connection refused, DNS failure, TLS failure.
    #[error("failed to connect to gateway device")]
    Unreachable(String),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected request with status {status}")]
    UpstreamError {
        /// Upstream HTTP status.
        status: u16,
        /// Upstream response body, verbatim.
        body: String,
    },

    /// The gateway answered 2xx but the body was not valid JSON.
    #[error("invalid JSON response from gateway device")]
    InvalidResponse,

    /// Anything unexpected. Logged with full detail, sanitized outward.
    #[error("an unexpected error occurred during gateway request")]
    Internal(String),
}

impl RelayError {
    /// The appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotConfigured(_) => 400,
            Self::Timeout { .. } => 504,
            Self::Unreachable(_) => 503,
            Self::UpstreamError { .. } | Self::InvalidResponse => 502,
            Self::Internal(_) => 500,
        }
    }
}
