//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication.
///
/// Inbound verification collapses every failure into [`AuthError::InvalidToken`]
/// before it reaches a caller; the richer variants exist for logging and
/// for the issuer/JWKS plumbing underneath.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The presented token could not be verified. Deliberately carries no
    /// detail about which check failed.
    #[error("given token is not valid")]
    InvalidToken,

    /// The device id accompanying the token does not name a gateway.
    #[error("invalid gateway device")]
    InvalidGateway,

    /// The gateway has no endpoint address configured.
    #[error("gateway endpoint not configured")]
    GatewayNotConfigured,

    /// Signature verification rejected the token.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// Fetching a remote document (discovery or JWKS) failed.
    #[error("JWKS fetch failed: {0}")]
    JwksFetch(String),

    /// The fetched key set or discovery document is unusable.
    #[error("malformed key set: {0}")]
    MalformedKeySet(String),

    /// The configured signing key could not be loaded.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// The appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidToken
            | Self::InvalidGateway
            | Self::GatewayNotConfigured
            | Self::Rejected(_) => 401,
            Self::JwksFetch(_)
            | Self::MalformedKeySet(_)
            | Self::InvalidKey(_)
            | Self::Signing(_) => 500,
        }
    }
}
