//! Gateway/device endpoint address validation.
//!
//! An endpoint address is the host part of a URL the platform will dial:
//! an IPv4 literal, an IPv6 literal, or a bare hostname. Validation is
//! purely syntactic; no DNS resolution is performed.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Errors produced by [`validate_endpoint_address`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// The value contains a URI scheme marker (`://`).
    #[error("URL schemes are not allowed in hostname")]
    SchemeNotAllowed,

    /// The value contains a character outside the allowed hostname set.
    #[error("hostname may only contain alphanumeric characters, '-', '_', '.' and ':'")]
    InvalidCharacter,
}

/// Validate and canonicalize an endpoint address.
///
/// IPv4 and IPv6 literals are returned in their canonical textual form
/// (IPv6 literals come back compressed and lowercased). Anything else is
/// treated as a hostname and returned unchanged if it contains no scheme
/// marker and only allowed characters.
///
/// # Errors
///
/// Returns [`EndpointError`] if the value is neither an IP literal nor a
/// well-formed hostname.
pub fn validate_endpoint_address(value: &str) -> Result<String, EndpointError> {
    if let Ok(addr) = value.parse::<Ipv4Addr>() {
        return Ok(addr.to_string());
    }
    if let Ok(addr) = value.parse::<Ipv6Addr>() {
        return Ok(addr.to_string());
    }

    if value.contains("://") {
        return Err(EndpointError::SchemeNotAllowed);
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        return Err(EndpointError::InvalidCharacter);
    }

    Ok(value.to_string())
}
