//! JWT authentication for the telecare plugins.
//!
//! Trust between the platform and field gateways runs in both directions,
//! and this crate owns both halves:
//!
//! - **Outbound** ([`TokenIssuer`]): the platform signs a fresh short-lived
//!   RS256 token per relay call; gateways verify it against the platform's
//!   published key set (`/.well-known/jwks.json`).
//! - **Inbound** ([`GatewayTokenVerifier`]): calls arriving from a gateway
//!   or middleware carry a bearer token signed by the gateway's own
//!   identity provider; the verifier resolves the gateway's OpenID
//!   discovery document, fetches its JWKS through a TTL cache, and
//!   verifies the signature.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────────┐
//! │  Relay client    │─────▶│    TokenIssuer       │  platform → gateway
//! └──────────────────┘      └──────────────────────┘
//!
//! ┌──────────────────┐      ┌──────────────────────┐
//! │  API extractors  │─────▶│ GatewayTokenVerifier │  gateway → platform
//! └──────────────────┘      └──────────┬───────────┘
//!                                      │
//!                           ┌──────────▼───────────┐
//!                           │      JwksCache       │
//!                           │  (URL-keyed, 5 min)  │
//!                           └──────────┬───────────┘
//!                                      │ HTTP (5 s timeout)
//!                           ┌──────────▼───────────┐
//!                           │  gateway discovery + │
//!                           │  JWKS endpoints      │
//!                           └──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod issuer;
pub mod jwks;
pub mod verify;

pub use error::{AuthError, Result};
pub use issuer::{IssuerConfig, RelayClaims, TokenIssuer};
pub use jwks::JwksCache;
pub use verify::{AuthVariant, GatewayTokenVerifier, Principal, GATEWAY_ID_HEADER};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_keys;
