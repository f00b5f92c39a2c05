//! Outbound HTTP relay toward gateway devices.
//!
//! Every call the platform makes to field hardware goes through
//! [`GatewayClient`]: uniform URL construction from the gateway device's
//! metadata, a fresh platform-signed bearer token per request, a bounded
//! timeout, and every transport failure normalized into the small
//! [`RelayError`] taxonomy so callers can map outcomes to responses
//! without inspecting transport internals.
//!
//! No retries happen here — each call is at-most-once; retry policy, if
//! any, belongs to the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;

pub use client::{GatewayClient, RawResponse, RelayConfig, AUTH_HEADER_TYPE};
pub use error::{RelayError, Result};
