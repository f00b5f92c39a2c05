//! HTTP surface for the telecare peripheral-device plugins.
//!
//! This crate wires the registry, relay, auth and device plugins into an
//! axum application:
//!
//! - generic device dispatch endpoints (create/update/retrieve/list and
//!   named actions routed through the device-type registry)
//! - camera action, position preset, and lab-analyzer action endpoints
//! - the middleware-authenticated automated-observation surface
//! - the platform's published JWKS discovery document
//! - the daily orphaned-preset cleanup task
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 host EMR front-end / gateways               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        telecare-api                         │
//! │  ┌────────────┐ ┌────────────┐ ┌─────────────────────────┐  │
//! │  │ Extractors │ │  Router    │ │  Error mapping          │  │
//! │  │ (user/gw)  │ │ + handlers │ │  (typed → HTTP)         │  │
//! │  └────────────┘ └────────────┘ └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!            │              │               │
//!            ▼              ▼               ▼
//!     ┌──────────┐   ┌────────────┐  ┌────────────┐
//!     │ Registry │   │   Relay    │  │    Auth    │
//!     │+ plugins │   │  client    │  │ (JWT/JWKS) │
//!     └──────────┘   └────────────┘  └────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tasks;

#[cfg(test)]
mod test_support;

pub use config::ApiConfig;
pub use error::ApiError;
pub use extract::{CurrentUser, GatewayAuth, MiddlewareAuth, REMOTE_USER_HEADER};
pub use routes::create_router;
pub use state::{ApiState, HostBackends};
