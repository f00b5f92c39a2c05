//! Core types for the telecare peripheral-device plugins.
//!
//! This crate provides the foundational types shared by every plugin crate:
//!
//! - **Identifiers**: strongly-typed UUID newtypes for devices, locations,
//!   organizations, users, presets, encounters and diagnostic reports
//! - **Endpoint validation**: syntactic validation of gateway/device
//!   host strings
//! - **Validation errors**: the field-keyed error object every metadata
//!   schema reports through
//!
//! # Example
//!
//! ```
//! use telecare_core::{validate_endpoint_address, DeviceId, ValidationError};
//!
//! let host = validate_endpoint_address("gateway.local").unwrap();
//! assert_eq!(host, "gateway.local");
//!
//! let id = DeviceId::generate();
//! assert_eq!(id, id.to_string().parse().unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod endpoint;
pub mod ids;
pub mod validation;

pub use endpoint::{validate_endpoint_address, EndpointError};
pub use ids::{
    DeviceId, EncounterId, IdError, LocationId, OrganizationId, PresetId, ReportId, UserId,
};
pub use validation::ValidationError;
