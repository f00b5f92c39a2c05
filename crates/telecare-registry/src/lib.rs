//! Device-type registry and handler protocol.
//!
//! A device record carries a care-type tag; this crate maps tags to the
//! handler implementing that type's behavior. The registry is built once
//! during plugin initialization, sealed, and then shared read-only across
//! request workers — new device types are added by implementing
//! [`DeviceTypeHandler`] and registering, never by editing a central
//! conditional.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod handler;
pub mod registry;

pub use error::{HandlerError, RegistryError};
pub use handler::DeviceTypeHandler;
pub use registry::DeviceTypeRegistry;
