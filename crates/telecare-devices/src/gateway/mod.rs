//! The gateway device plugin.
//!
//! Gateways are the intermediary devices every other plugin relays
//! through; the gateway device itself has no outbound relay behavior.

pub mod handler;
pub mod schema;

pub use handler::GatewayHandler;
pub use schema::{GatewayMetadataRead, GatewayMetadataWrite};

use std::sync::Arc;

use telecare_emr::care_type;
use telecare_registry::{DeviceTypeRegistry, RegistryError};

use crate::PluginContext;

/// Register the gateway device type.
///
/// # Errors
///
/// Returns a [`RegistryError`] when the tag is already taken or the
/// registry is sealed.
pub fn register(
    registry: &mut DeviceTypeRegistry,
    ctx: &PluginContext,
) -> Result<(), RegistryError> {
    registry.register(
        care_type::GATEWAY,
        Arc::new(GatewayHandler::new(ctx.devices.clone())),
    )
}
