//! The lab-analyzer device plugin.
//!
//! Analyzers speak HL7v2 over IP behind a gateway. Besides the relay
//! actions, the plugin subscribes to specimen-collection events and
//! forwards test orders to the analyzer automatically.

pub mod actions;
pub mod handler;
pub mod orders;
pub mod schema;

pub use actions::LabAnalyzerActions;
pub use handler::LabAnalyzerHandler;
pub use orders::OrderForwarder;
pub use schema::{LabAnalyzerConnectionType, LabAnalyzerMetadataRead, LabAnalyzerMetadataWrite};

use std::sync::Arc;

use telecare_core::ValidationError;
use telecare_emr::{care_type, Device, Metadata};
use telecare_registry::{DeviceTypeRegistry, RegistryError};

use crate::PluginContext;

/// Register the lab-analyzer device type.
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
        care_type::LAB_ANALYZER,
        Arc::new(LabAnalyzerHandler::new(ctx.devices.clone())),
    )
}

/// Build the base gateway request payload from analyzer metadata.
///
/// Every relay action requires `endpoint_address`, `port` and `type` to
/// be configured; each missing key is reported under its own name.
pub(crate) fn analyzer_request_data(
    device: &Device,
    extra: Metadata,
) -> Result<Metadata, ValidationError> {
    let mut missing = Vec::new();
    let hostname = device.metadata_str("endpoint_address");
    if hostname.is_none() {
        missing.push("endpoint_address");
    }
    let port = device.metadata.get("port").filter(|v| !v.is_null());
    if port.is_none() {
        missing.push("port");
    }
    let connection_type = device.metadata_str("type");
    if connection_type.is_none() {
        missing.push("type");
    }
    if !missing.is_empty() {
        return Err(ValidationError::missing_fields(missing));
    }

    let mut data = Metadata::new();
    data.insert("hostname".into(), hostname.unwrap_or_default().into());
    data.insert("port".into(), port.cloned().unwrap_or_default());
    data.insert("type".into(), connection_type.unwrap_or_default().into());
    data.extend(extra);
    Ok(data)
}
