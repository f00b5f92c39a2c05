//! Concrete device-type plugins.
//!
//! Four plugins build on the registry/relay core:
//!
//! - **gateway** — the intermediary device everything else relays through
//! - **camera** — ONVIF PTZ cameras: relay actions, permissions, position
//!   presets
//! - **lab-analyzer** — HL7v2-over-IP analyzers: relay actions, order
//!   forwarding on specimen collection
//! - **vitals-observation** — monitors/ventilators: automated observation
//!   surface, encounter unlinking on location changes
//!
//! Plugins register their handlers during process initialization via
//! [`install_default_plugins`]; dependency order matters (camera requires
//! gateway) and violations abort startup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod camera;
pub mod error;
pub mod events;
pub mod gateway;
pub mod lab_analyzer;
pub mod vitals;

pub use error::ActionError;
pub use events::{DeviceEvent, DeviceEventBus, EventSubscriber};

use std::sync::Arc;

use serde_json::Value;

use telecare_core::DeviceId;
use telecare_emr::{care_type, Device, DeviceStore, DeviceSummary};
use telecare_registry::{DeviceTypeRegistry, RegistryError};

/// Shared dependencies handed to every plugin at registration time.
#[derive(Clone)]
pub struct PluginContext {
    /// Host device/location store.
    pub devices: Arc<dyn DeviceStore>,
}

/// Register the four built-in plugins in dependency order.
///
/// # Errors
///
/// Returns a [`RegistryError`] — duplicate tag, sealed registry, or a
/// missing prerequisite — which callers must treat as fatal to process
/// initialization.
pub fn install_default_plugins(
    registry: &mut DeviceTypeRegistry,
    ctx: &PluginContext,
) -> Result<(), RegistryError> {
    gateway::register(registry, ctx)?;
    camera::register(registry, ctx)?;
    lab_analyzer::register(registry, ctx)?;
    vitals::register(registry, ctx)?;
    Ok(())
}

/// Validate that a referenced gateway device exists.
pub(crate) fn validate_gateway_ref(
    devices: &dyn DeviceStore,
    gateway: Option<&DeviceId>,
) -> Result<(), telecare_core::ValidationError> {
    if let Some(id) = gateway {
        let exists = devices
            .find_device(id, care_type::GATEWAY)
            .map(|d| d.is_some())
            .unwrap_or(false);
        if !exists {
            return Err(telecare_core::ValidationError::single(
                "gateway",
                "Gateway device does not exist",
            ));
        }
    }
    Ok(())
}

/// Resolve the gateway a device's metadata references into a read-only
/// summary. Resolution failure is tolerated silently — a device whose
/// gateway has vanished still retrieves, just without the embedded
/// summary.
pub(crate) fn gateway_summary(
    devices: &dyn DeviceStore,
    device: &Device,
) -> Option<DeviceSummary> {
    let id = device.gateway_ref()?;
    match devices.find_device(&id, care_type::GATEWAY) {
        Ok(found) => found.as_ref().map(DeviceSummary::from),
        Err(err) => {
            tracing::debug!(device = %device.id, error = %err, "Gateway resolution failed");
            None
        }
    }
}

/// Deserialize stored metadata (minus the raw `gateway` key) through a
/// read schema.
pub(crate) fn read_stored_metadata<T: serde::de::DeserializeOwned>(
    device: &Device,
) -> Result<T, telecare_core::ValidationError> {
    let mut metadata = device.metadata.clone();
    metadata.remove("gateway");
    serde_json::from_value(Value::Object(metadata))
        .map_err(|e| telecare_core::ValidationError::non_field(e.to_string()))
}
