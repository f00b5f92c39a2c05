//! The camera device plugin.
//!
//! Cameras relay their actions (status, presets, PTZ movement, stream
//! tokens) through a configured gateway and manage per-location position
//! presets. The plugin extends gateway behavior and therefore requires
//! the gateway plugin to be registered first.

pub mod actions;
pub mod handler;
pub mod permissions;
pub mod presets;
pub mod schema;

pub use actions::{CameraActions, GotoPresetRequest, PtzPayload};
pub use handler::CameraHandler;
pub use permissions::{CameraAccess, CAN_CONTROL_CAMERA_PTZ, CAN_VIEW_CAMERA_STREAM};
pub use presets::{PresetParams, PresetService, SetDefaultOutcome};
pub use schema::{CameraConnectionType, CameraMetadataRead, CameraMetadataWrite};

use std::sync::Arc;

use telecare_emr::care_type;
use telecare_registry::{DeviceTypeRegistry, RegistryError};

use crate::PluginContext;

/// Register the camera device type.
///
/// # Errors
///
/// Returns `RegistryError::MissingDependency` when the gateway device
/// type has not been registered yet; this aborts plugin initialization.
pub fn register(
    registry: &mut DeviceTypeRegistry,
    ctx: &PluginContext,
) -> Result<(), RegistryError> {
    registry.require("camera_device", care_type::GATEWAY)?;
    registry.register(
        care_type::CAMERA,
        Arc::new(CameraHandler::new(ctx.devices.clone())),
    )
}
