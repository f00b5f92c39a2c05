//! The vitals-observation device plugin.
//!
//! Monitors and ventilators stream automated observations through their
//! gateway. The plugin also keeps device/encounter links consistent when
//! a location's encounter changes.

pub mod encounters;
pub mod handler;
pub mod schema;

pub use encounters::EncounterUnlinker;
pub use handler::VitalsObservationHandler;
pub use schema::{VitalsConnectionType, VitalsMetadataRead, VitalsMetadataWrite};

use std::sync::Arc;

use telecare_emr::care_type;
use telecare_registry::{DeviceTypeRegistry, RegistryError};

use crate::PluginContext;

/// Register the vitals-observation device type.
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
        care_type::VITALS_OBSERVATION,
        Arc::new(VitalsObservationHandler::new(ctx.devices.clone())),
    )
}
