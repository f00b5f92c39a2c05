//! Encounter unlinking on location changes.

use std::sync::Arc;

use async_trait::async_trait;

use telecare_emr::{care_type, DeviceStore, FacilityLocation};

use crate::error::ActionError;
use crate::events::{DeviceEvent, EventSubscriber};

/// Subscriber that unlinks vitals-observation devices from their
/// encounter when their location's encounter no longer matches.
pub struct EncounterUnlinker {
    devices: Arc<dyn DeviceStore>,
}

impl EncounterUnlinker {
    /// Create the subscriber.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceStore>) -> Self {
        Self { devices }
    }

    fn unlink_stale(&self, location: &FacilityLocation) -> Result<(), ActionError> {
        let devices = self
            .devices
            .devices_at_location(&location.id, care_type::VITALS_OBSERVATION)?;

        for device in devices {
            if device.current_encounter.is_some()
                && device.current_encounter != location.current_encounter
            {
                tracing::info!(
                    device = %device.id,
                    location = %location.id,
                    "Unlinking vitals device from stale encounter"
                );
                self.devices.clear_encounter(&device.id)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for EncounterUnlinker {
    fn name(&self) -> &'static str {
        "vitals-encounter-unlinker"
    }

    async fn handle(&self, event: &DeviceEvent) -> Result<(), ActionError> {
        match event {
            DeviceEvent::LocationEncounterChanged { location } => self.unlink_stale(location),
            DeviceEvent::SpecimenCollected { .. } => Ok(()),
        }
    }
}
