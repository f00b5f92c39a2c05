//! Vitals-observation device-type handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use telecare_emr::{Device, DeviceStore};
use telecare_registry::{DeviceTypeHandler, HandlerError};

use super::schema::{VitalsMetadataRead, VitalsMetadataWrite};
use crate::{gateway_summary, read_stored_metadata};

/// Handler for `vitals-observation` devices.
pub struct VitalsObservationHandler {
    devices: Arc<dyn DeviceStore>,
}

impl VitalsObservationHandler {
    /// Create a handler backed by the host device store.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceStore>) -> Self {
        Self { devices }
    }

    async fn apply(&self, raw_metadata: Value, device: &mut Device) -> Result<(), HandlerError> {
        let schema = VitalsMetadataWrite::parse(raw_metadata, self.devices.as_ref())?;
        device.metadata = schema.into_metadata();
        self.devices.save_metadata(&device.id, &device.metadata)?;
        Ok(())
    }
}

#[async_trait]
impl DeviceTypeHandler for VitalsObservationHandler {
    async fn handle_create(
        &self,
        raw_metadata: Value,
        device: &mut Device,
    ) -> Result<(), HandlerError> {
        self.apply(raw_metadata, device).await
    }

    async fn handle_update(
        &self,
        raw_metadata: Value,
        device: &mut Device,
    ) -> Result<(), HandlerError> {
        self.apply(raw_metadata, device).await
    }

    async fn retrieve(&self, device: &Device) -> Result<Value, HandlerError> {
        let mut read: VitalsMetadataRead = read_stored_metadata(device)?;
        read.gateway = gateway_summary(self.devices.as_ref(), device);
        serde_json::to_value(read).map_err(|e| {
            HandlerError::Validation(telecare_core::ValidationError::non_field(e.to_string()))
        })
    }
}
