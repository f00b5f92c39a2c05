//! Lab-analyzer device-type handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use telecare_emr::{Device, DeviceStore};
use telecare_registry::{DeviceTypeHandler, HandlerError};

use super::schema::{LabAnalyzerMetadataRead, LabAnalyzerMetadataWrite};
use crate::{gateway_summary, read_stored_metadata};

/// Handler for `lab-analyzer` devices.
///
/// Actions live in [`super::LabAnalyzerActions`]; the handler covers
/// metadata round-trips only.
pub struct LabAnalyzerHandler {
    devices: Arc<dyn DeviceStore>,
}

impl LabAnalyzerHandler {
    /// Create a handler backed by the host device store.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceStore>) -> Self {
        Self { devices }
    }

    async fn apply(&self, raw_metadata: Value, device: &mut Device) -> Result<(), HandlerError> {
        let schema = LabAnalyzerMetadataWrite::parse(raw_metadata, self.devices.as_ref())?;
        device.metadata = schema.into_metadata();
        self.devices.save_metadata(&device.id, &device.metadata)?;
        Ok(())
    }
}

#[async_trait]
impl DeviceTypeHandler for LabAnalyzerHandler {
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
        let mut read: LabAnalyzerMetadataRead = read_stored_metadata(device)?;
        read.gateway = gateway_summary(self.devices.as_ref(), device);
        serde_json::to_value(read).map_err(|e| {
            HandlerError::Validation(telecare_core::ValidationError::non_field(e.to_string()))
        })
    }
}
