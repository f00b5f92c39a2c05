//! Gateway device-type handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use telecare_emr::{Device, DeviceStore};
use telecare_registry::{DeviceTypeHandler, HandlerError};

use super::schema::{GatewayMetadataRead, GatewayMetadataWrite};
use crate::read_stored_metadata;

/// Handler for `gateway` devices.
pub struct GatewayHandler {
    devices: Arc<dyn DeviceStore>,
}

impl GatewayHandler {
    /// Create a handler backed by the host device store.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceStore>) -> Self {
        Self { devices }
    }

    async fn apply(&self, raw_metadata: Value, device: &mut Device) -> Result<(), HandlerError> {
        let schema = GatewayMetadataWrite::parse(raw_metadata)?;
        device.metadata = schema.into_metadata();
        self.devices.save_metadata(&device.id, &device.metadata)?;
        Ok(())
    }
}

#[async_trait]
impl DeviceTypeHandler for GatewayHandler {
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
        let read: GatewayMetadataRead = read_stored_metadata(device)?;
        serde_json::to_value(read).map_err(|e| {
            HandlerError::Validation(telecare_core::ValidationError::non_field(e.to_string()))
        })
    }

    // perform_action keeps the explicit not-implemented default: gateway
    // devices expose no direct actions.
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telecare_core::OrganizationId;
    use telecare_emr::{care_type, MemoryStore};

    fn setup() -> (GatewayHandler, Arc<MemoryStore>, Device) {
        let store = Arc::new(MemoryStore::new());
        let device = Device::new(care_type::GATEWAY, OrganizationId::generate());
        store.put_device(&device).unwrap();
        (GatewayHandler::new(store.clone()), store, device)
    }

    #[tokio::test]
    async fn create_persists_normalized_metadata() {
        let (handler, store, mut device) = setup();

        handler
            .handle_create(
                json!({"endpoint_address": "gw.local", "insecure": true, "junk": 1}),
                &mut device,
            )
            .await
            .unwrap();

        let stored = store.get_device(&device.id).unwrap().unwrap();
        assert_eq!(stored.metadata_str("endpoint_address"), Some("gw.local"));
        assert!(stored.metadata_bool("insecure", false));
        assert!(!stored.metadata.contains_key("junk"));
    }

    #[tokio::test]
    async fn retrieve_exposes_read_schema_only() {
        let (handler, _store, mut device) = setup();
        handler
            .handle_create(json!({"endpoint_address": "gw.local"}), &mut device)
            .await
            .unwrap();

        let output = handler.retrieve(&device).await.unwrap();
        assert_eq!(output["endpoint_address"], "gw.local");
        // Read schema exposes insecure_connection, not the stored write
        // field name.
        assert_eq!(output["insecure_connection"], false);
        assert!(output.get("insecure").is_none());
    }

    #[tokio::test]
    async fn invalid_endpoint_rejected() {
        let (handler, store, mut device) = setup();
        let result = handler
            .handle_create(json!({"endpoint_address": "http://nope"}), &mut device)
            .await;
        assert!(matches!(result, Err(HandlerError::Validation(_))));

        // Nothing persisted on failure.
        let stored = store.get_device(&device.id).unwrap().unwrap();
        assert!(stored.metadata.is_empty());
    }

    #[tokio::test]
    async fn actions_not_implemented() {
        let (handler, _store, device) = setup();
        let result = handler.perform_action(&device, "reboot", Value::Null).await;
        assert!(matches!(
            result,
            Err(HandlerError::ActionNotImplemented { .. })
        ));
    }
}
