//! The polymorphic device-type handler contract.

use async_trait::async_trait;
use serde_json::Value;

use telecare_emr::Device;

use crate::error::HandlerError;

/// Behavior implemented by every device type.
///
/// Create and update validate raw metadata against the type's write
/// schema, replace the device's stored metadata with the normalized form,
/// and persist only the metadata field. Retrieve (and list, which is the
/// same shape for these types) validates stored metadata against the read
/// schema, resolving referenced records into read-only summaries.
#[async_trait]
pub trait DeviceTypeHandler: Send + Sync {
    /// Validate `raw_metadata` and persist it onto `device`.
    ///
    /// # Errors
    ///
    /// Returns `HandlerError::Validation` with field-keyed detail when the
    /// metadata fails the write schema.
    async fn handle_create(&self, raw_metadata: Value, device: &mut Device)
        -> Result<(), HandlerError>;

    /// Identical contract to [`DeviceTypeHandler::handle_create`].
    ///
    /// # Errors
    ///
    /// See [`DeviceTypeHandler::handle_create`].
    async fn handle_update(&self, raw_metadata: Value, device: &mut Device)
        -> Result<(), HandlerError>;

    /// Serialize the device's stored metadata through the read schema.
    ///
    /// # Errors
    ///
    /// Returns an error when stored metadata no longer matches the read
    /// schema or the store fails.
    async fn retrieve(&self, device: &Device) -> Result<Value, HandlerError>;

    /// List-shaped output; identical to retrieve for these device types.
    ///
    /// # Errors
    ///
    /// See [`DeviceTypeHandler::retrieve`].
    async fn list(&self, device: &Device) -> Result<Value, HandlerError> {
        self.retrieve(device).await
    }

    /// Perform a named action against the device.
    ///
    /// Types that expose their actions through dedicated relay operations
    /// keep the default, which fails explicitly rather than silently
    /// succeeding.
    ///
    /// # Errors
    ///
    /// Returns `HandlerError::ActionNotImplemented` unless the device type
    /// defines the action.
    async fn perform_action(
        &self,
        device: &Device,
        action: &str,
        payload: Value,
    ) -> Result<Value, HandlerError> {
        let _ = (device, payload);
        Err(HandlerError::ActionNotImplemented {
            action: action.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telecare_core::OrganizationId;
    use telecare_emr::care_type;

    struct MinimalHandler;

    #[async_trait]
    impl DeviceTypeHandler for MinimalHandler {
        async fn handle_create(
            &self,
            raw_metadata: Value,
            device: &mut Device,
        ) -> Result<(), HandlerError> {
            let _ = raw_metadata;
            device.metadata.clear();
            Ok(())
        }

        async fn handle_update(
            &self,
            raw_metadata: Value,
            device: &mut Device,
        ) -> Result<(), HandlerError> {
            self.handle_create(raw_metadata, device).await
        }

        async fn retrieve(&self, _device: &Device) -> Result<Value, HandlerError> {
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn default_action_fails_explicitly() {
        let handler = MinimalHandler;
        let device = Device::new(care_type::GATEWAY, OrganizationId::generate());
        let result = handler
            .perform_action(&device, "reboot", Value::Null)
            .await;
        match result {
            Err(HandlerError::ActionNotImplemented { action }) => assert_eq!(action, "reboot"),
            other => panic!("expected ActionNotImplemented, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn default_list_delegates_to_retrieve() {
        let handler = MinimalHandler;
        let device = Device::new(care_type::GATEWAY, OrganizationId::generate());
        assert_eq!(handler.list(&device).await.unwrap(), Value::Null);
    }
}
