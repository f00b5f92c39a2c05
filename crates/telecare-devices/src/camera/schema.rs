//! Camera metadata schemas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_core::{validate_endpoint_address, DeviceId, ValidationError};
use telecare_emr::{DeviceStore, DeviceSummary, Metadata};

use crate::validate_gateway_ref;

/// Supported camera connection protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraConnectionType {
    /// ONVIF-speaking PTZ camera.
    #[serde(rename = "ONVIF")]
    Onvif,
}

/// Write-side camera metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraMetadataWrite {
    /// Connection protocol.
    #[serde(default, rename = "type")]
    pub connection_type: Option<CameraConnectionType>,
    /// Gateway device the camera is reached through.
    #[serde(default)]
    pub gateway: Option<DeviceId>,
    /// Camera host on the gateway's network.
    #[serde(default)]
    pub endpoint_address: Option<String>,
    /// Camera credential.
    #[serde(default)]
    pub username: Option<String>,
    /// Camera credential.
    #[serde(default)]
    pub password: Option<String>,
    /// Stream identifier for the video feed service.
    #[serde(default)]
    pub stream_id: Option<String>,
}

impl CameraMetadataWrite {
    /// Deserialize and validate raw metadata.
    ///
    /// # Errors
    ///
    /// Returns a field-keyed [`ValidationError`]; a `gateway` reference
    /// must name an existing gateway device.
    pub fn parse(raw: Value, devices: &dyn DeviceStore) -> Result<Self, ValidationError> {
        let mut schema: Self = serde_json::from_value(raw)
            .map_err(|e| ValidationError::non_field(e.to_string()))?;

        let mut errors = ValidationError::new();
        if let Some(address) = &schema.endpoint_address {
            match validate_endpoint_address(address) {
                Ok(normalized) => schema.endpoint_address = Some(normalized),
                Err(e) => errors.add("endpoint_address", e.to_string()),
            }
        }
        if let Err(e) = validate_gateway_ref(devices, schema.gateway.as_ref()) {
            errors.merge(e);
        }
        errors.into_result()?;
        Ok(schema)
    }

    /// Dump the normalized form for storage.
    #[must_use]
    pub fn into_metadata(self) -> Metadata {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Metadata::new(),
        }
    }
}

/// Read-side camera metadata, with the gateway reference resolved into a
/// summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraMetadataRead {
    /// Resolved gateway summary, omitted when unresolvable.
    #[serde(default)]
    pub gateway: Option<DeviceSummary>,
    /// Connection protocol.
    #[serde(default, rename = "type")]
    pub connection_type: Option<CameraConnectionType>,
    /// Camera host on the gateway's network.
    #[serde(default)]
    pub endpoint_address: Option<String>,
    /// Camera credential.
    #[serde(default)]
    pub username: Option<String>,
    /// Camera credential.
    #[serde(default)]
    pub password: Option<String>,
    /// Stream identifier for the video feed service.
    #[serde(default)]
    pub stream_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telecare_core::OrganizationId;
    use telecare_emr::{care_type, Device, MemoryStore};

    #[test]
    fn type_tag_is_enumerated() {
        let store = MemoryStore::new();
        let schema = CameraMetadataWrite::parse(json!({"type": "ONVIF"}), &store).unwrap();
        assert_eq!(schema.connection_type, Some(CameraConnectionType::Onvif));

        let err = CameraMetadataWrite::parse(json!({"type": "RTSP"}), &store).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn gateway_must_exist() {
        let store = MemoryStore::new();
        let err = CameraMetadataWrite::parse(
            json!({"gateway": telecare_core::DeviceId::generate().to_string()}),
            &store,
        )
        .unwrap_err();
        assert!(err.has_field("gateway"));

        let gateway = Device::new(care_type::GATEWAY, OrganizationId::generate());
        store.put_device(&gateway).unwrap();
        let schema = CameraMetadataWrite::parse(
            json!({"gateway": gateway.id.to_string()}),
            &store,
        )
        .unwrap();
        assert_eq!(schema.gateway, Some(gateway.id));
    }

    #[test]
    fn multiple_failures_reported_together() {
        let store = MemoryStore::new();
        let err = CameraMetadataWrite::parse(
            json!({
                "gateway": telecare_core::DeviceId::generate().to_string(),
                "endpoint_address": "rtsp://camera",
            }),
            &store,
        )
        .unwrap_err();
        assert!(err.has_field("gateway"));
        assert!(err.has_field("endpoint_address"));
    }

    #[test]
    fn dump_keeps_stream_credentials() {
        let store = MemoryStore::new();
        let schema = CameraMetadataWrite::parse(
            json!({
                "type": "ONVIF",
                "endpoint_address": "10.1.1.20",
                "username": "svc",
                "password": "secret",
                "stream_id": "feed-7",
            }),
            &store,
        )
        .unwrap();
        let metadata = schema.into_metadata();
        assert_eq!(metadata["type"], "ONVIF");
        assert_eq!(metadata["stream_id"], "feed-7");
        assert_eq!(metadata["password"], "secret");
    }
}
