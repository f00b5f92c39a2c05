//! Vitals-observation metadata schemas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_core::{validate_endpoint_address, DeviceId, ValidationError};
use telecare_emr::{DeviceStore, DeviceSummary, Metadata};

use crate::validate_gateway_ref;

/// Supported vitals device kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VitalsConnectionType {
    /// HL7-speaking bedside monitor.
    #[serde(rename = "HL7-Monitor")]
    Hl7Monitor,
    /// Ventilator.
    #[serde(rename = "Ventilator")]
    Ventilator,
}

/// Write-side vitals metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsMetadataWrite {
    /// Device kind.
    #[serde(rename = "type")]
    pub connection_type: VitalsConnectionType,
    /// Gateway device the monitor is reached through.
    #[serde(default)]
    pub gateway: Option<DeviceId>,
    /// Monitor host on the gateway's network.
    #[serde(default)]
    pub endpoint_address: Option<String>,
}

impl VitalsMetadataWrite {
    /// Deserialize and validate raw metadata.
    ///
    /// # Errors
    ///
    /// Returns a field-keyed [`ValidationError`].
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

/// Read-side vitals metadata, with the gateway reference resolved into a
/// summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsMetadataRead {
    /// Device kind.
    #[serde(rename = "type")]
    pub connection_type: VitalsConnectionType,
    /// Resolved gateway summary, omitted when unresolvable.
    #[serde(default)]
    pub gateway: Option<DeviceSummary>,
    /// Monitor host on the gateway's network.
    #[serde(default)]
    pub endpoint_address: Option<String>,
}
