//! Lab-analyzer metadata schemas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_core::{validate_endpoint_address, DeviceId, ValidationError};
use telecare_emr::{DeviceStore, DeviceSummary, Metadata};

use crate::validate_gateway_ref;

/// Supported analyzer connection protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabAnalyzerConnectionType {
    /// HL7 v2 messages over a TCP/IP socket.
    #[serde(rename = "hl7_2_over_ip")]
    Hl7V2OverIp,
}

/// Write-side analyzer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabAnalyzerMetadataWrite {
    /// Connection protocol.
    #[serde(rename = "type")]
    pub connection_type: LabAnalyzerConnectionType,
    /// Gateway device the analyzer is reached through.
    #[serde(default)]
    pub gateway: Option<DeviceId>,
    /// Analyzer host on the gateway's network.
    #[serde(default)]
    pub endpoint_address: Option<String>,
    /// Analyzer TCP port.
    #[serde(default)]
    pub port: Option<u32>,
}

impl LabAnalyzerMetadataWrite {
    /// Deserialize and validate raw metadata.
    ///
    /// `endpoint_address` and `port` must be both present or both absent,
    /// and the port must sit in `1..=65535`.
    ///
    /// # Errors
    ///
    /// Returns a field-keyed [`ValidationError`].
    pub fn parse(raw: Value, devices: &dyn DeviceStore) -> Result<Self, ValidationError> {
        let mut schema: Self = serde_json::from_value(raw)
            .map_err(|e| ValidationError::non_field(e.to_string()))?;

        let mut errors = ValidationError::new();
        if schema.endpoint_address.is_some() != schema.port.is_some() {
            errors.add(
                telecare_core::validation::NON_FIELD_ERRORS,
                "Both endpoint_address and port must be provided together or both must be absent",
            );
        }
        if let Some(address) = &schema.endpoint_address {
            match validate_endpoint_address(address) {
                Ok(normalized) => schema.endpoint_address = Some(normalized),
                Err(e) => errors.add("endpoint_address", e.to_string()),
            }
        }
        if let Some(port) = schema.port {
            if port < 1 || port > 65535 {
                errors.add("port", "Port must be between 1 and 65535");
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

/// Read-side analyzer metadata, with the gateway reference resolved into
/// a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabAnalyzerMetadataRead {
    /// Connection protocol.
    #[serde(rename = "type")]
    pub connection_type: LabAnalyzerConnectionType,
    /// Resolved gateway summary, omitted when unresolvable.
    #[serde(default)]
    pub gateway: Option<DeviceSummary>,
    /// Analyzer host on the gateway's network.
    #[serde(default)]
    pub endpoint_address: Option<String>,
    /// Analyzer TCP port.
    #[serde(default)]
    pub port: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telecare_emr::MemoryStore;

    #[test]
    fn endpoint_without_port_fails_cross_field() {
        let store = MemoryStore::new();
        let err = LabAnalyzerMetadataWrite::parse(
            json!({"type": "hl7_2_over_ip", "endpoint_address": "10.0.0.5"}),
            &store,
        )
        .unwrap_err();
        assert!(err.has_field(telecare_core::validation::NON_FIELD_ERRORS));
    }

    #[test]
    fn port_without_endpoint_fails_cross_field() {
        let store = MemoryStore::new();
        let err = LabAnalyzerMetadataWrite::parse(
            json!({"type": "hl7_2_over_ip", "port": 443}),
            &store,
        )
        .unwrap_err();
        assert!(err.has_field(telecare_core::validation::NON_FIELD_ERRORS));
    }

    #[test]
    fn port_out_of_range_fails() {
        let store = MemoryStore::new();
        let err = LabAnalyzerMetadataWrite::parse(
            json!({
                "type": "hl7_2_over_ip",
                "endpoint_address": "10.0.0.5",
                "port": 70000,
            }),
            &store,
        )
        .unwrap_err();
        assert!(err.has_field("port"));
    }

    #[test]
    fn valid_pair_accepted() {
        let store = MemoryStore::new();
        let schema = LabAnalyzerMetadataWrite::parse(
            json!({
                "type": "hl7_2_over_ip",
                "endpoint_address": "10.0.0.5",
                "port": 443,
            }),
            &store,
        )
        .unwrap();
        assert_eq!(schema.port, Some(443));

        let metadata = schema.into_metadata();
        assert_eq!(metadata["type"], "hl7_2_over_ip");
        assert_eq!(metadata["port"], 443);
    }

    #[test]
    fn neither_endpoint_nor_port_accepted() {
        let store = MemoryStore::new();
        let schema =
            LabAnalyzerMetadataWrite::parse(json!({"type": "hl7_2_over_ip"}), &store).unwrap();
        assert!(schema.endpoint_address.is_none());
        assert!(schema.port.is_none());
    }

    #[test]
    fn type_tag_required() {
        let store = MemoryStore::new();
        let result = LabAnalyzerMetadataWrite::parse(json!({}), &store);
        assert!(result.is_err());
    }
}
