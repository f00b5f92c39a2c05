//! Gateway metadata schemas.
//!
//! The write form stores an `insecure` flag while the read form exposes
//! `insecure_connection`. The asymmetry is part of the stored-record
//! contract and must not be unified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_core::{validate_endpoint_address, ValidationError};
use telecare_emr::Metadata;

/// Write-side gateway metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayMetadataWrite {
    /// Host the platform dials to reach the gateway.
    #[serde(default)]
    pub endpoint_address: Option<String>,
    /// Dial over plain http instead of https.
    #[serde(default)]
    pub insecure: bool,
}

impl GatewayMetadataWrite {
    /// Deserialize and validate raw metadata. Unknown keys are ignored
    /// and therefore dropped from what gets stored.
    ///
    /// # Errors
    ///
    /// Returns a field-keyed [`ValidationError`].
    pub fn parse(raw: Value) -> Result<Self, ValidationError> {
        let mut schema: Self = serde_json::from_value(raw)
            .map_err(|e| ValidationError::non_field(e.to_string()))?;
        if let Some(address) = &schema.endpoint_address {
            schema.endpoint_address = Some(validate_endpoint_address(address)?);
        }
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

/// Read-side gateway metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayMetadataRead {
    /// Host the platform dials to reach the gateway.
    #[serde(default)]
    pub endpoint_address: Option<String>,
    /// Whether the gateway is dialed over plain http.
    #[serde(default)]
    pub insecure_connection: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn write_normalizes_endpoint() {
        let schema =
            GatewayMetadataWrite::parse(json!({"endpoint_address": "10.0.0.5", "insecure": true}))
                .unwrap();
        assert_eq!(schema.endpoint_address.as_deref(), Some("10.0.0.5"));
        assert!(schema.insecure);
    }

    #[test]
    fn write_rejects_bad_endpoint() {
        let err = GatewayMetadataWrite::parse(json!({"endpoint_address": "http://gw"}))
            .unwrap_err();
        assert!(err.has_field("endpoint_address"));
    }

    #[test]
    fn write_drops_unknown_keys() {
        let schema = GatewayMetadataWrite::parse(json!({
            "endpoint_address": "gw.local",
            "favourite_colour": "teal",
        }))
        .unwrap();
        let metadata = schema.into_metadata();
        assert!(!metadata.contains_key("favourite_colour"));
        assert!(metadata.contains_key("insecure"));
    }

    #[test]
    fn read_defaults_insecure_connection() {
        let read: GatewayMetadataRead = serde_json::from_value(json!({})).unwrap();
        assert!(!read.insecure_connection);
        assert!(read.endpoint_address.is_none());
    }

    #[test]
    fn write_and_read_field_names_stay_asymmetric() {
        let stored = GatewayMetadataWrite::parse(json!({"insecure": true}))
            .unwrap()
            .into_metadata();
        assert!(stored.contains_key("insecure"));
        assert!(!stored.contains_key("insecure_connection"));
    }
}
