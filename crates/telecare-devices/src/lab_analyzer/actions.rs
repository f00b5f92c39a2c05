//! Lab-analyzer relay actions.

use std::sync::Arc;

use serde_json::Value;

use telecare_auth::TokenIssuer;
use telecare_core::{ReportId, ValidationError};
use telecare_emr::{care_type, Device, DeviceStore, Metadata, ReportStore};
use telecare_relay::{GatewayClient, RawResponse, RelayConfig};

use super::analyzer_request_data;
use crate::error::ActionError;

/// Relay-backed lab-analyzer actions.
pub struct LabAnalyzerActions {
    devices: Arc<dyn DeviceStore>,
    reports: Arc<dyn ReportStore>,
    issuer: Arc<TokenIssuer>,
    relay: RelayConfig,
}

impl LabAnalyzerActions {
    /// Create the action service.
    #[must_use]
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        reports: Arc<dyn ReportStore>,
        issuer: Arc<TokenIssuer>,
        relay: RelayConfig,
    ) -> Self {
        Self {
            devices,
            reports,
            issuer,
            relay,
        }
    }

    /// Fetch the analyzer's status through its gateway.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] on missing configuration or relay
    /// failure.
    pub async fn get_status(&self, analyzer: &Device) -> Result<RawResponse, ActionError> {
        let client = self.gateway_client(analyzer)?;
        let data = analyzer_request_data(analyzer, Metadata::new())?;
        Ok(client.get_raw("/lab_analyzer/status", Some(&data)).await?)
    }

    /// Order a test on the analyzer for a diagnostic report.
    ///
    /// # Errors
    ///
    /// Returns a field-keyed validation error when the report does not
    /// exist, plus the failures of [`LabAnalyzerActions::get_status`].
    pub async fn order_test(
        &self,
        analyzer: &Device,
        diagnostic_report: &ReportId,
    ) -> Result<RawResponse, ActionError> {
        let report = self
            .reports
            .get_report(diagnostic_report)?
            .ok_or_else(|| {
                ValidationError::single("diagnostic_report", "Diagnostic report does not exist")
            })?;

        let client = self.gateway_client(analyzer)?;
        let mut extra = Metadata::new();
        extra.insert("payload".into(), report);
        let data = analyzer_request_data(analyzer, extra)?;
        Ok(client
            .post_raw("/lab_analyzer/order_test", &Value::Object(data))
            .await?)
    }

    /// Fetch pending results. The inbound body is forwarded opaquely —
    /// the gateway-side contract is external — serialized into the `json`
    /// query key.
    ///
    /// # Errors
    ///
    /// See [`LabAnalyzerActions::get_status`].
    pub async fn get_results(
        &self,
        analyzer: &Device,
        passthrough: &Value,
    ) -> Result<RawResponse, ActionError> {
        let client = self.gateway_client(analyzer)?;
        let mut extra = Metadata::new();
        extra.insert(
            "json".into(),
            Value::String(passthrough.to_string()),
        );
        let data = analyzer_request_data(analyzer, extra)?;
        Ok(client
            .get_raw("/lab_analyzer/get_results", Some(&data))
            .await?)
    }

    /// Clear delivered results, forwarding the inbound body opaquely.
    ///
    /// # Errors
    ///
    /// See [`LabAnalyzerActions::get_status`].
    pub async fn clear_results(
        &self,
        analyzer: &Device,
        passthrough: &Value,
    ) -> Result<RawResponse, ActionError> {
        let client = self.gateway_client(analyzer)?;
        let mut extra = Metadata::new();
        extra.insert("json".into(), passthrough.clone());
        let data = analyzer_request_data(analyzer, extra)?;
        Ok(client
            .post_raw("/lab_analyzer/clear_results", &Value::Object(data))
            .await?)
    }

    fn gateway_client(&self, analyzer: &Device) -> Result<GatewayClient, ActionError> {
        gateway_client_for(
            self.devices.as_ref(),
            &self.issuer,
            &self.relay,
            analyzer,
        )
    }
}

/// Resolve a device's configured gateway into a relay client. Shared with
/// the order-forwarding subscriber.
pub(crate) fn gateway_client_for(
    devices: &dyn DeviceStore,
    issuer: &Arc<TokenIssuer>,
    relay: &RelayConfig,
    device: &Device,
) -> Result<GatewayClient, ActionError> {
    let Some(gateway_id) = device.gateway_ref() else {
        return Err(ValidationError::missing_fields(["gateway"]).into());
    };
    let gateway = devices
        .find_device(&gateway_id, care_type::GATEWAY)?
        .ok_or_else(|| ValidationError::non_field("Gateway not found"))?;
    Ok(GatewayClient::from_device(&gateway, issuer.clone(), relay)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telecare_auth::test_keys;
    use telecare_core::OrganizationId;
    use telecare_emr::MemoryStore;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        actions: LabAnalyzerActions,
        store: Arc<MemoryStore>,
        analyzer: Device,
    }

    fn setup(gateway_host: &str) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let org = OrganizationId::generate();

        let mut gateway = Device::new(care_type::GATEWAY, org);
        gateway
            .metadata
            .insert("endpoint_address".into(), gateway_host.into());
        gateway
            .metadata
            .insert("insecure_connection".into(), true.into());
        store.put_device(&gateway).unwrap();

        let mut analyzer = Device::new(care_type::LAB_ANALYZER, org);
        analyzer.metadata = match json!({
            "type": "hl7_2_over_ip",
            "gateway": gateway.id.to_string(),
            "endpoint_address": "10.0.0.5",
            "port": 443,
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.put_device(&analyzer).unwrap();

        let actions = LabAnalyzerActions::new(
            store.clone(),
            store.clone(),
            Arc::new(test_keys::issuer()),
            RelayConfig::default(),
        );

        Fixture {
            actions,
            store,
            analyzer,
        }
    }

    #[tokio::test]
    async fn get_status_relays_analyzer_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lab_analyzer/status"))
            .and(query_param("hostname", "10.0.0.5"))
            .and(query_param("port", "443"))
            .and(query_param("type", "hl7_2_over_ip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"idle": true})))
            .mount(&server)
            .await;

        let f = setup(&server.address().to_string());
        let raw = f.actions.get_status(&f.analyzer).await.unwrap();
        assert_eq!(raw.status, 200);
    }

    #[tokio::test]
    async fn missing_config_keyed_per_field() {
        let f = setup("gw.local");
        let mut analyzer = f.analyzer.clone();
        analyzer.metadata.remove("port");
        analyzer.metadata.remove("endpoint_address");

        match f.actions.get_status(&analyzer).await {
            Err(ActionError::Validation(err)) => {
                assert!(err.has_field("port"));
                assert!(err.has_field("endpoint_address"));
                assert!(!err.has_field("type"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn order_test_requires_existing_report() {
        let f = setup("gw.local");
        let result = f
            .actions
            .order_test(&f.analyzer, &ReportId::generate())
            .await;
        match result {
            Err(ActionError::Validation(err)) => assert!(err.has_field("diagnostic_report")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn order_test_forwards_report_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lab_analyzer/order_test"))
            .and(body_partial_json(json!({
                "hostname": "10.0.0.5",
                "payload": {"code": "CBC"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"queued": true})))
            .mount(&server)
            .await;

        let f = setup(&server.address().to_string());
        let report_id = ReportId::generate();
        f.store.put_report(report_id, json!({"code": "CBC"}));

        let raw = f.actions.order_test(&f.analyzer, &report_id).await.unwrap();
        assert_eq!(raw.status, 200);
    }

    #[tokio::test]
    async fn clear_results_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lab_analyzer/clear_results"))
            .and(body_partial_json(json!({"json": {"upto": "2026-01-01"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cleared": 4})))
            .mount(&server)
            .await;

        let f = setup(&server.address().to_string());
        let raw = f
            .actions
            .clear_results(&f.analyzer, &json!({"upto": "2026-01-01"}))
            .await
            .unwrap();
        assert_eq!(raw.status, 200);
    }
}
