//! Automatic test ordering on specimen collection.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use telecare_auth::TokenIssuer;
use telecare_core::LocationId;
use telecare_emr::{care_type, Device, DeviceStore, Metadata};
use telecare_relay::RelayConfig;

use super::actions::gateway_client_for;
use super::analyzer_request_data;
use crate::error::ActionError;
use crate::events::{DeviceEvent, EventSubscriber};

/// Subscriber relaying a test order to the lab analyzer at the specimen's
/// location when a specimen is collected.
pub struct OrderForwarder {
    devices: Arc<dyn DeviceStore>,
    issuer: Arc<TokenIssuer>,
    relay: RelayConfig,
}

impl OrderForwarder {
    /// Create the subscriber.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceStore>, issuer: Arc<TokenIssuer>, relay: RelayConfig) -> Self {
        Self {
            devices,
            issuer,
            relay,
        }
    }

    fn analyzer_at(&self, locations: &[LocationId]) -> Option<Device> {
        locations.iter().find_map(|location| {
            self.devices
                .devices_at_location(location, care_type::LAB_ANALYZER)
                .ok()?
                .into_iter()
                .next()
        })
    }

    async fn forward(&self, locations: &[LocationId], order: &Value) -> Result<(), ActionError> {
        let Some(analyzer) = self.analyzer_at(locations) else {
            tracing::warn!("No lab analyzer device found for specimen locations");
            return Ok(());
        };

        let client = gateway_client_for(self.devices.as_ref(), &self.issuer, &self.relay, &analyzer)?;
        let mut extra = Metadata::new();
        extra.insert("payload".into(), order.clone());
        let data = analyzer_request_data(&analyzer, extra)?;

        let response = client
            .post_raw("/lab_analyzer/order_test", &Value::Object(data))
            .await?;
        tracing::info!(
            analyzer = %analyzer.id,
            status = response.status,
            "Forwarded lab order for collected specimen"
        );
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for OrderForwarder {
    fn name(&self) -> &'static str {
        "lab-analyzer-order-forwarder"
    }

    async fn handle(&self, event: &DeviceEvent) -> Result<(), ActionError> {
        match event {
            DeviceEvent::SpecimenCollected { locations, order } => {
                self.forward(locations, order).await
            }
            DeviceEvent::LocationEncounterChanged { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telecare_auth::test_keys;
    use telecare_core::OrganizationId;
    use telecare_emr::{FacilityLocation, MemoryStore};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forwarder_with_analyzer(gateway_host: &str) -> (OrderForwarder, LocationId) {
        let store = Arc::new(MemoryStore::new());
        let org = OrganizationId::generate();

        let location = FacilityLocation::new(org);
        store.put_location(&location).unwrap();

        let mut gateway = Device::new(care_type::GATEWAY, org);
        gateway
            .metadata
            .insert("endpoint_address".into(), gateway_host.into());
        gateway
            .metadata
            .insert("insecure_connection".into(), true.into());
        store.put_device(&gateway).unwrap();

        let mut analyzer = Device::new(care_type::LAB_ANALYZER, org);
        analyzer.current_location = Some(location.id);
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

        let forwarder = OrderForwarder::new(
            store,
            Arc::new(test_keys::issuer()),
            RelayConfig::default(),
        );
        (forwarder, location.id)
    }

    #[tokio::test]
    async fn specimen_collection_relays_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lab_analyzer/order_test"))
            .and(body_partial_json(json!({
                "payload": {"patient": {"name": "A"}},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"queued": true})))
            .expect(1)
            .mount(&server)
            .await;

        let (forwarder, location) = forwarder_with_analyzer(&server.address().to_string());
        let event = DeviceEvent::SpecimenCollected {
            locations: vec![location],
            order: json!({"patient": {"name": "A"}}),
        };
        forwarder.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn no_analyzer_is_not_an_error() {
        let (forwarder, _location) = forwarder_with_analyzer("gw.local");
        let event = DeviceEvent::SpecimenCollected {
            locations: vec![LocationId::generate()],
            order: json!({}),
        };
        // No analyzer at this location: logged, not failed.
        forwarder.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn ignores_location_events() {
        let (forwarder, _location) = forwarder_with_analyzer("gw.local");
        let event = DeviceEvent::LocationEncounterChanged {
            location: FacilityLocation::new(OrganizationId::generate()),
        };
        forwarder.handle(&event).await.unwrap();
    }
}
