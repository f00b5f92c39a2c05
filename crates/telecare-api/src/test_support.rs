//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use telecare_auth::test_keys;
use telecare_core::{OrganizationId, UserId};
use telecare_devices::{install_default_plugins, PluginContext};
use telecare_emr::{care_type, Device, DeviceStore, FacilityLocation, MemoryStore, StaticPermissions};
use telecare_registry::DeviceTypeRegistry;

use crate::config::ApiConfig;
use crate::routes::create_router;
use crate::state::{ApiState, HostBackends};

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub permissions: Arc<StaticPermissions>,
    pub org: OrganizationId,
    pub user: UserId,
    pub state: Arc<ApiState>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let permissions = Arc::new(StaticPermissions::new());

        let mut registry = DeviceTypeRegistry::new();
        let ctx = PluginContext {
            devices: store.clone(),
        };
        install_default_plugins(&mut registry, &ctx).expect("plugin registration");
        registry.seal();

        let backends = HostBackends {
            devices: store.clone(),
            presets: store.clone(),
            reports: store.clone(),
            observations: store.clone(),
            permissions: permissions.clone(),
        };
        let state = Arc::new(ApiState::new(
            Arc::new(registry),
            &backends,
            Arc::new(test_keys::issuer()),
            ApiConfig::default(),
        ));

        Self {
            store,
            permissions,
            org: OrganizationId::generate(),
            user: UserId::generate(),
            state,
        }
    }

    pub fn user_header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-remote-user"),
            HeaderValue::from_str(&self.user.to_string()).unwrap(),
        )
    }

    pub fn seed_gateway(&self, host: &str) -> Device {
        let mut gateway = Device::new(care_type::GATEWAY, self.org);
        gateway
            .metadata
            .insert("endpoint_address".into(), host.into());
        gateway
            .metadata
            .insert("insecure_connection".into(), true.into());
        self.store.put_device(&gateway).unwrap();
        gateway
    }

    /// A gateway whose identity endpoint is dialed over plain http by the
    /// middleware auth variant.
    pub fn seed_middleware_gateway(&self, host: &str) -> Device {
        let mut gateway = self.seed_gateway(host);
        gateway.metadata.insert("use_https".into(), false.into());
        self.store.put_device(&gateway).unwrap();
        gateway
    }

    pub fn seed_camera(&self, gateway: &Device) -> Device {
        let mut camera = Device::new(care_type::CAMERA, self.org);
        camera.metadata = object(json!({
            "type": "ONVIF",
            "gateway": gateway.id.to_string(),
            "endpoint_address": "10.1.1.20",
            "username": "svc",
            "password": "secret",
            "stream_id": "feed-7",
        }));
        self.store.put_device(&camera).unwrap();
        camera
    }

    pub fn seed_analyzer(&self, gateway: &Device) -> Device {
        let mut analyzer = Device::new(care_type::LAB_ANALYZER, self.org);
        analyzer.metadata = object(json!({
            "type": "hl7_2_over_ip",
            "gateway": gateway.id.to_string(),
            "endpoint_address": "10.0.0.5",
            "port": 443,
        }));
        self.store.put_device(&analyzer).unwrap();
        analyzer
    }

    pub fn seed_vitals(&self, gateway: &Device) -> Device {
        let mut device = Device::new(care_type::VITALS_OBSERVATION, self.org);
        device.metadata = object(json!({
            "type": "HL7-Monitor",
            "gateway": gateway.id.to_string(),
            "endpoint_address": "monitor-1.icu",
        }));
        self.store.put_device(&device).unwrap();
        device
    }

    pub fn seed_location(&self) -> FacilityLocation {
        let location = FacilityLocation::new(self.org);
        self.store.put_location(&location).unwrap();
        location
    }
}

pub fn test_server(ctx: &TestContext) -> TestServer {
    TestServer::new(create_router(ctx.state.clone())).unwrap()
}

/// Mount discovery + JWKS endpoints answering with the test key set.
pub async fn mock_identity_endpoints(server: &MockServer) {
    let jwks_uri = format!("{}/keys", server.uri());
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": "gateway-middleware",
            "jwks_uri": jwks_uri,
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_keys::jwks_document()))
        .mount(server)
        .await;
}

/// Authorization + gateway-id headers for a middleware-authenticated
/// request, signed with the test key.
pub fn middleware_headers(gateway: &Device) -> Vec<(HeaderName, HeaderValue)> {
    let now = Utc::now().timestamp();
    let claims = json!({
        "iss": "gateway-middleware",
        "iat": now,
        "exp": now + 300,
    });
    let key = EncodingKey::from_rsa_pem(test_keys::RSA_PRIVATE_KEY_PEM.as_bytes()).unwrap();
    let token = encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap();

    vec![
        (
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Middleware_Bearer {token}")).unwrap(),
        ),
        (
            HeaderName::from_static("x-gateway-id"),
            HeaderValue::from_str(&gateway.id.to_string()).unwrap(),
        ),
    ]
}

fn object(value: Value) -> telecare_emr::Metadata {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("fixture metadata must be an object"),
    }
}
