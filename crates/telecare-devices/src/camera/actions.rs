//! Camera relay actions.
//!
//! Each action resolves the camera's configured gateway, merges the
//! camera's endpoint/credential metadata with action parameters, calls
//! the relay client, and forwards the gateway's response verbatim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_auth::TokenIssuer;
use telecare_core::{UserId, ValidationError};
use telecare_emr::{care_type, Device, DeviceStore, Metadata, PermissionBackend};
use telecare_relay::{GatewayClient, RawResponse, RelayConfig};

use super::permissions::CameraAccess;
use crate::error::ActionError;

/// PTZ movement parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PtzPayload {
    /// Pan.
    pub x: f64,
    /// Tilt.
    pub y: f64,
    /// Zoom.
    pub zoom: f64,
}

/// Parameters for the goto-preset action.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GotoPresetRequest {
    /// Gateway-side preset number.
    #[serde(default)]
    pub preset: Option<i64>,
}

/// Relay-backed camera actions.
pub struct CameraActions {
    devices: Arc<dyn DeviceStore>,
    access: CameraAccess,
    issuer: Arc<TokenIssuer>,
    relay: RelayConfig,
}

impl CameraActions {
    /// Create the action service.
    #[must_use]
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        permissions: Arc<dyn PermissionBackend>,
        issuer: Arc<TokenIssuer>,
        relay: RelayConfig,
    ) -> Self {
        let access = CameraAccess::new(devices.clone(), permissions);
        Self {
            devices,
            access,
            issuer,
            relay,
        }
    }

    /// Fetch the camera's status through its gateway.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] on missing capability, missing
    /// configuration, or relay failure.
    pub async fn get_status(&self, user: &UserId, camera: &Device) -> Result<RawResponse, ActionError> {
        self.authorize_video_stream(user, camera)?;
        let client = self.gateway_client(camera)?;
        let data = self.request_data(camera, Metadata::new())?;
        Ok(client.get_raw("/status", Some(&data)).await?)
    }

    /// Fetch the gateway-side preset table.
    ///
    /// # Errors
    ///
    /// See [`CameraActions::get_status`].
    pub async fn get_presets(&self, user: &UserId, camera: &Device) -> Result<RawResponse, ActionError> {
        self.authorize_video_stream(user, camera)?;
        let client = self.gateway_client(camera)?;
        let data = self.request_data(camera, Metadata::new())?;
        Ok(client.get_raw("/presets", Some(&data)).await?)
    }

    /// Drive the camera to a gateway-side preset.
    ///
    /// # Errors
    ///
    /// See [`CameraActions::get_status`].
    pub async fn goto_preset(
        &self,
        user: &UserId,
        camera: &Device,
        request: GotoPresetRequest,
    ) -> Result<RawResponse, ActionError> {
        self.authorize_device_control(user, camera)?;
        let client = self.gateway_client(camera)?;
        let data = self.request_data(camera, to_metadata(&request)?)?;
        Ok(client.post_raw("/gotoPreset", &Value::Object(data)).await?)
    }

    /// Move the camera to an absolute PTZ position.
    ///
    /// # Errors
    ///
    /// See [`CameraActions::get_status`].
    pub async fn absolute_move(
        &self,
        user: &UserId,
        camera: &Device,
        ptz: PtzPayload,
    ) -> Result<RawResponse, ActionError> {
        self.authorize_device_control(user, camera)?;
        let client = self.gateway_client(camera)?;
        let data = self.request_data(camera, to_metadata(&ptz)?)?;
        Ok(client.post_raw("/absoluteMove", &Value::Object(data)).await?)
    }

    /// Move the camera relative to its current PTZ position.
    ///
    /// # Errors
    ///
    /// See [`CameraActions::get_status`].
    pub async fn relative_move(
        &self,
        user: &UserId,
        camera: &Device,
        ptz: PtzPayload,
    ) -> Result<RawResponse, ActionError> {
        self.authorize_device_control(user, camera)?;
        let client = self.gateway_client(camera)?;
        let data = self.request_data(camera, to_metadata(&ptz)?)?;
        Ok(client.post_raw("/relativeMove", &Value::Object(data)).await?)
    }

    /// Obtain a time-boxed token for the camera's video feed.
    ///
    /// # Errors
    ///
    /// See [`CameraActions::get_status`].
    pub async fn stream_token(&self, user: &UserId, camera: &Device) -> Result<RawResponse, ActionError> {
        self.authorize_video_stream(user, camera)?;
        let client = self.gateway_client(camera)?;

        let mut missing = Vec::new();
        let stream = camera.metadata_str("stream_id");
        if stream.is_none() {
            missing.push("stream_id");
        }
        let ip = camera.metadata_str("endpoint_address");
        if ip.is_none() {
            missing.push("endpoint_address");
        }
        if !missing.is_empty() {
            return Err(ValidationError::missing_fields(missing).into());
        }

        let mut data = Metadata::new();
        data.insert("stream".into(), stream.unwrap_or_default().into());
        data.insert("ip".into(), ip.unwrap_or_default().into());
        Ok(client
            .post_raw("/getToken/videoFeed", &Value::Object(data))
            .await?)
    }

    fn authorize_video_stream(&self, user: &UserId, camera: &Device) -> Result<(), ActionError> {
        if self.access.can_view_stream(user, camera) {
            Ok(())
        } else {
            Err(ActionError::PermissionDenied("view the video stream"))
        }
    }

    fn authorize_device_control(&self, user: &UserId, camera: &Device) -> Result<(), ActionError> {
        if self.access.can_control_ptz(user, camera) {
            Ok(())
        } else {
            Err(ActionError::PermissionDenied("control the device"))
        }
    }

    fn gateway_client(&self, camera: &Device) -> Result<GatewayClient, ActionError> {
        let Some(gateway_id) = camera.gateway_ref() else {
            return Err(ValidationError::missing_fields(["gateway"]).into());
        };
        let gateway = self
            .devices
            .find_device(&gateway_id, care_type::GATEWAY)?
            .ok_or_else(|| ValidationError::non_field("Gateway not found"))?;
        Ok(GatewayClient::from_device(
            &gateway,
            self.issuer.clone(),
            &self.relay,
        )?)
    }

    /// Build the base gateway request payload from camera metadata,
    /// merged with action-specific parameters.
    fn request_data(&self, camera: &Device, extra: Metadata) -> Result<Metadata, ActionError> {
        let mut missing = Vec::new();
        let hostname = camera.metadata_str("endpoint_address");
        if hostname.is_none() {
            missing.push("endpoint_address");
        }
        let username = camera.metadata_str("username");
        if username.is_none() {
            missing.push("username");
        }
        let password = camera.metadata_str("password");
        if password.is_none() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(ValidationError::missing_fields(missing).into());
        }

        let mut data = Metadata::new();
        data.insert("hostname".into(), hostname.unwrap_or_default().into());
        data.insert("port".into(), 80.into());
        data.insert("username".into(), username.unwrap_or_default().into());
        data.insert("password".into(), password.unwrap_or_default().into());
        data.extend(extra);
        Ok(data)
    }
}

fn to_metadata<T: Serialize>(value: &T) -> Result<Metadata, ActionError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ValidationError::non_field("invalid action parameters").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telecare_auth::test_keys;
    use telecare_core::OrganizationId;
    use telecare_emr::{MemoryStore, StaticPermissions};
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::camera::permissions::{CAN_CONTROL_CAMERA_PTZ, CAN_VIEW_CAMERA_STREAM};

    struct Fixture {
        actions: CameraActions,
        permissions: Arc<StaticPermissions>,
        camera: Device,
        user: UserId,
    }

    fn setup(gateway_host: &str) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let permissions = Arc::new(StaticPermissions::new());
        let org = OrganizationId::generate();
        let user = UserId::generate();

        let mut gateway = Device::new(care_type::GATEWAY, org);
        gateway
            .metadata
            .insert("endpoint_address".into(), gateway_host.into());
        gateway
            .metadata
            .insert("insecure_connection".into(), true.into());
        store.put_device(&gateway).unwrap();

        let mut camera = Device::new(care_type::CAMERA, org);
        camera.metadata = match json!({
            "type": "ONVIF",
            "gateway": gateway.id.to_string(),
            "endpoint_address": "10.1.1.20",
            "username": "svc",
            "password": "secret",
            "stream_id": "feed-7",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.put_device(&camera).unwrap();

        let actions = CameraActions::new(
            store,
            permissions.clone(),
            Arc::new(test_keys::issuer()),
            RelayConfig::default(),
        );

        Fixture {
            actions,
            permissions,
            camera,
            user,
        }
    }

    #[tokio::test]
    async fn get_status_relays_with_camera_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(query_param("hostname", "10.1.1.20"))
            .and(query_param("port", "80"))
            .and(query_param("username", "svc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"power": "on"})))
            .mount(&server)
            .await;

        let f = setup(&server.address().to_string());
        f.permissions
            .grant(CAN_VIEW_CAMERA_STREAM, f.user, f.camera.facility_organization);

        let raw = f.actions.get_status(&f.user, &f.camera).await.unwrap();
        assert_eq!(raw.status, 200);
    }

    #[tokio::test]
    async fn status_requires_view_capability() {
        let f = setup("gw.local");
        let result = f.actions.get_status(&f.user, &f.camera).await;
        assert!(matches!(result, Err(ActionError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn movement_requires_control_capability() {
        let f = setup("gw.local");
        // View capability alone is not enough for PTZ.
        f.permissions
            .grant(CAN_VIEW_CAMERA_STREAM, f.user, f.camera.facility_organization);

        let ptz = PtzPayload {
            x: 0.1,
            y: 0.2,
            zoom: 1.0,
        };
        let result = f.actions.absolute_move(&f.user, &f.camera, ptz).await;
        assert!(matches!(result, Err(ActionError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn goto_preset_posts_merged_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gotoPreset"))
            .and(body_partial_json(json!({
                "hostname": "10.1.1.20",
                "port": 80,
                "preset": 3,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let f = setup(&server.address().to_string());
        f.permissions
            .grant(CAN_CONTROL_CAMERA_PTZ, f.user, f.camera.facility_organization);

        let raw = f
            .actions
            .goto_preset(&f.user, &f.camera, GotoPresetRequest { preset: Some(3) })
            .await
            .unwrap();
        assert_eq!(raw.status, 200);
    }

    #[tokio::test]
    async fn missing_credentials_keyed_per_field() {
        let f = setup("gw.local");
        f.permissions
            .grant(CAN_VIEW_CAMERA_STREAM, f.user, f.camera.facility_organization);

        let mut camera = f.camera.clone();
        camera.metadata.remove("username");
        camera.metadata.remove("password");

        match f.actions.get_status(&f.user, &camera).await {
            Err(ActionError::Validation(err)) => {
                assert!(err.has_field("username"));
                assert!(err.has_field("password"));
                assert!(!err.has_field("endpoint_address"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_gateway_keyed() {
        let f = setup("gw.local");
        f.permissions
            .grant(CAN_VIEW_CAMERA_STREAM, f.user, f.camera.facility_organization);

        let mut camera = f.camera.clone();
        camera.metadata.remove("gateway");

        match f.actions.get_status(&f.user, &camera).await {
            Err(ActionError::Validation(err)) => assert!(err.has_field("gateway")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_token_uses_stream_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getToken/videoFeed"))
            .and(body_partial_json(json!({
                "stream": "feed-7",
                "ip": "10.1.1.20",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
            .mount(&server)
            .await;

        let f = setup(&server.address().to_string());
        f.permissions
            .grant(CAN_VIEW_CAMERA_STREAM, f.user, f.camera.facility_organization);

        let raw = f.actions.stream_token(&f.user, &f.camera).await.unwrap();
        assert_eq!(raw.status, 200);
    }
}
