//! Generic device dispatch endpoints.
//!
//! These are the host viewset seam: each request resolves the device's
//! care-type tag through the registry and delegates to the registered
//! handler.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_core::{DeviceId, LocationId, OrganizationId};
use telecare_emr::Device;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::ApiState;

/// Body for device creation.
#[derive(Debug, Deserialize)]
pub struct CreateDeviceBody {
    /// Care-type tag selecting the handler.
    pub care_type: String,
    /// Organization owning the device's facility.
    pub facility_organization: OrganizationId,
    /// Optional initial placement.
    #[serde(default)]
    pub current_location: Option<LocationId>,
    /// Raw metadata, validated by the handler's write schema.
    #[serde(default)]
    pub metadata: Value,
}

/// Body for a metadata update.
#[derive(Debug, Deserialize)]
pub struct UpdateDeviceBody {
    /// Raw metadata, validated by the handler's write schema.
    pub metadata: Value,
}

/// Filter for device listing.
#[derive(Debug, Deserialize)]
pub struct ListDevicesQuery {
    /// Restrict to one care type.
    #[serde(default)]
    pub care_type: Option<String>,
}

/// A device in API responses: identity plus the handler's read-schema
/// output.
#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    /// External id.
    pub id: DeviceId,
    /// Care-type tag.
    pub care_type: String,
    /// Read-schema metadata.
    pub metadata: Value,
}

/// `POST /v1/devices`
pub async fn create_device(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Json(body): Json<CreateDeviceBody>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.registry.get_handler(&body.care_type)?;

    let mut device = Device::new(&body.care_type, body.facility_organization);
    device.current_location = body.current_location;
    state.devices.put_device(&device)?;

    let raw = normalize_metadata(body.metadata);
    handler.handle_create(raw, &mut device).await?;

    let metadata = handler.retrieve(&device).await?;
    Ok((
        StatusCode::CREATED,
        Json(DeviceResponse {
            id: device.id,
            care_type: device.care_type,
            metadata,
        }),
    ))
}

/// `PUT /v1/devices/:device_id`
pub async fn update_device(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(device_id): Path<DeviceId>,
    Json(body): Json<UpdateDeviceBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut device = lookup(&state, &device_id)?;
    let handler = state.registry.get_handler(&device.care_type)?;

    handler
        .handle_update(normalize_metadata(body.metadata), &mut device)
        .await?;

    let metadata = handler.retrieve(&device).await?;
    Ok(Json(DeviceResponse {
        id: device.id,
        care_type: device.care_type,
        metadata,
    }))
}

/// `GET /v1/devices/:device_id`
pub async fn get_device(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(device_id): Path<DeviceId>,
) -> Result<impl IntoResponse, ApiError> {
    let device = lookup(&state, &device_id)?;
    let handler = state.registry.get_handler(&device.care_type)?;
    let metadata = handler.retrieve(&device).await?;
    Ok(Json(DeviceResponse {
        id: device.id,
        care_type: device.care_type,
        metadata,
    }))
}

/// `GET /v1/devices`
pub async fn list_devices(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Query(query): Query<ListDevicesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let devices = state.devices.list_devices(query.care_type.as_deref())?;

    let mut out = Vec::with_capacity(devices.len());
    for device in devices {
        // Devices of types no plugin claims are invisible here.
        let Ok(handler) = state.registry.get_handler(&device.care_type) else {
            continue;
        };
        let metadata = handler.list(&device).await?;
        out.push(DeviceResponse {
            id: device.id,
            care_type: device.care_type,
            metadata,
        });
    }
    Ok(Json(out))
}

/// `POST /v1/devices/:device_id/actions/:action`
pub async fn perform_action(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path((device_id, action)): Path<(DeviceId, String)>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let device = lookup(&state, &device_id)?;
    let handler = state.registry.get_handler(&device.care_type)?;
    let result = handler.perform_action(&device, &action, payload).await?;
    Ok(Json(result))
}

fn lookup(state: &ApiState, device_id: &DeviceId) -> Result<Device, ApiError> {
    state
        .devices
        .get_device(device_id)?
        .filter(|d| !d.deleted)
        .ok_or_else(|| ApiError::NotFound(format!("device {device_id}")))
}

fn normalize_metadata(metadata: Value) -> Value {
    if metadata.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        metadata
    }
}
