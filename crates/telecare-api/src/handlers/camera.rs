//! Camera action endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use telecare_core::DeviceId;
use telecare_devices::camera::{GotoPresetRequest, PtzPayload};
use telecare_emr::{care_type, Device};

use super::forward_raw;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::ApiState;

/// `GET /v1/cameras/:device_id/actions/get_status`
pub async fn get_status(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<DeviceId>,
) -> Result<Response, ApiError> {
    let camera = lookup_camera(&state, &device_id)?;
    let raw = state.camera_actions.get_status(&user, &camera).await?;
    Ok(forward_raw(raw))
}

/// `GET /v1/cameras/:device_id/actions/get_presets`
pub async fn get_presets(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<DeviceId>,
) -> Result<Response, ApiError> {
    let camera = lookup_camera(&state, &device_id)?;
    let raw = state.camera_actions.get_presets(&user, &camera).await?;
    Ok(forward_raw(raw))
}

/// `POST /v1/cameras/:device_id/actions/goto_preset`
pub async fn goto_preset(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<DeviceId>,
    Json(request): Json<GotoPresetRequest>,
) -> Result<Response, ApiError> {
    let camera = lookup_camera(&state, &device_id)?;
    let raw = state
        .camera_actions
        .goto_preset(&user, &camera, request)
        .await?;
    Ok(forward_raw(raw))
}

/// `POST /v1/cameras/:device_id/actions/absolute_move`
pub async fn absolute_move(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<DeviceId>,
    Json(ptz): Json<PtzPayload>,
) -> Result<Response, ApiError> {
    let camera = lookup_camera(&state, &device_id)?;
    let raw = state
        .camera_actions
        .absolute_move(&user, &camera, ptz)
        .await?;
    Ok(forward_raw(raw))
}

/// `POST /v1/cameras/:device_id/actions/relative_move`
pub async fn relative_move(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<DeviceId>,
    Json(ptz): Json<PtzPayload>,
) -> Result<Response, ApiError> {
    let camera = lookup_camera(&state, &device_id)?;
    let raw = state
        .camera_actions
        .relative_move(&user, &camera, ptz)
        .await?;
    Ok(forward_raw(raw))
}

/// `GET /v1/cameras/:device_id/actions/stream_token`
pub async fn stream_token(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<DeviceId>,
) -> Result<Response, ApiError> {
    let camera = lookup_camera(&state, &device_id)?;
    let raw = state.camera_actions.stream_token(&user, &camera).await?;
    Ok(forward_raw(raw))
}

pub(crate) fn lookup_camera(state: &ApiState, device_id: &DeviceId) -> Result<Device, ApiError> {
    state
        .devices
        .find_device(device_id, care_type::CAMERA)?
        .ok_or_else(|| ApiError::NotFound(format!("camera {device_id}")))
}
