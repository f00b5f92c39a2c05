//! Automated observation endpoints for vitals devices.
//!
//! These routes are called by middleware running behind a gateway, not by
//! platform users; authentication goes through the middleware token
//! contract and every query is scoped to the calling gateway's devices.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use telecare_core::DeviceId;
use telecare_emr::care_type;

use crate::error::ApiError;
use crate::extract::MiddlewareAuth;
use crate::state::ApiState;

/// A vitals device usable for automated observations.
#[derive(Debug, Serialize)]
pub struct ObservationDevice {
    /// External id.
    pub id: DeviceId,
    /// Monitor host on the gateway's network.
    pub endpoint_address: Option<String>,
}

/// `GET /v1/vitals/automated_observations/devices`
///
/// Lists the calling gateway's vitals-observation devices that are
/// currently linked to an encounter.
pub async fn list_devices(
    State(state): State<Arc<ApiState>>,
    MiddlewareAuth(principal): MiddlewareAuth,
) -> Result<impl IntoResponse, ApiError> {
    let devices = state
        .devices
        .devices_by_gateway(&principal.gateway.id, care_type::VITALS_OBSERVATION)?;

    let out: Vec<ObservationDevice> = devices
        .into_iter()
        .filter(|d| d.current_encounter.is_some())
        .map(|d| ObservationDevice {
            id: d.id,
            endpoint_address: d.metadata_str("endpoint_address").map(str::to_string),
        })
        .collect();
    Ok(Json(out))
}

/// `POST /v1/vitals/automated_observations/devices/:device_id/record`
///
/// Records a batch of observations yielded by a device. Payload shapes
/// are owned by the host's observation pipeline; the plugin only scopes
/// the device to the calling gateway and hands the batch over.
pub async fn record_observations(
    State(state): State<Arc<ApiState>>,
    MiddlewareAuth(principal): MiddlewareAuth,
    Path(device_id): Path<DeviceId>,
    Json(observations): Json<Vec<Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state
        .devices
        .find_device(&device_id, care_type::VITALS_OBSERVATION)?
        .filter(|d| d.gateway_ref() == Some(principal.gateway.id))
        .filter(|d| d.current_encounter.is_some())
        .ok_or_else(|| ApiError::NotFound(format!("vitals device {device_id}")))?;

    let recorded = observations.len();
    state.observations.record(&device, observations)?;

    tracing::debug!(
        device = %device.id,
        gateway = %principal.gateway.id,
        recorded,
        "Recorded automated observations"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "recorded": recorded })),
    ))
}
