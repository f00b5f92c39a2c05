//! Camera position preset endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use telecare_core::{DeviceId, LocationId, PresetId};
use telecare_devices::camera::PresetParams;
use telecare_emr::{PositionPreset, PtzPosition};

use super::camera::lookup_camera;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::ApiState;

/// Filter for preset listing.
#[derive(Debug, Deserialize)]
pub struct ListPresetsQuery {
    /// Restrict to one location.
    #[serde(default)]
    pub location: Option<LocationId>,
}

/// A preset in API responses.
#[derive(Debug, Serialize)]
pub struct PresetResponse {
    /// External id.
    pub id: PresetId,
    /// Human-readable name.
    pub name: String,
    /// Owning location.
    pub location: LocationId,
    /// Saved orientation.
    pub ptz: PtzPosition,
    /// Default flag for the (camera, location) pair.
    pub is_default: bool,
    /// Ordering hint.
    pub sort_index: u16,
}

impl From<PositionPreset> for PresetResponse {
    fn from(preset: PositionPreset) -> Self {
        Self {
            id: preset.id,
            name: preset.name,
            location: preset.location,
            ptz: preset.ptz,
            is_default: preset.is_default,
            sort_index: preset.sort_index,
        }
    }
}

/// `POST /v1/cameras/:camera_id/position_presets`
pub async fn create_preset(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(camera_id): Path<DeviceId>,
    Json(params): Json<PresetParams>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = lookup_camera(&state, &camera_id)?;
    let preset = state.presets.create(&camera, params)?;
    Ok((StatusCode::CREATED, Json(PresetResponse::from(preset))))
}

/// `GET /v1/cameras/:camera_id/position_presets`
pub async fn list_presets(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(camera_id): Path<DeviceId>,
    Query(query): Query<ListPresetsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = lookup_camera(&state, &camera_id)?;
    let presets = state.presets.list(&camera, query.location.as_ref())?;
    Ok(Json(
        presets
            .into_iter()
            .map(PresetResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// `GET /v1/cameras/:camera_id/position_presets/:preset_id`
pub async fn get_preset(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path((camera_id, preset_id)): Path<(DeviceId, PresetId)>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = lookup_camera(&state, &camera_id)?;
    let preset = state.presets.get(&camera, &preset_id)?;
    Ok(Json(PresetResponse::from(preset)))
}

/// `PUT /v1/cameras/:camera_id/position_presets/:preset_id`
pub async fn update_preset(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path((camera_id, preset_id)): Path<(DeviceId, PresetId)>,
    Json(params): Json<PresetParams>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = lookup_camera(&state, &camera_id)?;
    let preset = state.presets.update(&camera, &preset_id, params)?;
    Ok(Json(PresetResponse::from(preset)))
}

/// `DELETE /v1/cameras/:camera_id/position_presets/:preset_id`
pub async fn delete_preset(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path((camera_id, preset_id)): Path<(DeviceId, PresetId)>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = lookup_camera(&state, &camera_id)?;
    state.presets.delete(&camera, &preset_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/cameras/:camera_id/position_presets/:preset_id/set_default`
pub async fn set_default(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path((camera_id, preset_id)): Path<(DeviceId, PresetId)>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = lookup_camera(&state, &camera_id)?;
    let outcome = state.presets.set_default(&camera, &preset_id)?;
    Ok(Json(serde_json::json!({ "status": outcome })))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_server, TestContext};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn preset_lifecycle() {
        let ctx = TestContext::new();
        let gateway = ctx.seed_gateway("gw.local");
        let camera = ctx.seed_camera(&gateway);
        let location = ctx.seed_location();
        let server = test_server(&ctx);

        // Create without explicit sort index.
        let response = server
            .post(&format!("/v1/cameras/{}/position_presets", camera.id))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .json(&json!({
                "name": "head-on",
                "location": location.id.to_string(),
                "ptz": {"x": 0.0, "y": 0.0, "zoom": 1.0},
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let first: Value = response.json();
        assert_eq!(first["sort_index"], 1);
        assert_eq!(first["is_default"], false);

        let response = server
            .post(&format!("/v1/cameras/{}/position_presets", camera.id))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .json(&json!({
                "name": "side",
                "location": location.id.to_string(),
                "ptz": {"x": 0.5, "y": 0.0, "zoom": 1.0},
            }))
            .await;
        let second: Value = response.json();
        assert_eq!(second["sort_index"], 2);

        // Promote the second preset to default.
        let response = server
            .post(&format!(
                "/v1/cameras/{}/position_presets/{}/set_default",
                camera.id,
                second["id"].as_str().unwrap()
            ))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], "updated");

        // Promoting again reports already-default.
        let response = server
            .post(&format!(
                "/v1/cameras/{}/position_presets/{}/set_default",
                camera.id,
                second["id"].as_str().unwrap()
            ))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .await;
        assert_eq!(response.json::<Value>()["status"], "already_default");

        // Delete.
        let response = server
            .delete(&format!(
                "/v1/cameras/{}/position_presets/{}",
                camera.id,
                first["id"].as_str().unwrap()
            ))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        let response = server
            .get(&format!("/v1/cameras/{}/position_presets", camera.id))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .await;
        let remaining: Value = response.json();
        assert_eq!(remaining.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_location_is_field_keyed() {
        let ctx = TestContext::new();
        let gateway = ctx.seed_gateway("gw.local");
        let camera = ctx.seed_camera(&gateway);
        let server = test_server(&ctx);

        let response = server
            .post(&format!("/v1/cameras/{}/position_presets", camera.id))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .json(&json!({
                "name": "head-on",
                "location": telecare_core::LocationId::generate().to_string(),
                "ptz": {"x": 0.0, "y": 0.0, "zoom": 1.0},
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"]["fields"]["location"][0].is_string());
    }
}
