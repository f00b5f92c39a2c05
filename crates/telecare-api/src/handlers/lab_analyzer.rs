//! Lab-analyzer action endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use telecare_core::{DeviceId, ReportId, ValidationError};
use telecare_emr::{care_type, Device};

use super::forward_raw;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::ApiState;

/// Body for ordering a test.
#[derive(Debug, Deserialize)]
pub struct OrderTestBody {
    /// Diagnostic report the order originates from.
    #[serde(default)]
    pub diagnostic_report: Option<ReportId>,
}

/// `GET /v1/lab-analyzers/:device_id/actions/get_status`
pub async fn get_status(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(device_id): Path<DeviceId>,
) -> Result<Response, ApiError> {
    let analyzer = lookup_analyzer(&state, &device_id)?;
    let raw = state.lab_actions.get_status(&analyzer).await?;
    Ok(forward_raw(raw))
}

/// `POST /v1/lab-analyzers/:device_id/actions/order_test`
pub async fn order_test(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(device_id): Path<DeviceId>,
    Json(body): Json<OrderTestBody>,
) -> Result<Response, ApiError> {
    let analyzer = lookup_analyzer(&state, &device_id)?;
    let report = body.diagnostic_report.ok_or_else(|| {
        ApiError::from(ValidationError::single(
            "diagnostic_report",
            "This field is required.",
        ))
    })?;
    let raw = state.lab_actions.order_test(&analyzer, &report).await?;
    Ok(forward_raw(raw))
}

/// `GET /v1/lab-analyzers/:device_id/actions/get_results`
///
/// The optional body is forwarded opaquely toward the gateway.
pub async fn get_results(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(device_id): Path<DeviceId>,
    body: Option<Json<Value>>,
) -> Result<Response, ApiError> {
    let analyzer = lookup_analyzer(&state, &device_id)?;
    let passthrough = body.map_or(Value::Object(serde_json::Map::new()), |Json(v)| v);
    let raw = state
        .lab_actions
        .get_results(&analyzer, &passthrough)
        .await?;
    Ok(forward_raw(raw))
}

/// `POST /v1/lab-analyzers/:device_id/actions/clear_results`
pub async fn clear_results(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(device_id): Path<DeviceId>,
    body: Option<Json<Value>>,
) -> Result<Response, ApiError> {
    let analyzer = lookup_analyzer(&state, &device_id)?;
    let passthrough = body.map_or(Value::Object(serde_json::Map::new()), |Json(v)| v);
    let raw = state
        .lab_actions
        .clear_results(&analyzer, &passthrough)
        .await?;
    Ok(forward_raw(raw))
}

fn lookup_analyzer(state: &ApiState, device_id: &DeviceId) -> Result<Device, ApiError> {
    state
        .devices
        .find_device(device_id, care_type::LAB_ANALYZER)?
        .ok_or_else(|| ApiError::NotFound(format!("lab analyzer {device_id}")))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_server, TestContext};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn order_test_requires_report_field() {
        let ctx = TestContext::new();
        let gateway = ctx.seed_gateway("gw.local");
        let analyzer = ctx.seed_analyzer(&gateway);
        let server = test_server(&ctx);

        let response = server
            .post(&format!(
                "/v1/lab-analyzers/{}/actions/order_test",
                analyzer.id
            ))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .json(&json!({}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"]["fields"]["diagnostic_report"][0],
            "This field is required."
        );
    }

    #[tokio::test]
    async fn status_reports_missing_config_per_field() {
        let ctx = TestContext::new();
        let gateway = ctx.seed_gateway("gw.local");
        let mut analyzer = ctx.seed_analyzer(&gateway);
        analyzer.metadata.remove("port");
        telecare_emr::DeviceStore::put_device(ctx.store.as_ref(), &analyzer).unwrap();

        let server = test_server(&ctx);
        let response = server
            .get(&format!(
                "/v1/lab-analyzers/{}/actions/get_status",
                analyzer.id
            ))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["fields"]["port"][0], "Not configured");
    }

    #[tokio::test]
    async fn wrong_care_type_is_not_found() {
        let ctx = TestContext::new();
        let gateway = ctx.seed_gateway("gw.local");
        let camera = ctx.seed_camera(&gateway);
        let server = test_server(&ctx);

        let response = server
            .get(&format!(
                "/v1/lab-analyzers/{}/actions/get_status",
                camera.id
            ))
            .add_header(ctx.user_header().0, ctx.user_header().1)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
