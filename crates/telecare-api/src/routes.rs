//! Router configuration.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{camera, devices, health, lab_analyzer, presets, vitals, well_known};
use crate::state::ApiState;

/// Create the API router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health`
/// - `GET /.well-known/jwks.json` — platform key set, 24 h cacheable
///
/// ## Devices (host-authenticated user)
/// - `POST /v1/devices` / `GET /v1/devices`
/// - `GET|PUT /v1/devices/:device_id`
/// - `POST /v1/devices/:device_id/actions/:action`
///
/// ## Camera actions (host-authenticated user + capability checks)
/// - `GET /v1/cameras/:device_id/actions/{get_status,get_presets,stream_token}`
/// - `POST /v1/cameras/:device_id/actions/{goto_preset,absolute_move,relative_move}`
///
/// ## Position presets (host-authenticated user)
/// - `GET|POST /v1/cameras/:device_id/position_presets`
/// - `GET|PUT|DELETE /v1/cameras/:device_id/position_presets/:preset_id`
/// - `POST /v1/cameras/:device_id/position_presets/:preset_id/set_default`
///
/// ## Lab analyzer actions (host-authenticated user)
/// - `GET /v1/lab-analyzers/:device_id/actions/{get_status,get_results}`
/// - `POST /v1/lab-analyzers/:device_id/actions/{order_test,clear_results}`
///
/// ## Automated observations (middleware-authenticated)
/// - `GET /v1/vitals/automated_observations/devices`
/// - `POST /v1/vitals/automated_observations/devices/:device_id/record`
pub fn create_router(state: Arc<ApiState>) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    Router::new()
        // Public
        .route("/health", get(health::health))
        .route("/.well-known/jwks.json", get(well_known::jwks))
        // Generic device dispatch
        .route(
            "/v1/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route(
            "/v1/devices/:device_id",
            get(devices::get_device).put(devices::update_device),
        )
        .route(
            "/v1/devices/:device_id/actions/:action",
            post(devices::perform_action),
        )
        // Camera actions
        .route(
            "/v1/cameras/:device_id/actions/get_status",
            get(camera::get_status),
        )
        .route(
            "/v1/cameras/:device_id/actions/get_presets",
            get(camera::get_presets),
        )
        .route(
            "/v1/cameras/:device_id/actions/goto_preset",
            post(camera::goto_preset),
        )
        .route(
            "/v1/cameras/:device_id/actions/absolute_move",
            post(camera::absolute_move),
        )
        .route(
            "/v1/cameras/:device_id/actions/relative_move",
            post(camera::relative_move),
        )
        .route(
            "/v1/cameras/:device_id/actions/stream_token",
            get(camera::stream_token),
        )
        // Position presets
        .route(
            "/v1/cameras/:device_id/position_presets",
            get(presets::list_presets).post(presets::create_preset),
        )
        .route(
            "/v1/cameras/:device_id/position_presets/:preset_id",
            get(presets::get_preset)
                .put(presets::update_preset)
                .delete(presets::delete_preset),
        )
        .route(
            "/v1/cameras/:device_id/position_presets/:preset_id/set_default",
            post(presets::set_default),
        )
        // Lab analyzer actions
        .route(
            "/v1/lab-analyzers/:device_id/actions/get_status",
            get(lab_analyzer::get_status),
        )
        .route(
            "/v1/lab-analyzers/:device_id/actions/order_test",
            post(lab_analyzer::order_test),
        )
        .route(
            "/v1/lab-analyzers/:device_id/actions/get_results",
            get(lab_analyzer::get_results),
        )
        .route(
            "/v1/lab-analyzers/:device_id/actions/clear_results",
            post(lab_analyzer::clear_results),
        )
        // Automated observations
        .route(
            "/v1/vitals/automated_observations/devices",
            get(vitals::list_devices),
        )
        .route(
            "/v1/vitals/automated_observations/devices/:device_id/record",
            post(vitals::record_observations),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
