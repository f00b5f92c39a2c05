//! Request handlers.

pub mod camera;
pub mod devices;
pub mod health;
pub mod lab_analyzer;
pub mod presets;
pub mod vitals;
pub mod well_known;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use telecare_relay::RawResponse;

/// Forward a relay passthrough response verbatim: upstream status,
/// content type and body untouched.
pub(crate) fn forward_raw(raw: RawResponse) -> Response {
    let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, [(header::CONTENT_TYPE, raw.content_type)], raw.body).into_response()
}
