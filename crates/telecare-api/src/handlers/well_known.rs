//! Published discovery endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::state::ApiState;

/// How long clients may cache the platform key set.
const JWKS_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// `GET /.well-known/jwks.json` — the platform's public key set.
///
/// Unauthenticated; gateways fetch it to verify platform-signed relay
/// tokens.
pub async fn jwks(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    (
        [(
            header::CACHE_CONTROL,
            format!("public, max-age={JWKS_MAX_AGE_SECS}"),
        )],
        Json(state.issuer.public_jwks().clone()),
    )
}
