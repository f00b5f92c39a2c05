//! Request extractors for caller identity.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use telecare_auth::{AuthVariant, Principal, GATEWAY_ID_HEADER};
use telecare_core::UserId;
use telecare_emr::care_type;

use crate::error::ApiError;
use crate::state::ApiState;

/// Header carrying the host-authenticated user id.
///
/// The host EMR fronts these routes and injects the identity of the user
/// it already authenticated; the plugins never see user credentials.
pub const REMOTE_USER_HEADER: &str = "X-Remote-User";

/// The host-authenticated platform user.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(REMOTE_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self(user))
    }
}

/// A caller authenticated through the middleware contract
/// (`Authorization: Middleware_Bearer <jwt>` + `X-Gateway-Id`).
#[derive(Debug, Clone)]
pub struct MiddlewareAuth(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for MiddlewareAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_variant(parts, state, AuthVariant::Middleware)
            .await
            .map(Self)
    }
}

/// A caller authenticated through the gateway contract
/// (`Authorization: Gateway_Bearer <jwt>` + `X-Gateway-Id`).
#[derive(Debug, Clone)]
pub struct GatewayAuth(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for GatewayAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_variant(parts, state, AuthVariant::Gateway)
            .await
            .map(Self)
    }
}

async fn authenticate_variant(
    parts: &Parts,
    state: &Arc<ApiState>,
    variant: AuthVariant,
) -> Result<Principal, ApiError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = variant
        .raw_token(header)?
        .ok_or(ApiError::Unauthorized)?;

    let gateway_id = parts
        .headers
        .get(GATEWAY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?
        .parse()
        .map_err(|_| ApiError::InvalidGateway)?;

    let gateway = state
        .devices
        .find_device(&gateway_id, care_type::GATEWAY)
        .map_err(ApiError::from)?
        .ok_or(ApiError::InvalidGateway)?;

    let principal = state.verifier.authenticate(variant, &gateway, token).await?;
    Ok(principal)
}
