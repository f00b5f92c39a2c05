//! API error type and response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use telecare_auth::AuthError;
use telecare_core::ValidationError;
use telecare_devices::ActionError;
use telecare_emr::StoreError;
use telecare_registry::{HandlerError, RegistryError};
use telecare_relay::RelayError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unusable caller identity.
    #[error("unauthorized")]
    Unauthorized,

    /// A bearer token failed verification.
    #[error("given token is not valid")]
    InvalidToken,

    /// The device id accompanying a token does not name a usable gateway.
    #[error("invalid gateway device")]
    InvalidGateway,

    /// The caller lacks a capability; names the intent, not the internal
    /// permission.
    #[error("you do not have permission to {0}")]
    Forbidden(String),

    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Structured, field-keyed validation failure.
    #[error("validation failed")]
    Validation(ValidationError),

    /// Malformed request outside schema validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The device type defines no such action.
    #[error("action not implemented: {0}")]
    ActionNotAllowed(String),

    /// The gateway did not answer in time.
    #[error("gateway request timed out")]
    GatewayTimeout,

    /// The gateway could not be reached.
    #[error("failed to connect to gateway device")]
    GatewayUnreachable,

    /// The gateway rejected the relayed request.
    #[error("gateway rejected request")]
    GatewayRejected {
        /// Upstream status code.
        status: u16,
        /// Upstream body, verbatim.
        body: String,
    },

    /// The gateway answered garbage.
    #[error("invalid response from gateway device")]
    BadGateway,

    /// Internal server error; detail stays in the logs.
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidToken | Self::InvalidGateway => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ActionNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::GatewayUnreachable => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayRejected { .. } | Self::BadGateway => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidToken => "invalid_token",
            Self::InvalidGateway => "invalid_gateway",
            Self::Forbidden(_) => "permission_denied",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::ActionNotAllowed(_) => "action_not_allowed",
            Self::GatewayTimeout => "gateway_timeout",
            Self::GatewayUnreachable => "gateway_unreachable",
            Self::GatewayRejected { .. } => "gateway_rejected",
            Self::BadGateway => "bad_gateway",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });

        match &self {
            Self::Validation(err) => {
                body["error"]["fields"] = json!(err);
            }
            Self::GatewayRejected {
                status: upstream,
                body: upstream_body,
            } => {
                body["error"]["upstream_status"] = json!(upstream);
                body["error"]["upstream_body"] = json!(upstream_body);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::Rejected(_) => Self::InvalidToken,
            AuthError::InvalidGateway | AuthError::GatewayNotConfigured => Self::InvalidGateway,
            AuthError::JwksFetch(_)
            | AuthError::MalformedKeySet(_)
            | AuthError::InvalidKey(_)
            | AuthError::Signing(_) => {
                tracing::error!(error = %err, "Auth internal error");
                Self::Internal("authentication service error".to_string())
            }
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::NotConfigured(field) => {
                Self::Validation(ValidationError::missing_fields([field]))
            }
            RelayError::Timeout { .. } => Self::GatewayTimeout,
            RelayError::Unreachable(_) => Self::GatewayUnreachable,
            RelayError::UpstreamError { status, body } => Self::GatewayRejected { status, body },
            RelayError::InvalidResponse => Self::BadGateway,
            RelayError::Internal(detail) => {
                tracing::error!(error = %detail, "Relay internal error");
                Self::Internal(detail)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            tracing::error!(error = %err, "Store error");
            Self::Internal("storage error".to_string())
        }
    }
}

impl From<HandlerError> for ApiError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Validation(err) => Self::Validation(err),
            HandlerError::ActionNotImplemented { action } => Self::ActionNotAllowed(action),
            HandlerError::Store(err) => Self::from(err),
        }
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::PermissionDenied(intent) => Self::Forbidden(intent.to_string()),
            ActionError::Validation(err) => Self::Validation(err),
            ActionError::Relay(err) => Self::from(err),
            ActionError::Store(err) => Self::from(err),
            ActionError::NotFound(what) => Self::NotFound(what),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownType(tag) => Self::BadRequest(format!("unknown device type: {tag}")),
            other => {
                tracing::error!(error = %other, "Registry error at request time");
                Self::Internal("registry error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_errors_map_to_status_equivalents() {
        assert_eq!(
            ApiError::from(RelayError::Timeout { seconds: 30 }).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(RelayError::Unreachable("x".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(RelayError::InvalidResponse).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn upstream_rejection_carries_detail() {
        let err = ApiError::from(RelayError::UpstreamError {
            status: 500,
            body: "boom".into(),
        });
        match err {
            ApiError::GatewayRejected { status, ref body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            _ => panic!("wrong mapping"),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_relay_config_is_field_keyed() {
        let err = ApiError::from(RelayError::NotConfigured("endpoint_address"));
        match err {
            ApiError::Validation(v) => assert!(v.has_field("endpoint_address")),
            _ => panic!("wrong mapping"),
        }
    }

    #[test]
    fn auth_errors_collapse_uniformly() {
        assert!(matches!(
            ApiError::from(AuthError::InvalidToken),
            ApiError::InvalidToken
        ));
        assert!(matches!(
            ApiError::from(AuthError::GatewayNotConfigured),
            ApiError::InvalidGateway
        ));
    }

    #[test]
    fn action_not_implemented_is_405() {
        let err = ApiError::from(HandlerError::ActionNotImplemented {
            action: "reboot".into(),
        });
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
