//! Device action error types.

use telecare_core::ValidationError;
use telecare_emr::StoreError;
use telecare_relay::RelayError;
use thiserror::Error;

/// Errors raised by device action and preset operations.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The caller lacks the required capability. Carries the intent of
    /// the missing capability, not its internal name.
    #[error("you do not have permission to {0}")]
    PermissionDenied(&'static str),

    /// Request or configuration data failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The relay call toward the gateway failed.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// The host storage layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_names_intent() {
        let err = ActionError::PermissionDenied("view the video stream");
        assert_eq!(
            err.to_string(),
            "you do not have permission to view the video stream"
        );
    }
}
