//! Storage boundary error types.

use telecare_core::{DeviceId, LocationId, PresetId, ReportId};
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors crossing the host-EMR storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced device does not exist.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The referenced location does not exist.
    #[error("location not found: {0}")]
    LocationNotFound(LocationId),

    /// The referenced position preset does not exist.
    #[error("position preset not found: {0}")]
    PresetNotFound(PresetId),

    /// The referenced diagnostic report does not exist.
    #[error("diagnostic report not found: {0}")]
    ReportNotFound(ReportId),

    /// The host storage layer failed.
    #[error("storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// True when the error denotes a missing record rather than a fault.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound(_)
                | Self::LocationNotFound(_)
                | Self::PresetNotFound(_)
                | Self::ReportNotFound(_)
        )
    }
}
