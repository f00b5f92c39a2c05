//! Registry and handler error types.

use telecare_core::ValidationError;
use telecare_emr::StoreError;
use thiserror::Error;

/// Errors raised while building or consulting the registry.
///
/// Registration-time variants (`DuplicateType`, `Sealed`,
/// `MissingDependency`) are startup-integrity failures and abort plugin
/// initialization; `UnknownType` is the one runtime variant and must stay
/// distinguishable from them so dependent plugins can detect a missing
/// prerequisite at startup rather than failing at request time.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A handler is already registered for this tag.
    #[error("device type already registered: {0}")]
    DuplicateType(String),

    /// No handler is registered for this tag.
    #[error("unknown device type: {0}")]
    UnknownType(String),

    /// A plugin's prerequisite device type was never registered.
    #[error("plugin {plugin} requires the {requires} device type; ensure its plugin is installed and registered first")]
    MissingDependency {
        /// The plugin that failed to initialize.
        plugin: &'static str,
        /// The tag it requires.
        requires: &'static str,
    },

    /// Registration was attempted after the registry was sealed.
    #[error("registry is sealed; registration is only allowed during plugin initialization")]
    Sealed,
}

/// Errors raised by device-type handler operations.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Metadata failed schema validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The device type defines no such action.
    #[error("action not implemented: {action}")]
    ActionNotImplemented {
        /// The requested action name.
        action: String,
    },

    /// The host storage layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
