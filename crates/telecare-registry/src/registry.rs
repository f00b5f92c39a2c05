//! The process-wide device-type registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::handler::DeviceTypeHandler;

/// Mapping from care-type tag to handler.
///
/// Built mutably during plugin initialization, then [`sealed`] and shared
/// behind an `Arc`. Registration after sealing is an error rather than a
/// convention: the registry must never change under concurrent request
/// load.
///
/// [`sealed`]: DeviceTypeRegistry::seal
#[derive(Default)]
pub struct DeviceTypeRegistry {
    handlers: HashMap<String, Arc<dyn DeviceTypeHandler>>,
    sealed: bool,
}

impl DeviceTypeRegistry {
    /// Create an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Sealed` after [`DeviceTypeRegistry::seal`],
    /// and `RegistryError::DuplicateType` when the tag is already taken.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        handler: Arc<dyn DeviceTypeHandler>,
    ) -> Result<(), RegistryError> {
        let tag = tag.into();
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if self.handlers.contains_key(&tag) {
            return Err(RegistryError::DuplicateType(tag));
        }

        tracing::info!(device_type = %tag, "Registered device type");
        self.handlers.insert(tag, handler);
        Ok(())
    }

    /// Look up the handler for a tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownType` when no handler is registered.
    pub fn get_handler(&self, tag: &str) -> Result<Arc<dyn DeviceTypeHandler>, RegistryError> {
        self.handlers
            .get(tag)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownType(tag.to_string()))
    }

    /// Assert a prerequisite tag is registered, on behalf of `plugin`.
    ///
    /// Dependent plugins call this before their own registration so a
    /// missing prerequisite aborts initialization with a clear message
    /// instead of surfacing at request time.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::MissingDependency` when the tag is absent.
    pub fn require(
        &self,
        plugin: &'static str,
        requires: &'static str,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(requires) {
            Ok(())
        } else {
            Err(RegistryError::MissingDependency { plugin, requires })
        }
    }

    /// Forbid further registration.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// True once [`DeviceTypeRegistry::seal`] has been called.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Registered tags, in no particular order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}
