//! Storage traits consumed from the host EMR.
//!
//! These traits describe exactly the persistence surface the plugins
//! need; the host platform supplies the production implementation, and
//! [`crate::MemoryStore`] supplies the in-process one.

use serde_json::Value;

use telecare_core::{DeviceId, LocationId, PresetId, ReportId};

use crate::error::Result;
use crate::types::{Device, FacilityLocation, Metadata, PositionPreset};

/// Device and location lookup/persistence operations.
pub trait DeviceStore: Send + Sync {
    /// Insert or replace a device record.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn put_device(&self, device: &Device) -> Result<()>;

    /// Get a device by external id.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn get_device(&self, id: &DeviceId) -> Result<Option<Device>>;

    /// Get a device by external id, constrained to a care type.
    ///
    /// Soft-deleted devices are never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn find_device(&self, id: &DeviceId, care_type: &str) -> Result<Option<Device>>;

    /// Persist only the metadata field of a device.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DeviceNotFound` if the device doesn't exist.
    fn save_metadata(&self, id: &DeviceId, metadata: &Metadata) -> Result<()>;

    /// Unlink a device from its current encounter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DeviceNotFound` if the device doesn't exist.
    fn clear_encounter(&self, id: &DeviceId) -> Result<()>;

    /// List non-deleted devices, optionally constrained to a care type.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn list_devices(&self, care_type: Option<&str>) -> Result<Vec<Device>>;

    /// List non-deleted devices of a care type placed at a location.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn devices_at_location(&self, location: &LocationId, care_type: &str) -> Result<Vec<Device>>;

    /// List non-deleted devices of a care type whose metadata references
    /// the given gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn devices_by_gateway(&self, gateway: &DeviceId, care_type: &str) -> Result<Vec<Device>>;

    /// Insert or replace a location record.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn put_location(&self, location: &FacilityLocation) -> Result<()>;

    /// Get a location by external id.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn get_location(&self, id: &LocationId) -> Result<Option<FacilityLocation>>;
}

/// Camera position preset persistence operations.
pub trait PresetStore: Send + Sync {
    /// Insert or replace a preset record.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn put_preset(&self, preset: &PositionPreset) -> Result<()>;

    /// Get a non-deleted preset by external id.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn get_preset(&self, id: &PresetId) -> Result<Option<PositionPreset>>;

    /// Soft-delete a preset.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PresetNotFound` if the preset doesn't exist.
    fn delete_preset(&self, id: &PresetId) -> Result<()>;

    /// List non-deleted presets of a camera, optionally filtered by
    /// location, ordered by sort index.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn list_presets(
        &self,
        camera: &DeviceId,
        location: Option<&LocationId>,
    ) -> Result<Vec<PositionPreset>>;

    /// Highest sort index among non-deleted presets at a location,
    /// `0` when none exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn max_sort_index(&self, location: &LocationId) -> Result<u16>;

    /// Make the given preset the sole default for its (camera, location)
    /// pair.
    ///
    /// Implementations MUST run this as one atomic transaction: clear the
    /// default flag on every other preset sharing the pair, then set the
    /// target's flag. Concurrent callers must never observe two defaults.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PresetNotFound` if the preset doesn't exist.
    fn promote_default(&self, id: &PresetId) -> Result<()>;

    /// Soft-delete presets whose camera or location has been soft-deleted.
    /// Returns the number of presets removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn delete_orphaned(&self) -> Result<u64>;
}

/// Diagnostic report lookup, serialized by the host.
pub trait ReportStore: Send + Sync {
    /// Get a diagnostic report in its host-serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn get_report(&self, id: &ReportId) -> Result<Option<Value>>;
}

/// Sink for automated observations recorded on behalf of a device.
pub trait ObservationSink: Send + Sync {
    /// Hand a batch of observation payloads to the host for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if the host storage layer fails.
    fn record(&self, device: &Device, observations: Vec<Value>) -> Result<()>;
}
