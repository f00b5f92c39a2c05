//! In-memory reference implementation of the storage traits.
//!
//! Backs tests and local development. The preset map sits behind a
//! `Mutex` rather than an `RwLock` so `promote_default` gets the same
//! mutual exclusion a database transaction gives the host implementation.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use telecare_core::{DeviceId, LocationId, PresetId, ReportId};

use crate::error::{Result, StoreError};
use crate::store::{DeviceStore, ObservationSink, PresetStore, ReportStore};
use crate::types::{Device, FacilityLocation, Metadata, PositionPreset};

/// In-memory store implementing every host-EMR trait.
#[derive(Default)]
pub struct MemoryStore {
    devices: RwLock<HashMap<DeviceId, Device>>,
    locations: RwLock<HashMap<LocationId, FacilityLocation>>,
    presets: Mutex<HashMap<PresetId, PositionPreset>>,
    reports: RwLock<HashMap<ReportId, Value>>,
    observations: RwLock<Vec<(DeviceId, Value)>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a diagnostic report.
    pub fn put_report(&self, id: ReportId, report: Value) {
        self.reports.write().insert(id, report);
    }

    /// Observations recorded so far, oldest first.
    #[must_use]
    pub fn recorded_observations(&self) -> Vec<(DeviceId, Value)> {
        self.observations.read().clone()
    }
}

impl DeviceStore for MemoryStore {
    fn put_device(&self, device: &Device) -> Result<()> {
        self.devices.write().insert(device.id, device.clone());
        Ok(())
    }

    fn get_device(&self, id: &DeviceId) -> Result<Option<Device>> {
        Ok(self.devices.read().get(id).cloned())
    }

    fn find_device(&self, id: &DeviceId, care_type: &str) -> Result<Option<Device>> {
        Ok(self
            .devices
            .read()
            .get(id)
            .filter(|d| !d.deleted && d.care_type == care_type)
            .cloned())
    }

    fn save_metadata(&self, id: &DeviceId, metadata: &Metadata) -> Result<()> {
        let mut devices = self.devices.write();
        let device = devices.get_mut(id).ok_or(StoreError::DeviceNotFound(*id))?;
        device.metadata = metadata.clone();
        device.updated_at = Utc::now();
        Ok(())
    }

    fn clear_encounter(&self, id: &DeviceId) -> Result<()> {
        let mut devices = self.devices.write();
        let device = devices.get_mut(id).ok_or(StoreError::DeviceNotFound(*id))?;
        device.current_encounter = None;
        device.updated_at = Utc::now();
        Ok(())
    }

    fn list_devices(&self, care_type: Option<&str>) -> Result<Vec<Device>> {
        let mut devices: Vec<Device> = self
            .devices
            .read()
            .values()
            .filter(|d| !d.deleted)
            .filter(|d| care_type.map_or(true, |ct| d.care_type == ct))
            .cloned()
            .collect();
        devices.sort_by_key(|d| d.created_at);
        Ok(devices)
    }

    fn devices_at_location(&self, location: &LocationId, care_type: &str) -> Result<Vec<Device>> {
        Ok(self
            .devices
            .read()
            .values()
            .filter(|d| {
                !d.deleted && d.care_type == care_type && d.current_location == Some(*location)
            })
            .cloned()
            .collect())
    }

    fn devices_by_gateway(&self, gateway: &DeviceId, care_type: &str) -> Result<Vec<Device>> {
        Ok(self
            .devices
            .read()
            .values()
            .filter(|d| {
                !d.deleted && d.care_type == care_type && d.gateway_ref() == Some(*gateway)
            })
            .cloned()
            .collect())
    }

    fn put_location(&self, location: &FacilityLocation) -> Result<()> {
        self.locations.write().insert(location.id, location.clone());
        Ok(())
    }

    fn get_location(&self, id: &LocationId) -> Result<Option<FacilityLocation>> {
        Ok(self.locations.read().get(id).cloned())
    }
}

impl PresetStore for MemoryStore {
    fn put_preset(&self, preset: &PositionPreset) -> Result<()> {
        self.presets.lock().insert(preset.id, preset.clone());
        Ok(())
    }

    fn get_preset(&self, id: &PresetId) -> Result<Option<PositionPreset>> {
        Ok(self.presets.lock().get(id).filter(|p| !p.deleted).cloned())
    }

    fn delete_preset(&self, id: &PresetId) -> Result<()> {
        let mut presets = self.presets.lock();
        let preset = presets.get_mut(id).ok_or(StoreError::PresetNotFound(*id))?;
        preset.deleted = true;
        preset.updated_at = Utc::now();
        Ok(())
    }

    fn list_presets(
        &self,
        camera: &DeviceId,
        location: Option<&LocationId>,
    ) -> Result<Vec<PositionPreset>> {
        let mut presets: Vec<PositionPreset> = self
            .presets
            .lock()
            .values()
            .filter(|p| !p.deleted && p.camera == *camera)
            .filter(|p| location.map_or(true, |l| p.location == *l))
            .cloned()
            .collect();
        presets.sort_by_key(|p| p.sort_index);
        Ok(presets)
    }

    fn max_sort_index(&self, location: &LocationId) -> Result<u16> {
        Ok(self
            .presets
            .lock()
            .values()
            .filter(|p| !p.deleted && p.location == *location)
            .map(|p| p.sort_index)
            .max()
            .unwrap_or(0))
    }

    fn promote_default(&self, id: &PresetId) -> Result<()> {
        // Single lock section stands in for the host's DB transaction:
        // clear competing defaults first, then set the target.
        let mut presets = self.presets.lock();
        let target = presets
            .get(id)
            .filter(|p| !p.deleted)
            .ok_or(StoreError::PresetNotFound(*id))?;
        let (camera, location) = (target.camera, target.location);

        let now = Utc::now();
        for preset in presets.values_mut() {
            if preset.camera == camera && preset.location == location && preset.is_default {
                preset.is_default = false;
                preset.updated_at = now;
            }
        }
        let target = presets
            .get_mut(id)
            .ok_or(StoreError::PresetNotFound(*id))?;
        target.is_default = true;
        target.updated_at = now;
        Ok(())
    }

    fn delete_orphaned(&self) -> Result<u64> {
        let dead_device = |id: &DeviceId| {
            self.devices
                .read()
                .get(id)
                .map_or(true, |d| d.deleted)
        };
        let dead_location = |id: &LocationId| {
            self.locations
                .read()
                .get(id)
                .map_or(true, |l| l.deleted)
        };

        let mut removed = 0;
        let now = Utc::now();
        for preset in self.presets.lock().values_mut() {
            if !preset.deleted && (dead_device(&preset.camera) || dead_location(&preset.location)) {
                preset.deleted = true;
                preset.updated_at = now;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl ReportStore for MemoryStore {
    fn get_report(&self, id: &ReportId) -> Result<Option<Value>> {
        Ok(self.reports.read().get(id).cloned())
    }
}

impl ObservationSink for MemoryStore {
    fn record(&self, device: &Device, observations: Vec<Value>) -> Result<()> {
        let mut recorded = self.observations.write();
        for observation in observations {
            recorded.push((device.id, observation));
        }
        Ok(())
    }
}
