//! Camera position preset management.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use telecare_core::{LocationId, PresetId, ValidationError};
use telecare_emr::{Device, DeviceStore, PositionPreset, PresetStore, PtzPosition};

use crate::error::ActionError;

/// Lowest allowed sort index.
pub const MIN_SORT_INDEX: u16 = 0;

/// Highest allowed sort index.
pub const MAX_SORT_INDEX: u16 = 10000;

/// Create/update parameters for a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetParams {
    /// Human-readable name.
    pub name: String,
    /// Owning location.
    pub location: LocationId,
    /// Saved orientation.
    pub ptz: PtzPosition,
    /// Explicit sort index; auto-assigned per location when absent.
    #[serde(default)]
    pub sort_index: Option<u16>,
}

/// Outcome of a set-default call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetDefaultOutcome {
    /// The preset was already the default; nothing changed.
    AlreadyDefault,
    /// The default flag moved to this preset.
    Updated,
}

/// Position preset operations scoped to one camera.
pub struct PresetService {
    presets: Arc<dyn PresetStore>,
    devices: Arc<dyn DeviceStore>,
}

impl PresetService {
    /// Create the service.
    #[must_use]
    pub fn new(presets: Arc<dyn PresetStore>, devices: Arc<dyn DeviceStore>) -> Self {
        Self { presets, devices }
    }

    /// Create a preset for `camera`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown location or an
    /// out-of-range sort index.
    pub fn create(&self, camera: &Device, params: PresetParams) -> Result<PositionPreset, ActionError> {
        self.validate_location(&params.location)?;
        let sort_index = self.resolve_sort_index(&params.location, params.sort_index)?;

        let now = Utc::now();
        let preset = PositionPreset {
            id: PresetId::generate(),
            name: params.name,
            camera: camera.id,
            location: params.location,
            ptz: params.ptz,
            is_default: false,
            sort_index,
            created_at: now,
            updated_at: now,
            deleted: false,
        };
        self.presets.put_preset(&preset)?;
        Ok(preset)
    }

    /// Update a preset belonging to `camera`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` when the preset doesn't belong to
    /// the camera, plus the validation failures of
    /// [`PresetService::create`].
    pub fn update(
        &self,
        camera: &Device,
        preset_id: &PresetId,
        params: PresetParams,
    ) -> Result<PositionPreset, ActionError> {
        let mut preset = self.owned_preset(camera, preset_id)?;
        self.validate_location(&params.location)?;
        if let Some(index) = params.sort_index {
            validate_sort_index(index)?;
            preset.sort_index = index;
        }

        preset.name = params.name;
        preset.location = params.location;
        preset.ptz = params.ptz;
        preset.updated_at = Utc::now();
        self.presets.put_preset(&preset)?;
        Ok(preset)
    }

    /// Soft-delete a preset belonging to `camera`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` when the preset doesn't belong to
    /// the camera.
    pub fn delete(&self, camera: &Device, preset_id: &PresetId) -> Result<(), ActionError> {
        let preset = self.owned_preset(camera, preset_id)?;
        self.presets.delete_preset(&preset.id)?;
        Ok(())
    }

    /// Fetch one preset belonging to `camera`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` when the preset doesn't belong to
    /// the camera.
    pub fn get(&self, camera: &Device, preset_id: &PresetId) -> Result<PositionPreset, ActionError> {
        self.owned_preset(camera, preset_id)
    }

    /// List `camera`'s presets, optionally filtered by location.
    ///
    /// # Errors
    ///
    /// Returns an error when the host storage layer fails.
    pub fn list(
        &self,
        camera: &Device,
        location: Option<&LocationId>,
    ) -> Result<Vec<PositionPreset>, ActionError> {
        Ok(self.presets.list_presets(&camera.id, location)?)
    }

    /// Make a preset the default for its (camera, location) pair.
    ///
    /// Already-default presets are a no-op; otherwise the store's
    /// transactional promote clears every competing flag before setting
    /// this one, so no reader ever observes two defaults.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` when the preset doesn't belong to
    /// the camera.
    pub fn set_default(
        &self,
        camera: &Device,
        preset_id: &PresetId,
    ) -> Result<SetDefaultOutcome, ActionError> {
        let preset = self.owned_preset(camera, preset_id)?;
        if preset.is_default {
            return Ok(SetDefaultOutcome::AlreadyDefault);
        }
        self.presets.promote_default(&preset.id)?;
        Ok(SetDefaultOutcome::Updated)
    }

    /// Soft-delete presets whose camera or location has been deleted.
    /// Runs from the daily cleanup task.
    ///
    /// # Errors
    ///
    /// Returns an error when the host storage layer fails.
    pub fn cleanup_orphaned(&self) -> Result<u64, ActionError> {
        let removed = self.presets.delete_orphaned()?;
        if removed > 0 {
            tracing::info!(removed, "Cleaned up orphaned position presets");
        }
        Ok(removed)
    }

    fn owned_preset(
        &self,
        camera: &Device,
        preset_id: &PresetId,
    ) -> Result<PositionPreset, ActionError> {
        self.presets
            .get_preset(preset_id)?
            .filter(|p| p.camera == camera.id)
            .ok_or_else(|| ActionError::NotFound(format!("position preset {preset_id}")))
    }

    fn validate_location(&self, location: &LocationId) -> Result<(), ActionError> {
        let found = self
            .devices
            .get_location(location)?
            .filter(|l| !l.deleted);
        if found.is_none() {
            return Err(ValidationError::single("location", "Location does not exist").into());
        }
        Ok(())
    }

    fn resolve_sort_index(
        &self,
        location: &LocationId,
        explicit: Option<u16>,
    ) -> Result<u16, ActionError> {
        match explicit {
            Some(index) => {
                validate_sort_index(index)?;
                Ok(index)
            }
            None => {
                let max = self.presets.max_sort_index(location)?;
                Ok(max.saturating_add(1).min(MAX_SORT_INDEX))
            }
        }
    }
}

fn validate_sort_index(index: u16) -> Result<(), ActionError> {
    if index > MAX_SORT_INDEX {
        return Err(ValidationError::single(
            "sort_index",
            format!("must be between {MIN_SORT_INDEX} and {MAX_SORT_INDEX}"),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telecare_core::OrganizationId;
    use telecare_emr::{care_type, FacilityLocation, MemoryStore};

    struct Fixture {
        service: PresetService,
        camera: Device,
        location: FacilityLocation,
    }

    fn setup() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let org = OrganizationId::generate();
        let camera = Device::new(care_type::CAMERA, org);
        store.put_device(&camera).unwrap();
        let location = FacilityLocation::new(org);
        store.put_location(&location).unwrap();

        Fixture {
            service: PresetService::new(store.clone(), store),
            camera,
            location,
        }
    }

    fn params(f: &Fixture, name: &str) -> PresetParams {
        PresetParams {
            name: name.into(),
            location: f.location.id,
            ptz: PtzPosition {
                x: 0.5,
                y: -0.25,
                zoom: 2.0,
            },
            sort_index: None,
        }
    }

    #[test]
    fn auto_sort_index_increases_from_one() {
        let f = setup();
        let first = f.service.create(&f.camera, params(&f, "a")).unwrap();
        let second = f.service.create(&f.camera, params(&f, "b")).unwrap();
        let third = f.service.create(&f.camera, params(&f, "c")).unwrap();

        assert_eq!(first.sort_index, 1);
        assert_eq!(second.sort_index, 2);
        assert_eq!(third.sort_index, 3);
    }

    #[test]
    fn explicit_sort_index_validated() {
        let f = setup();
        let mut p = params(&f, "a");
        p.sort_index = Some(10001);
        match f.service.create(&f.camera, p) {
            Err(ActionError::Validation(err)) => assert!(err.has_field("sort_index")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn unknown_location_rejected() {
        let f = setup();
        let mut p = params(&f, "a");
        p.location = LocationId::generate();
        match f.service.create(&f.camera, p) {
            Err(ActionError::Validation(err)) => assert!(err.has_field("location")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn set_default_moves_flag() {
        let f = setup();
        let a = f.service.create(&f.camera, params(&f, "a")).unwrap();
        let b = f.service.create(&f.camera, params(&f, "b")).unwrap();

        assert_eq!(
            f.service.set_default(&f.camera, &a.id).unwrap(),
            SetDefaultOutcome::Updated
        );
        assert_eq!(
            f.service.set_default(&f.camera, &b.id).unwrap(),
            SetDefaultOutcome::Updated
        );

        let presets = f.service.list(&f.camera, None).unwrap();
        let a = presets.iter().find(|p| p.id == a.id).unwrap();
        let b = presets.iter().find(|p| p.id == b.id).unwrap();
        assert!(!a.is_default);
        assert!(b.is_default);

        // Second call on the new default is a no-op.
        assert_eq!(
            f.service.set_default(&f.camera, &b.id).unwrap(),
            SetDefaultOutcome::AlreadyDefault
        );
    }

    #[test]
    fn presets_are_camera_scoped() {
        let f = setup();
        let preset = f.service.create(&f.camera, params(&f, "a")).unwrap();

        let other_camera = Device::new(care_type::CAMERA, f.camera.facility_organization);
        let result = f.service.get(&other_camera, &preset.id);
        assert!(matches!(result, Err(ActionError::NotFound(_))));
    }

    #[test]
    fn list_filters_by_location() {
        let f = setup();
        f.service.create(&f.camera, params(&f, "a")).unwrap();

        let elsewhere = LocationId::generate();
        assert!(f
            .service
            .list(&f.camera, Some(&elsewhere))
            .unwrap()
            .is_empty());
        assert_eq!(
            f.service.list(&f.camera, Some(&f.location.id)).unwrap().len(),
            1
        );
    }

    #[test]
    fn update_keeps_sort_index_when_absent() {
        let f = setup();
        let preset = f.service.create(&f.camera, params(&f, "a")).unwrap();

        let updated = f
            .service
            .update(&f.camera, &preset.id, params(&f, "renamed"))
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.sort_index, preset.sort_index);
    }
}
