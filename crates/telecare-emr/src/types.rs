//! Record types crossing the host-EMR boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use telecare_core::{DeviceId, EncounterId, LocationId, OrganizationId, PresetId};

/// Free-form device metadata: the only persisted state the plugins
/// read and write, via schema validate/dump round-trips.
pub type Metadata = serde_json::Map<String, Value>;

/// Well-known device care-type tags.
pub mod care_type {
    /// Intermediary network device the platform relays calls through.
    pub const GATEWAY: &str = "gateway";
    /// Bedside PTZ camera.
    pub const CAMERA: &str = "camera";
    /// Point-of-care lab analyzer.
    pub const LAB_ANALYZER: &str = "lab-analyzer";
    /// Vital-sign monitor or ventilator yielding automated observations.
    pub const VITALS_OBSERVATION: &str = "vitals-observation";
}

/// A device record, referenced by external id and owned by the host EMR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// External id.
    pub id: DeviceId,
    /// Care-type tag selecting the device-type handler.
    pub care_type: String,
    /// Organization owning the device's facility.
    pub facility_organization: OrganizationId,
    /// Location the device is currently placed at, if any.
    pub current_location: Option<LocationId>,
    /// Encounter the device is currently linked to, if any.
    pub current_encounter: Option<EncounterId>,
    /// Plugin-managed metadata.
    pub metadata: Metadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion flag.
    pub deleted: bool,
}

impl Device {
    /// Create a fresh device record with empty metadata.
    #[must_use]
    pub fn new(care_type: impl Into<String>, facility_organization: OrganizationId) -> Self {
        let now = Utc::now();
        Self {
            id: DeviceId::generate(),
            care_type: care_type.into(),
            facility_organization,
            current_location: None,
            current_encounter: None,
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }

    /// Look up a string metadata value.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Look up a boolean metadata value, falling back to `default`.
    #[must_use]
    pub fn metadata_bool(&self, key: &str, default: bool) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// The gateway device this device's metadata references, if any.
    #[must_use]
    pub fn gateway_ref(&self) -> Option<DeviceId> {
        self.metadata_str("gateway").and_then(|s| s.parse().ok())
    }
}

/// Read-only device summary embedded in other devices' read schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// External id.
    pub id: DeviceId,
    /// Care-type tag.
    pub care_type: String,
}

impl From<&Device> for DeviceSummary {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id,
            care_type: device.care_type.clone(),
        }
    }
}

/// A facility location record (bed, room, ward) owned by the host EMR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityLocation {
    /// External id.
    pub id: LocationId,
    /// Organization owning the location's facility.
    pub facility_organization: OrganizationId,
    /// Encounter currently occupying the location, if any.
    pub current_encounter: Option<EncounterId>,
    /// Soft-deletion flag.
    pub deleted: bool,
}

impl FacilityLocation {
    /// Create a fresh location record.
    #[must_use]
    pub fn new(facility_organization: OrganizationId) -> Self {
        Self {
            id: LocationId::generate(),
            facility_organization,
            current_encounter: None,
            deleted: false,
        }
    }
}

/// A pan/tilt/zoom orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PtzPosition {
    /// Pan.
    pub x: f64,
    /// Tilt.
    pub y: f64,
    /// Zoom.
    pub zoom: f64,
}

/// A saved camera orientation tied to a physical location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPreset {
    /// External id.
    pub id: PresetId,
    /// Human-readable name.
    pub name: String,
    /// Owning camera device.
    pub camera: DeviceId,
    /// Owning location.
    pub location: LocationId,
    /// Saved orientation.
    pub ptz: PtzPosition,
    /// At most one preset per (camera, location) pair carries this flag.
    pub is_default: bool,
    /// Ordering hint in `[0, 10000]`.
    pub sort_index: u16,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion flag.
    pub deleted: bool,
}
