//! Host-EMR collaborator interfaces.
//!
//! The telecare plugins do not own the EMR data model. Devices, facility
//! locations, position presets, diagnostic reports and observations are
//! persisted by the host platform; this crate defines the narrow traits
//! the plugins consume — object lookup by external id, save-with-field
//! semantics for device metadata, permission checks — together with the
//! record types that cross that boundary and an in-memory reference
//! implementation used by tests and local development.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        plugins (registry / devices / api)    │
//! └──────────────────────────────────────────────┘
//!            │              │              │
//!            ▼              ▼              ▼
//!     ┌────────────┐ ┌────────────┐ ┌──────────────────┐
//!     │ DeviceStore│ │ PresetStore│ │ PermissionBackend│
//!     └────────────┘ └────────────┘ └──────────────────┘
//!            │              │              │
//!            ▼              ▼              ▼
//!     ┌──────────────────────────────────────────────┐
//!     │            host EMR (black box)              │
//!     └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod permissions;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use permissions::{AllowAll, PermissionBackend, StaticPermissions};
pub use store::{DeviceStore, ObservationSink, PresetStore, ReportStore};
pub use types::{
    care_type, Device, DeviceSummary, FacilityLocation, Metadata, PositionPreset, PtzPosition,
};
