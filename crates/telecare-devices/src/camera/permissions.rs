//! Camera capability checks.
//!
//! A capability is granted by holding the permission in the camera's
//! facility organization OR in the organization of the camera's current
//! location — staff assigned to the bedside can operate the camera even
//! without facility-wide rights.

use std::sync::Arc;

use telecare_core::UserId;
use telecare_emr::{Device, DeviceStore, PermissionBackend};

/// Permission to watch a camera's video stream.
pub const CAN_VIEW_CAMERA_STREAM: &str = "can_view_camera_stream";

/// Permission to drive a camera's PTZ control.
pub const CAN_CONTROL_CAMERA_PTZ: &str = "can_control_camera_ptz";

/// Evaluates camera capabilities against the host permission engine.
pub struct CameraAccess {
    devices: Arc<dyn DeviceStore>,
    permissions: Arc<dyn PermissionBackend>,
}

impl CameraAccess {
    /// Create an access checker.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceStore>, permissions: Arc<dyn PermissionBackend>) -> Self {
        Self {
            devices,
            permissions,
        }
    }

    /// Can `user` view the camera's stream?
    #[must_use]
    pub fn can_view_stream(&self, user: &UserId, camera: &Device) -> bool {
        self.check(CAN_VIEW_CAMERA_STREAM, user, camera)
    }

    /// Can `user` drive the camera's PTZ control?
    #[must_use]
    pub fn can_control_ptz(&self, user: &UserId, camera: &Device) -> bool {
        self.check(CAN_CONTROL_CAMERA_PTZ, user, camera)
    }

    fn check(&self, permission: &str, user: &UserId, camera: &Device) -> bool {
        if self
            .permissions
            .has_permission(permission, user, &camera.facility_organization)
        {
            return true;
        }

        camera
            .current_location
            .and_then(|location| self.devices.get_location(&location).ok().flatten())
            .is_some_and(|location| {
                self.permissions
                    .has_permission(permission, user, &location.facility_organization)
            })
    }
}
