//! Permission checks delegated to the host authorization engine.

use std::collections::HashSet;

use parking_lot::RwLock;

use telecare_core::{OrganizationId, UserId};

/// Capability check by (permission, user, facility organization).
///
/// The host's authorization engine answers these; the plugins only
/// combine answers (e.g. the camera's OR-of-two-scopes rule).
pub trait PermissionBackend: Send + Sync {
    /// True when `user` holds `permission` within `organization`.
    fn has_permission(
        &self,
        permission: &str,
        user: &UserId,
        organization: &OrganizationId,
    ) -> bool;
}

/// Backend granting every check. Local development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionBackend for AllowAll {
    fn has_permission(&self, _: &str, _: &UserId, _: &OrganizationId) -> bool {
        true
    }
}

/// Deny-by-default backend with explicit grants. Test use.
#[derive(Default)]
pub struct StaticPermissions {
    grants: RwLock<HashSet<(String, UserId, OrganizationId)>>,
}

impl StaticPermissions {
    /// Create an empty (deny-everything) backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `permission` to `user` within `organization`.
    pub fn grant(
        &self,
        permission: impl Into<String>,
        user: UserId,
        organization: OrganizationId,
    ) {
        self.grants
            .write()
            .insert((permission.into(), user, organization));
    }
}

impl PermissionBackend for StaticPermissions {
    fn has_permission(
        &self,
        permission: &str,
        user: &UserId,
        organization: &OrganizationId,
    ) -> bool {
        self.grants
            .read()
            .contains(&(permission.to_string(), *user, *organization))
    }
}
