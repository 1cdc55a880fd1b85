use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Permission, PermissionSet, REQUIRED_PERMISSIONS};

/// First Android API level (12, "S") with runtime Bluetooth permissions.
pub const RUNTIME_PERMISSION_API_LEVEL: u32 = 31;

pub const DEFAULT_REQUEST_CODE: i32 = 1;

pub trait PermissionChecker: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;
}

/// The host activity permissions are requested against.
///
/// Requests are fire-and-forget: the result is delivered to the host and never
/// correlated back to a pending scan.
pub trait PermissionRequester: Send + Sync {
    fn request_permissions(&self, permissions: &[Permission], request_code: i32) -> Result<()>;
}

pub trait PermissionPolicy: Send + Sync {
    fn is_satisfied(&self) -> bool;
    fn request(&self, activity: Option<&dyn PermissionRequester>) -> Result<()>;
}

/// Platforms that grant Bluetooth access at install time.
pub struct NoRuntimePermissions;

impl PermissionPolicy for NoRuntimePermissions {
    fn is_satisfied(&self) -> bool {
        true
    }

    fn request(&self, _activity: Option<&dyn PermissionRequester>) -> Result<()> {
        Ok(())
    }
}

pub struct RuntimePermissions {
    required: PermissionSet,
    checker: Arc<dyn PermissionChecker>,
    request_code: i32,
}

impl RuntimePermissions {
    pub fn new(checker: Arc<dyn PermissionChecker>, request_code: i32) -> Self {
        Self {
            required: REQUIRED_PERMISSIONS.to_vec(),
            checker,
            request_code,
        }
    }

    pub fn required(&self) -> &[Permission] {
        &self.required
    }
}

impl PermissionPolicy for RuntimePermissions {
    fn is_satisfied(&self) -> bool {
        self.required.iter().all(|p| self.checker.is_granted(*p))
    }

    fn request(&self, activity: Option<&dyn PermissionRequester>) -> Result<()> {
        let Some(activity) = activity else {
            warn!("no activity available, dropping permission request");
            return Err(Error::NoActivity);
        };
        debug!("requesting permissions {:?}", self.required);
        activity.request_permissions(&self.required, self.request_code)
    }
}

/// Picks the permission model for the running platform. `None` means the
/// platform has no notion of an API level (desktop).
pub fn select_policy(
    platform_version: Option<u32>,
    checker: Arc<dyn PermissionChecker>,
    request_code: i32,
) -> Box<dyn PermissionPolicy> {
    match platform_version {
        Some(version) if version >= RUNTIME_PERMISSION_API_LEVEL => {
            debug!("api level {version}, using runtime permissions");
            Box::new(RuntimePermissions::new(checker, request_code))
        }
        _ => Box::new(NoRuntimePermissions),
    }
}
