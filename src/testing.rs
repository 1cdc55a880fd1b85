use std::collections::HashSet;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::models::{DiscoveredDevice, DiscoveryEvent, EventKind, Permission, REQUIRED_PERMISSIONS};
use crate::observer::DiscoveryObserver;
use crate::permission::{PermissionChecker, PermissionRequester};
use crate::platform::{DiscoveryPlatform, EventHandler};

pub fn device(address: &str) -> DiscoveredDevice {
    DiscoveredDevice {
        address: address.to_string(),
        name: Some("test device".to_string()),
        class: None,
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<DiscoveredDevice>>,
}

impl RecordingObserver {
    pub fn count(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.seen.lock().iter().map(|d| d.address.clone()).collect()
    }
}

impl DiscoveryObserver for RecordingObserver {
    fn device_found(&self, device: &DiscoveredDevice) {
        self.seen.lock().push(device.clone());
    }
}

pub struct FixedPermissions {
    granted: HashSet<Permission>,
}

impl FixedPermissions {
    pub fn none() -> Self {
        Self::granted(&[])
    }

    pub fn all() -> Self {
        Self::granted(&REQUIRED_PERMISSIONS)
    }

    pub fn granted(permissions: &[Permission]) -> Self {
        Self {
            granted: permissions.iter().copied().collect(),
        }
    }
}

impl PermissionChecker for FixedPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}

#[derive(Default)]
pub struct RecordingActivity {
    requests: Mutex<Vec<(Vec<Permission>, i32)>>,
}

impl RecordingActivity {
    pub fn requests(&self) -> Vec<(Vec<Permission>, i32)> {
        self.requests.lock().clone()
    }
}

impl PermissionRequester for RecordingActivity {
    fn request_permissions(&self, permissions: &[Permission], request_code: i32) -> Result<()> {
        self.requests.lock().push((permissions.to_vec(), request_code));
        Ok(())
    }
}

/// Platform double recording every call and letting tests emit events.
pub struct RecordingPlatform {
    version: Option<u32>,
    accept_start: bool,
    fail_unsubscribe: bool,
    pub starts: Mutex<usize>,
    pub cancels: Mutex<usize>,
    pub subscriptions: Mutex<Vec<Vec<EventKind>>>,
    pub unsubscribes: Mutex<usize>,
    handler: Mutex<Option<EventHandler>>,
}

impl RecordingPlatform {
    pub fn new(version: Option<u32>) -> Self {
        Self {
            version,
            accept_start: true,
            fail_unsubscribe: false,
            starts: Mutex::new(0),
            cancels: Mutex::new(0),
            subscriptions: Mutex::new(Vec::new()),
            unsubscribes: Mutex::new(0),
            handler: Mutex::new(None),
        }
    }

    pub fn rejecting(version: Option<u32>) -> Self {
        Self {
            accept_start: false,
            ..Self::new(version)
        }
    }

    /// Keeps its subscription and reports an error on every `unsubscribe`.
    pub fn failing_unsubscribe(version: Option<u32>) -> Self {
        Self {
            fail_unsubscribe: true,
            ..Self::new(version)
        }
    }

    pub fn emit(&self, event: DiscoveryEvent) {
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler.handle(&event);
        }
    }

    pub fn starts(&self) -> usize {
        *self.starts.lock()
    }

    pub fn cancels(&self) -> usize {
        *self.cancels.lock()
    }
}

impl DiscoveryPlatform for RecordingPlatform {
    fn start_discovery(&self) -> bool {
        *self.starts.lock() += 1;
        self.accept_start
    }

    fn cancel_discovery(&self) -> bool {
        *self.cancels.lock() += 1;
        true
    }

    fn subscribe(&self, kinds: &[EventKind], handler: EventHandler) -> Result<()> {
        self.subscriptions.lock().push(kinds.to_vec());
        *self.handler.lock() = Some(handler);
        Ok(())
    }

    fn unsubscribe(&self) -> Result<()> {
        *self.unsubscribes.lock() += 1;
        if self.fail_unsubscribe {
            return Err(Error::Subscribe("receiver not registered".to_string()));
        }
        *self.handler.lock() = None;
        Ok(())
    }

    fn platform_version(&self) -> Option<u32> {
        self.version
    }
}
