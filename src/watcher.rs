use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{EventKind, ScanOutcome};
use crate::observer::{DiscoveryObserver, ObserverSlot};
use crate::permission::{select_policy, PermissionChecker, PermissionPolicy, PermissionRequester};
use crate::platform::{DiscoveryPlatform, EventHandler};

/// Bridges scan requests to the platform and relays found devices to a
/// single observer.
///
/// The watcher keeps no scan state of its own, every start and stop is
/// forwarded to the platform. `unregister_callback` must be called once when
/// the owning host context goes away, otherwise the platform subscription
/// lives as long as the host.
pub struct DiscoveryWatcher {
    platform: Arc<dyn DiscoveryPlatform>,
    policy: Box<dyn PermissionPolicy>,
    observer: Arc<ObserverSlot>,
    handler: EventHandler,
    subscribed: Mutex<bool>,
}

impl DiscoveryWatcher {
    pub fn new(platform: Arc<dyn DiscoveryPlatform>, policy: Box<dyn PermissionPolicy>) -> Self {
        let observer = Arc::new(ObserverSlot::new());
        Self {
            platform,
            policy,
            handler: EventHandler::new(observer.clone()),
            observer,
            subscribed: Mutex::new(false),
        }
    }

    /// Selects the permission policy from the platform's reported version.
    pub fn from_platform(
        platform: Arc<dyn DiscoveryPlatform>,
        checker: Arc<dyn PermissionChecker>,
        request_code: i32,
    ) -> Self {
        let policy = select_policy(platform.platform_version(), checker, request_code);
        Self::new(platform, policy)
    }

    /// Starts discovery, or requests the missing permissions.
    ///
    /// After a permission request the caller has to call `start_scan` again
    /// once the grant went through.
    pub fn start_scan(&self, activity: Option<&dyn PermissionRequester>) -> Result<ScanOutcome> {
        debug!("start scan");
        if !self.observer.is_set() {
            warn!("start_scan called without a registered callback, found devices will be dropped");
        }
        if !self.policy.is_satisfied() {
            self.policy.request(activity)?;
            return Ok(ScanOutcome::PermissionRequested);
        }
        if self.platform.start_discovery() {
            Ok(ScanOutcome::Started)
        } else {
            debug!("platform did not start discovery");
            Ok(ScanOutcome::Rejected)
        }
    }

    pub fn stop_scan(&self) -> bool {
        debug!("stop scan");
        self.platform.cancel_discovery()
    }

    /// Stores `observer`, replacing and returning any previous one.
    pub fn register_callback(
        &self,
        observer: Arc<dyn DiscoveryObserver>,
    ) -> Result<Option<Arc<dyn DiscoveryObserver>>> {
        debug!("register callback");
        let mut subscribed = self.subscribed.lock();
        if !*subscribed {
            self.platform
                .subscribe(&EventKind::ALL, self.handler.clone())?;
            *subscribed = true;
        }
        Ok(self.observer.set(observer))
    }

    pub fn unregister_callback(&self) -> Result<Option<Arc<dyn DiscoveryObserver>>> {
        debug!("unregister callback");
        let mut subscribed = self.subscribed.lock();
        // cleared first so nothing is forwarded even if unsubscribing fails
        let previous = self.observer.clear();
        if *subscribed {
            self.platform.unsubscribe()?;
            *subscribed = false;
        } else {
            warn!("unregister_callback called without an active subscription");
        }
        Ok(previous)
    }

    pub fn has_required_permissions(&self) -> bool {
        self.policy.is_satisfied()
    }

    pub fn event_handler(&self) -> EventHandler {
        self.handler.clone()
    }
}
