use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::DiscoveredDevice;

/// Receives devices found while a scan is running.
pub trait DiscoveryObserver: Send + Sync {
    fn device_found(&self, device: &DiscoveredDevice);
}

impl<F> DiscoveryObserver for F
where
    F: Fn(&DiscoveredDevice) + Send + Sync,
{
    fn device_found(&self, device: &DiscoveredDevice) {
        self(device)
    }
}

/// Holds at most one observer. Setting a new one replaces the old one.
#[derive(Default)]
pub struct ObserverSlot {
    observer: Mutex<Option<Arc<dyn DiscoveryObserver>>>,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, observer: Arc<dyn DiscoveryObserver>) -> Option<Arc<dyn DiscoveryObserver>> {
        self.observer.lock().replace(observer)
    }

    pub fn clear(&self) -> Option<Arc<dyn DiscoveryObserver>> {
        self.observer.lock().take()
    }

    // cloned out so the lock is not held while the observer runs
    pub fn get(&self) -> Option<Arc<dyn DiscoveryObserver>> {
        self.observer.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.observer.lock().is_some()
    }
}
