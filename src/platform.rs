use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::models::{DiscoveryEvent, EventKind};
use crate::observer::ObserverSlot;

/// The native Bluetooth stack as seen by the watcher.
///
/// `start_discovery` and `cancel_discovery` report whether the platform
/// accepted the request. Events for the subscribed kinds are delivered to the
/// handler on whatever thread the platform chooses.
pub trait DiscoveryPlatform: Send + Sync {
    fn start_discovery(&self) -> bool;
    fn cancel_discovery(&self) -> bool;
    fn subscribe(&self, kinds: &[EventKind], handler: EventHandler) -> Result<()>;
    fn unsubscribe(&self) -> Result<()>;
    fn platform_version(&self) -> Option<u32>;
}

/// Relays platform notifications to the registered observer.
#[derive(Clone)]
pub struct EventHandler {
    observer: Arc<ObserverSlot>,
}

impl EventHandler {
    pub(crate) fn new(observer: Arc<ObserverSlot>) -> Self {
        Self { observer }
    }

    pub fn handle(&self, event: &DiscoveryEvent) {
        match event {
            DiscoveryEvent::DeviceFound { device: Some(device) } => {
                trace!("device found: {}", device.address);
                match self.observer.get() {
                    Some(observer) => observer.device_found(device),
                    None => debug!("no observer registered, dropping {}", device.address),
                }
            }
            DiscoveryEvent::DeviceFound { device: None } => {
                debug!("device found event without device, dropping");
            }
            // not forwarded
            DiscoveryEvent::DiscoveryStarted | DiscoveryEvent::DiscoveryFinished => {
                debug!("discovery event: {:?}", event.kind());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{device, RecordingObserver};

    fn handler_with_observer() -> (EventHandler, Arc<RecordingObserver>) {
        let slot = Arc::new(ObserverSlot::new());
        let observer = Arc::new(RecordingObserver::default());
        slot.set(observer.clone());
        (EventHandler::new(slot), observer)
    }

    #[test]
    fn forwards_found_device_once() {
        let (handler, observer) = handler_with_observer();
        handler.handle(&DiscoveryEvent::DeviceFound {
            device: Some(device("00:11:22:33:44:55")),
        });
        assert_eq!(observer.addresses(), vec!["00:11:22:33:44:55".to_string()]);
    }

    #[test]
    fn null_payload_is_not_forwarded() {
        let (handler, observer) = handler_with_observer();
        handler.handle(&DiscoveryEvent::DeviceFound { device: None });
        assert_eq!(observer.count(), 0);
    }

    #[test]
    fn lifecycle_events_are_inert() {
        let (handler, observer) = handler_with_observer();
        handler.handle(&DiscoveryEvent::DiscoveryStarted);
        handler.handle(&DiscoveryEvent::DiscoveryFinished);
        assert_eq!(observer.count(), 0);
    }

    #[test]
    fn empty_slot_does_not_panic() {
        let handler = EventHandler::new(Arc::new(ObserverSlot::new()));
        handler.handle(&DiscoveryEvent::DeviceFound {
            device: Some(device("00:11:22:33:44:55")),
        });
    }
}
