use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use futures::StreamExt;
use parking_lot::Mutex;
use tauri::async_runtime;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::models::{fmt_addr, DiscoveredDevice, DiscoveryEvent, EventKind};
use crate::platform::{DiscoveryPlatform, EventHandler};

#[derive(Clone)]
struct Subscriber {
    kinds: Vec<EventKind>,
    handler: EventHandler,
}

type SharedSubscriber = Arc<Mutex<Option<Subscriber>>>;

/// Whether a scan task is running, and how to cancel it.
#[derive(Default)]
struct ScanState {
    discovering: AtomicBool,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
}

impl ScanState {
    /// Marks a scan as running. `None` if one already is.
    fn begin(&self) -> Option<oneshot::Receiver<()>> {
        if self.discovering.swap(true, Ordering::SeqCst) {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        *self.cancel.lock() = Some(tx);
        Some(rx)
    }

    fn cancel(&self) -> bool {
        match self.cancel.lock().take() {
            // fails if the scan task is already gone
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    fn finish(&self) {
        self.cancel.lock().take();
        self.discovering.store(false, Ordering::SeqCst);
    }

    fn is_discovering(&self) -> bool {
        self.discovering.load(Ordering::SeqCst)
    }
}

/// Peripherals already reported during the current scan.
///
/// The adapter remembers peripherals across scans and only sends
/// `DeviceUpdated` for known ones, so either event counts as a sighting.
struct Sightings<I> {
    seen: HashSet<I>,
}

impl<I: Hash + Eq + Clone> Sightings<I> {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    fn first(&mut self, id: &I) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.clone())
    }
}

/// Discovery over the first adapter `btleplug` reports.
pub struct BtleplugPlatform {
    adapter: Arc<Adapter>,
    subscriber: SharedSubscriber,
    state: Arc<ScanState>,
    timeout: Duration,
}

async fn get_central() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    let central = adapters.into_iter().next().ok_or(Error::NoAdapters)?;
    Ok(central)
}

impl BtleplugPlatform {
    pub async fn new(timeout: Duration) -> Result<Self> {
        let central = get_central().await?;
        Ok(Self {
            adapter: Arc::new(central),
            subscriber: Arc::new(Mutex::new(None)),
            state: Arc::new(ScanState::default()),
            timeout,
        })
    }
}

impl DiscoveryPlatform for BtleplugPlatform {
    fn start_discovery(&self) -> bool {
        let Some(cancel) = self.state.begin() else {
            debug!("already discovering");
            return false;
        };
        async_runtime::spawn(run_discovery(
            self.adapter.clone(),
            self.subscriber.clone(),
            self.state.clone(),
            self.timeout,
            cancel,
        ));
        true
    }

    fn cancel_discovery(&self) -> bool {
        if !self.state.is_discovering() {
            debug!("not discovering");
        }
        self.state.cancel()
    }

    fn subscribe(&self, kinds: &[EventKind], handler: EventHandler) -> Result<()> {
        *self.subscriber.lock() = Some(Subscriber {
            kinds: kinds.to_vec(),
            handler,
        });
        Ok(())
    }

    fn unsubscribe(&self) -> Result<()> {
        *self.subscriber.lock() = None;
        Ok(())
    }

    fn platform_version(&self) -> Option<u32> {
        None
    }
}

fn dispatch(subscriber: &SharedSubscriber, event: &DiscoveryEvent) {
    let subscriber = subscriber.lock().clone();
    if let Some(subscriber) = subscriber {
        if subscriber.kinds.contains(&event.kind()) {
            subscriber.handler.handle(event);
        }
    }
}

async fn run_discovery(
    adapter: Arc<Adapter>,
    subscriber: SharedSubscriber,
    state: Arc<ScanState>,
    timeout: Duration,
    mut cancel: oneshot::Receiver<()>,
) {
    if let Err(e) = scan(&adapter, &subscriber, timeout, &mut cancel).await {
        error!("discovery failed: {e}");
    }
    if let Err(e) = adapter.stop_scan().await {
        error!("failed to stop scan: {e}");
    }
    state.finish();
    dispatch(&subscriber, &DiscoveryEvent::DiscoveryFinished);
}

async fn scan(
    adapter: &Adapter,
    subscriber: &SharedSubscriber,
    timeout: Duration,
    cancel: &mut oneshot::Receiver<()>,
) -> Result<()> {
    let mut events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;
    dispatch(subscriber, &DiscoveryEvent::DiscoveryStarted);

    let mut sightings = Sightings::new();
    let deadline = sleep(timeout);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => {
                debug!("discovery timed out after {timeout:?}");
                break;
            }
            _ = &mut *cancel => {
                debug!("discovery cancelled");
                break;
            }
            event = events.next() => match event {
                Some(CentralEvent::DeviceDiscovered(id)) | Some(CentralEvent::DeviceUpdated(id)) => {
                    if sightings.first(&id) {
                        let device = discovered_device(adapter, &id).await;
                        dispatch(subscriber, &DiscoveryEvent::DeviceFound { device });
                    }
                }
                Some(event) => trace!("ignoring {event:?}"),
                None => break,
            }
        }
    }
    Ok(())
}

async fn discovered_device(adapter: &Adapter, id: &PeripheralId) -> Option<DiscoveredDevice> {
    let peripheral = match adapter.peripheral(id).await {
        Ok(peripheral) => peripheral,
        Err(e) => {
            error!("failed to look up peripheral {id:?}: {e}");
            return None;
        }
    };
    match peripheral.properties().await {
        Ok(properties) => properties.as_ref().map(DiscoveredDevice::from_properties),
        Err(e) => {
            error!("failed to read properties of {id:?}: {e}");
            None
        }
    }
}

impl DiscoveredDevice {
    pub fn from_properties(properties: &PeripheralProperties) -> Self {
        Self {
            address: fmt_addr(properties.address),
            name: properties.local_name.clone(),
            class: properties.class,
        }
    }
}
