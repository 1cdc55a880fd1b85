use std::sync::Arc;

use tauri::ipc::Channel;
use tauri::{command, AppHandle, Runtime};
use tracing::error;

use crate::error::Result;
use crate::get_scanner;
use crate::models::{DiscoveredDevice, ScanOutcome};
use crate::observer::DiscoveryObserver;

/// Forwards found devices to the front-end.
struct ChannelObserver(Channel<DiscoveredDevice>);

impl DiscoveryObserver for ChannelObserver {
    fn device_found(&self, device: &DiscoveredDevice) {
        if let Err(e) = self.0.send(device.clone()) {
            error!("failed to send device to the front-end: {e}");
        }
    }
}

#[command]
pub(crate) async fn register_callback<R: Runtime>(
    _app: AppHandle<R>,
    on_device: Channel<DiscoveredDevice>,
) -> Result<()> {
    let scanner = get_scanner()?;
    scanner
        .watcher()
        .register_callback(Arc::new(ChannelObserver(on_device)))?;
    Ok(())
}

#[command]
pub(crate) async fn unregister_callback<R: Runtime>(_app: AppHandle<R>) -> Result<()> {
    get_scanner()?.watcher().unregister_callback()?;
    Ok(())
}

#[command]
pub(crate) async fn start_scan<R: Runtime>(_app: AppHandle<R>) -> Result<ScanOutcome> {
    get_scanner()?.start_scan()
}

#[command]
pub(crate) async fn stop_scan<R: Runtime>(_app: AppHandle<R>) -> Result<bool> {
    Ok(get_scanner()?.watcher().stop_scan())
}

#[command]
pub(crate) async fn has_permissions<R: Runtime>(_app: AppHandle<R>) -> Result<bool> {
    Ok(get_scanner()?.watcher().has_required_permissions())
}

pub fn commands<R: Runtime>() -> impl Fn(tauri::ipc::Invoke<R>) -> bool {
    tauri::generate_handler![
        register_callback,
        unregister_callback,
        start_scan,
        stop_scan,
        has_permissions
    ]
}
