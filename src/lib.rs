use std::sync::Arc;

use once_cell::sync::OnceCell;
use tauri::{
    plugin::{Builder, PluginApi, TauriPlugin},
    Runtime,
};

pub use config::Config;
pub use error::{Error, Result};
pub use models::*;
pub use observer::{DiscoveryObserver, ObserverSlot};
pub use permission::{
    select_policy, NoRuntimePermissions, PermissionChecker, PermissionPolicy,
    PermissionRequester, RuntimePermissions, RUNTIME_PERMISSION_API_LEVEL,
};
pub use platform::{DiscoveryPlatform, EventHandler};
pub use watcher::DiscoveryWatcher;

#[cfg(not(target_os = "android"))]
pub use desktop::BtleplugPlatform;

#[cfg(target_os = "android")]
mod android;
mod commands;
mod config;
#[cfg(not(target_os = "android"))]
mod desktop;
mod error;
mod models;
mod observer;
mod permission;
mod platform;
#[cfg(test)]
mod testing;
mod watcher;

/// The watcher together with the activity permission requests go to.
pub struct Scanner {
    watcher: DiscoveryWatcher,
    activity: Option<Arc<dyn PermissionRequester>>,
}

impl Scanner {
    pub fn new(watcher: DiscoveryWatcher, activity: Option<Arc<dyn PermissionRequester>>) -> Self {
        Self { watcher, activity }
    }

    pub fn watcher(&self) -> &DiscoveryWatcher {
        &self.watcher
    }

    pub fn start_scan(&self) -> Result<ScanOutcome> {
        self.watcher.start_scan(self.activity.as_deref())
    }
}

static SCANNER: OnceCell<Scanner> = OnceCell::new();

/// Initializes the plugin.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("btscan")
        .invoke_handler(commands::commands())
        .setup(|_app, api| {
            let config = api.config().clone().unwrap_or_default();
            let scanner = create_scanner(api, &config)?;
            SCANNER
                .set(scanner)
                .map_err(|_| Error::ScannerAlreadyInitialized)?;
            Ok(())
        })
        .build()
}

#[cfg(target_os = "android")]
fn create_scanner<R: Runtime>(api: PluginApi<R, Option<Config>>, config: &Config) -> Result<Scanner> {
    let (platform, permissions) = android::init(&api)?;
    let permissions = Arc::new(permissions);
    let watcher = DiscoveryWatcher::from_platform(
        Arc::new(platform),
        permissions.clone(),
        config.request_code(),
    );
    Ok(Scanner::new(
        watcher,
        Some(permissions as Arc<dyn PermissionRequester>),
    ))
}

#[cfg(not(target_os = "android"))]
fn create_scanner<R: Runtime>(_api: PluginApi<R, Option<Config>>, config: &Config) -> Result<Scanner> {
    let platform = tauri::async_runtime::block_on(BtleplugPlatform::new(config.discovery_timeout()))?;
    let watcher = DiscoveryWatcher::new(Arc::new(platform), Box::new(NoRuntimePermissions));
    Ok(Scanner::new(watcher, None))
}

pub fn get_scanner() -> Result<&'static Scanner> {
    let scanner = SCANNER.get().ok_or(Error::ScannerNotInitialized)?;
    Ok(scanner)
}
