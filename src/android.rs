use serde::{Deserialize, Serialize};
use tauri::{
    ipc::{Channel, InvokeResponseBody},
    plugin::{PluginApi, PluginHandle},
    Runtime,
};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::models::{DiscoveryEvent, EventKind, Permission};
use crate::permission::{PermissionChecker, PermissionRequester};
use crate::platform::{DiscoveryPlatform, EventHandler};

#[derive(Deserialize)]
struct BoolResult {
    result: bool,
}

#[derive(Deserialize)]
struct VersionResult {
    result: u32,
}

/// Registers the Kotlin side of the plugin.
pub fn init<R: Runtime, C: serde::de::DeserializeOwned>(
    api: &PluginApi<R, C>,
) -> Result<(AndroidPlatform<R>, AndroidPermissions<R>)> {
    let handle = api.register_android_plugin("com.plugin.btscan", "BtScanPlugin")?;
    let platform = AndroidPlatform::new(handle.clone())?;
    Ok((platform, AndroidPermissions { handle }))
}

/// Drives `BluetoothAdapter` discovery and the broadcast receiver through
/// the mobile plugin.
pub struct AndroidPlatform<R: Runtime> {
    handle: PluginHandle<R>,
    sdk_version: u32,
}

impl<R: Runtime> AndroidPlatform<R> {
    pub fn new(handle: PluginHandle<R>) -> Result<Self> {
        let VersionResult { result } =
            handle.run_mobile_plugin("sdk_version", serde_json::Value::Null)?;
        debug!("android sdk version {result}");
        Ok(Self {
            handle,
            sdk_version: result,
        })
    }

    fn run_bool(&self, command: &str) -> bool {
        match self
            .handle
            .run_mobile_plugin::<BoolResult>(command, serde_json::Value::Null)
        {
            Ok(BoolResult { result }) => result,
            Err(e) => {
                error!("{command} failed: {e}");
                false
            }
        }
    }
}

impl<R: Runtime> DiscoveryPlatform for AndroidPlatform<R> {
    fn start_discovery(&self) -> bool {
        self.run_bool("start_discovery")
    }

    fn cancel_discovery(&self) -> bool {
        self.run_bool("cancel_discovery")
    }

    fn subscribe(&self, kinds: &[EventKind], handler: EventHandler) -> Result<()> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RegisterParams {
            actions: Vec<&'static str>,
            channel: Channel,
        }
        let channel: Channel = Channel::new(move |response: InvokeResponseBody| {
            match response.deserialize::<DiscoveryEvent>() {
                Ok(event) => handler.handle(&event),
                Err(e) => error!("failed to deserialize discovery event: {e:?}"),
            }
            Ok(())
        });
        let _: serde_json::Value = self
            .handle
            .run_mobile_plugin(
                "register_receiver",
                RegisterParams {
                    actions: kinds.iter().map(EventKind::action).collect(),
                    channel,
                },
            )
            .map_err(|e| Error::Subscribe(e.to_string()))?;
        Ok(())
    }

    fn unsubscribe(&self) -> Result<()> {
        let _: serde_json::Value = self
            .handle
            .run_mobile_plugin("unregister_receiver", serde_json::Value::Null)?;
        Ok(())
    }

    fn platform_version(&self) -> Option<u32> {
        Some(self.sdk_version)
    }
}

/// Permission checks against the application context, requests against the
/// current activity.
pub struct AndroidPermissions<R: Runtime> {
    handle: PluginHandle<R>,
}

impl<R: Runtime> PermissionChecker for AndroidPermissions<R> {
    fn is_granted(&self, permission: Permission) -> bool {
        let res = self.handle.run_mobile_plugin::<BoolResult>(
            "check_permission",
            serde_json::json!({ "permission": permission.as_str() }),
        );
        match res {
            Ok(BoolResult { result }) => result,
            Err(e) => {
                error!("failed to check {}: {e}", permission.as_str());
                false
            }
        }
    }
}

impl<R: Runtime> PermissionRequester for AndroidPermissions<R> {
    fn request_permissions(&self, permissions: &[Permission], request_code: i32) -> Result<()> {
        let _: serde_json::Value = self.handle.run_mobile_plugin(
            "request_permissions",
            serde_json::json!({
                "permissions": permissions.iter().map(Permission::as_str).collect::<Vec<_>>(),
                "requestCode": request_code,
            }),
        )?;
        Ok(())
    }
}
