use btleplug::api::BDAddr;
use serde::{Deserialize, Serialize};

/// A remote device reported by the platform during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredDevice {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Bluetooth class of device, if the platform reports one.
    #[serde(default)]
    pub class: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    DeviceFound,
    DiscoveryStarted,
    DiscoveryFinished,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::DeviceFound,
        EventKind::DiscoveryStarted,
        EventKind::DiscoveryFinished,
    ];

    /// Android broadcast action delivering this kind of event.
    pub fn action(&self) -> &'static str {
        match self {
            EventKind::DeviceFound => "android.bluetooth.device.action.FOUND",
            EventKind::DiscoveryStarted => "android.bluetooth.adapter.action.DISCOVERY_STARTED",
            EventKind::DiscoveryFinished => "android.bluetooth.adapter.action.DISCOVERY_FINISHED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiscoveryEvent {
    DeviceFound {
        #[serde(default)]
        device: Option<DiscoveredDevice>,
    },
    DiscoveryStarted,
    DiscoveryFinished,
}

impl DiscoveryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DiscoveryEvent::DeviceFound { .. } => EventKind::DeviceFound,
            DiscoveryEvent::DiscoveryStarted => EventKind::DiscoveryStarted,
            DiscoveryEvent::DiscoveryFinished => EventKind::DiscoveryFinished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Permission {
    BluetoothScan,
    BluetoothConnect,
}

impl Permission {
    /// Capability identifier as understood by the platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::BluetoothScan => "android.permission.BLUETOOTH_SCAN",
            Permission::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
        }
    }
}

pub type PermissionSet = Vec<Permission>;

pub const REQUIRED_PERMISSIONS: [Permission; 2] =
    [Permission::BluetoothScan, Permission::BluetoothConnect];

/// What a call to `start_scan` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanOutcome {
    Started,
    /// Permissions were missing and have been requested, call `start_scan` again once granted.
    PermissionRequested,
    /// The platform declined to start discovery, e.g. because it is already discovering.
    Rejected,
}

pub fn fmt_addr(addr: BDAddr) -> String {
    let a = addr.into_inner();
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        a[0], a[1], a[2], a[3], a[4], a[5]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_device_found_from_android_payload() {
        let event: DiscoveryEvent = serde_json::from_str(
            r#"{"kind":"deviceFound","device":{"address":"00:11:22:AA:BB:CC","name":"Printer","class":1664}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            DiscoveryEvent::DeviceFound {
                device: Some(DiscoveredDevice {
                    address: "00:11:22:AA:BB:CC".to_string(),
                    name: Some("Printer".to_string()),
                    class: Some(1664),
                })
            }
        );
    }

    #[test]
    fn device_found_without_payload_decodes_to_none() {
        let event: DiscoveryEvent = serde_json::from_str(r#"{"kind":"deviceFound"}"#).unwrap();
        assert_eq!(event, DiscoveryEvent::DeviceFound { device: None });

        let event: DiscoveryEvent =
            serde_json::from_str(r#"{"kind":"deviceFound","device":null}"#).unwrap();
        assert_eq!(event.kind(), EventKind::DeviceFound);
    }

    #[test]
    fn decodes_lifecycle_events() {
        let started: DiscoveryEvent =
            serde_json::from_str(r#"{"kind":"discoveryStarted"}"#).unwrap();
        let finished: DiscoveryEvent =
            serde_json::from_str(r#"{"kind":"discoveryFinished"}"#).unwrap();
        assert_eq!(started.kind(), EventKind::DiscoveryStarted);
        assert_eq!(finished.kind(), EventKind::DiscoveryFinished);
    }

    #[test]
    fn formats_address_upper_case() {
        let addr = BDAddr::from([0x0a, 0x1b, 0x2c, 0x3d, 0x4e, 0x5f]);
        assert_eq!(fmt_addr(addr), "0A:1B:2C:3D:4E:5F");
    }

    #[test]
    fn required_permissions_are_scan_then_connect() {
        let ids: Vec<_> = REQUIRED_PERMISSIONS.iter().map(Permission::as_str).collect();
        assert_eq!(
            ids,
            [
                "android.permission.BLUETOOTH_SCAN",
                "android.permission.BLUETOOTH_CONNECT"
            ]
        );
    }
}
