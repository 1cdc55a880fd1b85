use std::time::Duration;

use serde::Deserialize;

use crate::permission::DEFAULT_REQUEST_CODE;

/// Matches the inquiry window Android uses for classic discovery.
pub const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 12;

/// `plugins.btscan` section of `tauri.conf.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// How long the desktop backend scans before finishing on its own.
    pub discovery_timeout_secs: Option<u64>,
    /// Request code passed along with permission requests.
    pub request_code: Option<i32>,
}

impl Config {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(
            self.discovery_timeout_secs
                .unwrap_or(DEFAULT_DISCOVERY_TIMEOUT_SECS),
        )
    }

    pub fn request_code(&self) -> i32 {
        self.request_code.unwrap_or(DEFAULT_REQUEST_CODE)
    }
}
