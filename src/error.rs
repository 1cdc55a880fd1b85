use serde::{Serialize, Serializer};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Btleplug error: {0}")]
    Btleplug(#[from] btleplug::Error),

    #[error("no bluetooth adapters found")]
    NoAdapters,

    #[error("Scanner not initialized")]
    ScannerNotInitialized,

    #[error("Scanner already initialized")]
    ScannerAlreadyInitialized,

    #[error("No activity available to request permissions")]
    NoActivity,

    #[error("failed to subscribe to discovery events: {0}")]
    Subscribe(String),

    #[cfg(target_os = "android")]
    #[error(transparent)]
    PluginInvoke(#[from] tauri::plugin::mobile::PluginInvokeError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
