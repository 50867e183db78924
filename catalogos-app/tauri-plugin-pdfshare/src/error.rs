//! Error types for the pdfshare plugin.
//!
//! None of these reach the OS: the adapter and the delivery layer log and
//! swallow them. They only cross the IPC boundary as strings.

use serde::{Serialize, Serializer};

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The content resolver could not open a stream for the locator.
    #[error("Could not open input stream for {0}")]
    StreamUnavailable(String),

    /// Reading the shared document failed part way.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The display-name query failed.
    #[error("Metadata query failed: {0}")]
    Metadata(String),

    /// The webview rejected the generated script.
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// A JNI call into the Android runtime failed.
    #[error("Platform bridge error: {0}")]
    Bridge(String),

    #[error("Platform not supported")]
    PlatformNotSupported,
}

impl From<tauri::Error> for Error {
    fn from(err: tauri::Error) -> Self {
        Error::Script(err.to_string())
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
