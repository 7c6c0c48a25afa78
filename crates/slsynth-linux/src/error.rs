//! Error types for SyncLink device operations

use thiserror::Error;

/// SyncLink device specific errors
#[derive(Debug, Error)]
pub enum SyncLinkError {
    /// Failed to open device
    #[error("{path}: open error={} {source}", .source.raw_os_error().unwrap_or(0))]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A device control request failed
    #[error("{request} failed on {path}: {source}")]
    ControlFailed {
        request: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// USB adapter has no electrical interface selected
    #[error("USB serial interface must be selected")]
    NoInterface,

    /// Read from the device failed
    #[error("read failed: {0}")]
    ReadFailed(#[source] std::io::Error),

    /// Write to the device failed
    #[error("write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// Device not specified
    #[error("No device specified")]
    NoDevice,
}

/// Result type for SyncLink device operations
pub type Result<T> = std::result::Result<T, SyncLinkError>;
