use thiserror::Error;

/// Errors that can occur during device enumeration, capture, detection and
/// recording.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The host audio subsystem could not be queried.
    #[error("device query failed: {0}")]
    DeviceQuery(String),

    /// Bad device index, device already held, or unsupported format.
    #[error("failed to open device: {0}")]
    DeviceOpen(String),

    /// Only returned under `OverflowPolicy::Fail`.
    #[error("input overflow: {dropped} samples dropped")]
    Overflow { dropped: u64 },

    #[error("invalid frame: expected {expected} samples, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },

    #[error("insufficient devices: {required} required, {found} found")]
    InsufficientDevices { required: usize, found: usize },

    #[error("stream closed")]
    StreamClosed,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl CaptureError {
    /// Whether the stream that produced this error can keep delivering frames.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Overflow { .. } | Self::InvalidFrame { .. })
    }
}
