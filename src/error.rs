use thiserror::Error;

/// Failures the scan session distinguishes between.
///
/// Only [`ScanError::PermissionDenied`] is fatal; snapshot and measurement
/// failures end the current capture cycle and the next detection is the retry.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("snapshot failed: {0:#}")]
    SnapshotFailure(anyhow::Error),

    #[error("image measurement failed: {0:#}")]
    MeasurementFailure(anyhow::Error),

    #[error("{stage} timed out after {timeout_ms}ms")]
    CaptureTimeout { stage: &'static str, timeout_ms: u64 },

    #[error("detection session already has a subscriber")]
    AlreadySubscribed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scan controller has been disposed")]
    Disposed,
}
