pub mod host;
pub mod pipeline;
pub mod probe;

pub use host::{execute_action, ActionStatus, HostAction, HostBinding, HostField, HostSink};
pub use pipeline::{CaptureOptions, CapturePhase, CapturePipeline, CycleOutcome, IgnoreReason};
pub use probe::FileImageProbe;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ImageDimensions, ImageHandle, SnapshotOptions};

/// The rendered camera view that snapshots are taken from.
#[async_trait]
pub trait CaptureSurface: Send + Sync {
    async fn snapshot(&self, options: SnapshotOptions) -> Result<ImageHandle>;
}

/// Reads pixel dimensions back from a captured image.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn measure(&self, image: &ImageHandle) -> Result<ImageDimensions>;
}
