use anyhow::Result;
use async_trait::async_trait;

use crate::error::ScanError;

/// Platform camera permission prompt.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Resolves `Ok` once access is granted; any error means access is denied.
    async fn request_camera_permission(&self) -> Result<()>;
}

/// What to do when the session cannot continue at all.
pub trait ProcessTerminator: Send + Sync {
    fn terminate(&self, reason: &ScanError);
}

/// Exits the host process. The scanner is unusable without a camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitProcess;

impl ProcessTerminator for ExitProcess {
    fn terminate(&self, reason: &ScanError) {
        log::error!("Terminating host process: {reason}");
        std::process::exit(1);
    }
}
