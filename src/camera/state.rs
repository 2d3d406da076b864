use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CameraState {
    Off,
    /// Device handle exists and permission has been requested but not answered.
    Starting,
    On,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState::Off
    }
}

/// Power state requested from the capture device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FrameSourceState {
    Off,
    On,
}

/// Foreground/background transitions reported by the host application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AppLifecycleEvent {
    Active,
    Inactive,
    Background,
}

impl AppLifecycleEvent {
    pub fn wants_camera(&self) -> bool {
        matches!(self, AppLifecycleEvent::Active)
    }
}

impl Default for AppLifecycleEvent {
    fn default() -> Self {
        AppLifecycleEvent::Active
    }
}
