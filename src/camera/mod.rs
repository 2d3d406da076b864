pub mod lifecycle;
pub mod permission;
pub mod state;

pub use lifecycle::{CameraBackend, CameraDevice, CameraLifecycle};
pub use permission::{ExitProcess, PermissionGate, ProcessTerminator};
pub use state::{AppLifecycleEvent, CameraState, FrameSourceState};
