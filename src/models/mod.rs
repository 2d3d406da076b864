pub mod capture;
pub mod detection;
pub mod symbology;

pub use capture::{CaptureResult, ImageDimensions, ImageFormat, ImageHandle, SnapshotOptions};
pub use detection::{CameraSettings, DetectionEvent, SelectionStrategy, SelectionUpdate};
pub use symbology::Symbology;
