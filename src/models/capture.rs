use serde::{Deserialize, Serialize};

/// Opaque reference to a captured image, usually a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ImageFormat {
    Jpg,
    Png,
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Jpg
    }
}

/// What the capture surface is asked for on each snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotOptions {
    pub format: ImageFormat,
    /// Compression quality in `0.0..=1.0`.
    pub quality: f32,
}

/// Output of one successful capture cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub payload: String,
    pub image: ImageHandle,
    pub width: u32,
    pub height: u32,
}
