use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// How the engine nominates a candidate barcode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SelectionStrategy {
    /// Aimer-based: a barcode held under the reticle is selected without user action.
    Auto,
    /// Aimer-based, but selection only happens when the user taps.
    Manual,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::Auto
    }
}

/// Raw update from the detection engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub newly_selected: Vec<String>,
}

impl SelectionUpdate {
    pub fn new<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            newly_selected: payloads.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single nominated payload, consumed once by the capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionEvent {
    pub payload: String,
    pub detected_at: Instant,
    /// Strategy in force when the engine produced this event.
    pub strategy: SelectionStrategy,
}

impl DetectionEvent {
    pub fn new(payload: impl Into<String>, strategy: SelectionStrategy) -> Self {
        Self {
            payload: payload.into(),
            detected_at: Instant::now(),
            strategy,
        }
    }
}

/// Capture settings the camera device is opened with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettings {
    pub preferred_width: u32,
    pub preferred_height: u32,
    pub zoom_factor: f32,
    pub torch: bool,
}

impl CameraSettings {
    /// Settings tuned for barcode selection: full HD, no zoom.
    pub fn recommended() -> Self {
        Self {
            preferred_width: 1920,
            preferred_height: 1080,
            zoom_factor: 1.0,
            torch: false,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::recommended()
    }
}
