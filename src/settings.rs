use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::detection::{DuplicatePolicy, SessionConfig};
use crate::error::ScanError;
use crate::models::{CameraSettings, ImageFormat, SelectionStrategy, SnapshotOptions, Symbology};
use crate::overlay::OverlayStyle;

/// What happens to detections that arrive while a capture cycle is in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BusyPolicy {
    /// Wait in the subscription channel and run after the current cycle.
    Queue,
    /// Discard anything detected before the current cycle finished.
    Drop,
}

impl Default for BusyPolicy {
    fn default() -> Self {
        BusyPolicy::Queue
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanSettings {
    pub symbologies: Vec<Symbology>,
    pub duplicate_window_ms: u64,
    pub strategy: SelectionStrategy,
    pub duplicate_policy: DuplicatePolicy,
    pub busy_policy: BusyPolicy,
    pub image_format: ImageFormat,
    pub compression_quality: f32,
    /// Extra wait after hiding the overlay, on top of a scheduler yield.
    pub suppression_settle_ms: u64,
    /// Upper bound for each of snapshot and measurement; `None` waits forever.
    pub capture_timeout_ms: Option<u64>,
    pub overlay: OverlayStyle,
    pub camera: CameraSettings,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            symbologies: Symbology::generous_defaults(),
            duplicate_window_ms: 10_000,
            strategy: SelectionStrategy::Auto,
            duplicate_policy: DuplicatePolicy::Session,
            busy_policy: BusyPolicy::Queue,
            image_format: ImageFormat::Jpg,
            compression_quality: 0.8,
            suppression_settle_ms: 0,
            capture_timeout_ms: Some(10_000),
            overlay: OverlayStyle::default(),
            camera: CameraSettings::recommended(),
        }
    }
}

impl ScanSettings {
    pub fn session_config(&self) -> Result<SessionConfig, ScanError> {
        SessionConfig::new(
            self.symbologies.iter().copied().collect::<BTreeSet<_>>(),
            self.duplicate_window_ms,
            self.strategy,
        )
    }

    pub fn snapshot_options(&self) -> Result<SnapshotOptions, ScanError> {
        if !(0.0..=1.0).contains(&self.compression_quality) {
            return Err(ScanError::InvalidConfig(format!(
                "compression quality {} is outside 0..=1",
                self.compression_quality
            )));
        }
        Ok(SnapshotOptions {
            format: self.image_format,
            quality: self.compression_quality,
        })
    }
}

/// Whether verbose per-cycle diagnostics were requested via `SELECTSCAN_DEBUG`.
pub fn debug_mode() -> bool {
    std::env::var("SELECTSCAN_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// JSON-backed settings file.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ScanSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!(
                        "Ignoring unreadable settings at {}: {err}",
                        path.display()
                    );
                    ScanSettings::default()
                }
            }
        } else {
            ScanSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> ScanSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: ScanSettings) -> Result<()> {
        settings
            .snapshot_options()
            .context("refusing to persist invalid settings")?;
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    /// Apply a change in place and persist the result.
    pub fn modify<F>(&self, change: F) -> Result<ScanSettings>
    where
        F: FnOnce(&mut ScanSettings),
    {
        let mut next = self.get();
        change(&mut next);
        self.update(next.clone())?;
        Ok(next)
    }

    fn persist(&self, data: &ScanSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, ScanSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScanSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
