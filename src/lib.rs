//! Barcode selection session controller.
//!
//! [`ScanController`] ties together the camera lifecycle, the detection
//! session, the selection overlay and the capture pipeline that turns each
//! newly selected barcode into a payload, a snapshot and its dimensions for
//! the host.

pub mod camera;
pub mod capture;
pub mod controller;
pub mod detection;
pub mod error;
pub mod metrics;
pub mod models;
pub mod overlay;
pub mod settings;
mod utils;

#[cfg(test)]
mod mock;

pub use controller::{ScanCollaborators, ScanController};
pub use error::ScanError;
pub use settings::{BusyPolicy, ScanSettings, SettingsStore};
pub use utils::logging::init_logging;
