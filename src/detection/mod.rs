pub mod config;
pub mod seen;
pub mod session;
pub mod strategy;

pub use config::SessionConfig;
pub use seen::{DuplicatePolicy, SeenPayloads};
pub use session::{DetectionEngine, DetectionSession};
pub use strategy::StrategyToggle;
