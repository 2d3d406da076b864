use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::models::SelectionStrategy;

use super::DetectionSession;

/// UI-facing switch between aim-triggered and tap-triggered selection.
///
/// Reconfigures the engine only; an in-flight capture cycle keeps running with
/// the event it already holds.
#[derive(Clone)]
pub struct StrategyToggle {
    session: Arc<DetectionSession>,
}

impl StrategyToggle {
    pub fn new(session: Arc<DetectionSession>) -> Self {
        Self { session }
    }

    /// Returns `true` when the engine was reconfigured.
    pub fn set_strategy(&self, strategy: SelectionStrategy) -> Result<bool> {
        let current = self
            .session
            .current_config()
            .ok_or_else(|| anyhow!("detection session is not configured yet"))?;
        self.session.configure(current.with_strategy(strategy))
    }

    pub fn strategy(&self) -> Option<SelectionStrategy> {
        self.session.strategy()
    }
}
