use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::models::{SelectionStrategy, Symbology};

/// Immutable snapshot of what the detection engine is told to do.
///
/// Equality drives idempotent reconfiguration: applying a config equal to the
/// current one is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub vocabulary: BTreeSet<Symbology>,
    pub duplicate_window_ms: u64,
    pub strategy: SelectionStrategy,
}

impl SessionConfig {
    pub fn new(
        vocabulary: BTreeSet<Symbology>,
        duplicate_window_ms: u64,
        strategy: SelectionStrategy,
    ) -> Result<Self, ScanError> {
        if vocabulary.is_empty() {
            return Err(ScanError::InvalidConfig(
                "at least one symbology must be enabled".into(),
            ));
        }
        Ok(Self {
            vocabulary,
            duplicate_window_ms,
            strategy,
        })
    }

    pub fn duplicate_window(&self) -> Duration {
        Duration::from_millis(self.duplicate_window_ms)
    }

    pub fn with_strategy(&self, strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            ..self.clone()
        }
    }
}
