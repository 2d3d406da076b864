mod types;

pub use types::{CycleMetrics, CycleStatus, StatsSnapshot};

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::capture::IgnoreReason;

const MAX_RECENT_CYCLES: usize = 20;

/// Side-channel diagnostics for the capture pipeline.
pub struct PipelineStats {
    inner: Arc<Mutex<StatsSnapshot>>,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatsSnapshot {
                recent_cycles: Vec::with_capacity(MAX_RECENT_CYCLES),
                ..StatsSnapshot::default()
            })),
        }
    }

    pub async fn record_accepted(&self) {
        self.inner.lock().await.accepted_count += 1;
    }

    pub async fn record_ignored(&self, reason: IgnoreReason) {
        let mut state = self.inner.lock().await;
        match reason {
            IgnoreReason::EmptyPayload => state.empty_count += 1,
            IgnoreReason::Duplicate => state.duplicate_count += 1,
            IgnoreReason::Busy => state.busy_count += 1,
        }
    }

    pub async fn record_cycle(&self, metrics: CycleMetrics) {
        let mut state = self.inner.lock().await;

        match metrics.status {
            CycleStatus::Delivered => state.delivered_count += 1,
            CycleStatus::SnapshotFailed => state.snapshot_failure_count += 1,
            CycleStatus::MeasurementFailed => state.measurement_failure_count += 1,
        }

        state.recent_cycles.push(metrics);

        if state.recent_cycles.len() > MAX_RECENT_CYCLES {
            state.recent_cycles.remove(0);
        }
    }

    pub async fn get_snapshot(&self) -> StatsSnapshot {
        self.inner.lock().await.clone()
    }

    pub async fn reset(&self) {
        let mut state = self.inner.lock().await;
        *state = StatsSnapshot::default();
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PipelineStats {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
