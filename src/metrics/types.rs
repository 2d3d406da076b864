use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CycleStatus {
    Delivered,
    SnapshotFailed,
    MeasurementFailed,
}

/// Timings for one accepted capture cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub cycle_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: String,
    pub snapshot_ms: Option<u64>,
    pub measure_ms: Option<u64>,
    pub total_ms: u64,
    pub status: CycleStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub recent_cycles: Vec<CycleMetrics>,
    pub accepted_count: u64,
    pub delivered_count: u64,
    pub duplicate_count: u64,
    pub busy_count: u64,
    pub empty_count: u64,
    pub snapshot_failure_count: u64,
    pub measurement_failure_count: u64,
}
