use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::detection::SeenPayloads;
use crate::error::ScanError;
use crate::metrics::{CycleMetrics, CycleStatus, PipelineStats};
use crate::models::{CaptureResult, DetectionEvent, SnapshotOptions};
use crate::overlay::OverlayController;
use crate::settings::{debug_mode, BusyPolicy, ScanSettings};

use super::{CaptureSurface, HostBinding, ImageProbe};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Where the pipeline is within a capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Accepted,
    Suppressing,
    Capturing,
    Restoring,
    Measuring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyPayload,
    Duplicate,
    Busy,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// Payload, image and dimensions reached the host.
    Delivered(CaptureResult),
    /// The event never started a cycle.
    Ignored(IgnoreReason),
    /// The payload reached the host but the image did not.
    Degraded { payload: String, error: ScanError },
}

impl CycleOutcome {
    pub fn started_cycle(&self) -> bool {
        !matches!(self, CycleOutcome::Ignored(_))
    }
}

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub snapshot: SnapshotOptions,
    pub settle: Duration,
    pub timeout: Option<Duration>,
    pub verbose: bool,
}

impl CaptureOptions {
    pub fn from_settings(settings: &ScanSettings) -> Result<Self, ScanError> {
        Ok(Self {
            snapshot: settings.snapshot_options()?,
            settle: Duration::from_millis(settings.suppression_settle_ms),
            timeout: settings.capture_timeout_ms.map(Duration::from_millis),
            verbose: debug_mode(),
        })
    }
}

/// Resets the phase to `Idle` however the cycle ends.
struct PhaseGuard<'a> {
    phase: &'a watch::Sender<CapturePhase>,
}

impl PhaseGuard<'_> {
    fn set(&self, next: CapturePhase) {
        self.phase.send_replace(next);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(CapturePhase::Idle);
    }
}

/// Turns accepted detections into host-visible payloads and snapshots.
pub struct CapturePipeline {
    surface: Arc<dyn CaptureSurface>,
    probe: Arc<dyn ImageProbe>,
    overlay: Arc<OverlayController>,
    host: HostBinding,
    seen: Mutex<SeenPayloads>,
    phase: watch::Sender<CapturePhase>,
    options: CaptureOptions,
    stats: PipelineStats,
}

impl CapturePipeline {
    pub fn new(
        surface: Arc<dyn CaptureSurface>,
        probe: Arc<dyn ImageProbe>,
        overlay: Arc<OverlayController>,
        host: HostBinding,
        seen: SeenPayloads,
        options: CaptureOptions,
    ) -> Self {
        let (phase, _) = watch::channel(CapturePhase::Idle);
        Self {
            surface,
            probe,
            overlay,
            host,
            seen: Mutex::new(seen),
            phase,
            options,
            stats: PipelineStats::new(),
        }
    }

    pub fn phase(&self) -> CapturePhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<CapturePhase> {
        self.phase.subscribe()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats.clone()
    }

    pub async fn seen_payloads(&self) -> Vec<String> {
        self.seen.lock().await.history().to_vec()
    }

    /// Consume detections until the stream closes or `cancel_token` fires.
    ///
    /// Cancellation is only observed between events, so a cycle that has
    /// already started runs to completion.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<DetectionEvent>,
        busy_policy: BusyPolicy,
        cancel_token: CancellationToken,
    ) {
        let mut last_cycle_end: Option<Instant> = None;

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    log_info!("capture pipeline shutting down");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        log_debug!("detection stream closed");
                        break;
                    }
                },
            };

            if busy_policy == BusyPolicy::Drop {
                if let Some(end) = last_cycle_end {
                    if event.detected_at <= end {
                        log_debug!("dropping '{}' detected during previous cycle", event.payload);
                        self.stats.record_ignored(IgnoreReason::Busy).await;
                        continue;
                    }
                }
            }

            let outcome = self.process(event).await;
            if outcome.started_cycle() {
                last_cycle_end = Some(Instant::now());
            }
        }
    }

    /// Run one capture cycle for `event`.
    ///
    /// The payload is handed to the host before any image work starts, so it
    /// survives snapshot or measurement failure. A call made while another
    /// cycle is in flight is ignored as [`IgnoreReason::Busy`].
    pub async fn process(&self, event: DetectionEvent) -> CycleOutcome {
        let DetectionEvent {
            payload,
            detected_at,
            ..
        } = event;

        if payload.is_empty() {
            return self.ignore(IgnoreReason::EmptyPayload).await;
        }

        if self.seen.lock().await.contains(&payload, detected_at) {
            log_debug!("ignoring duplicate '{payload}'");
            return self.ignore(IgnoreReason::Duplicate).await;
        }

        let began = self.phase.send_if_modified(|phase| {
            if *phase == CapturePhase::Idle {
                *phase = CapturePhase::Accepted;
                true
            } else {
                false
            }
        });
        if !began {
            log_debug!("capture in flight; ignoring '{payload}'");
            return self.ignore(IgnoreReason::Busy).await;
        }
        let guard = PhaseGuard { phase: &self.phase };

        if !self.seen.lock().await.record(&payload, detected_at) {
            return self.ignore(IgnoreReason::Duplicate).await;
        }

        self.stats.record_accepted().await;
        self.host.emit_payload(&payload);
        log_info!("accepted '{payload}'");

        let cycle_start = Instant::now();
        let mut metrics = CycleMetrics {
            cycle_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload: payload.clone(),
            snapshot_ms: None,
            measure_ms: None,
            total_ms: 0,
            status: CycleStatus::Delivered,
        };

        guard.set(CapturePhase::Suppressing);
        let overlay_was_shown = self.overlay.hide();
        tokio::task::yield_now().await;
        if !self.options.settle.is_zero() {
            tokio::time::sleep(self.options.settle).await;
        }

        guard.set(CapturePhase::Capturing);
        let snapshot_start = Instant::now();
        let snapshot = self
            .bounded("snapshot", self.surface.snapshot(self.options.snapshot))
            .await;
        metrics.snapshot_ms = Some(elapsed_ms(snapshot_start));

        guard.set(CapturePhase::Restoring);
        if overlay_was_shown {
            self.overlay.show();
        }

        let image = match snapshot {
            Ok(image) => image,
            Err(err) => {
                log_error!("Failed to capture view for '{payload}': {err:#}");
                metrics.status = CycleStatus::SnapshotFailed;
                self.finish(metrics, cycle_start).await;
                return CycleOutcome::Degraded {
                    payload,
                    error: ScanError::SnapshotFailure(err),
                };
            }
        };

        guard.set(CapturePhase::Measuring);
        let measure_start = Instant::now();
        let measured = self
            .bounded("measurement", self.probe.measure(&image))
            .await
            .and_then(|dims| {
                if dims.is_empty() {
                    anyhow::bail!("image reported {}x{}", dims.width, dims.height);
                }
                Ok(dims)
            });
        metrics.measure_ms = Some(elapsed_ms(measure_start));

        let dims = match measured {
            Ok(dims) => dims,
            Err(err) => {
                log_error!("Failed to get image size for {image}: {err:#}");
                metrics.status = CycleStatus::MeasurementFailed;
                self.finish(metrics, cycle_start).await;
                return CycleOutcome::Degraded {
                    payload,
                    error: ScanError::MeasurementFailure(err),
                };
            }
        };

        let result = CaptureResult {
            payload,
            image,
            width: dims.width,
            height: dims.height,
        };
        self.host.emit_capture(&result);
        if !self.host.complete() {
            log_debug!("onDetect action not executable; skipped");
        }

        self.finish(metrics, cycle_start).await;
        drop(guard);
        CycleOutcome::Delivered(result)
    }

    async fn ignore(&self, reason: IgnoreReason) -> CycleOutcome {
        self.stats.record_ignored(reason).await;
        CycleOutcome::Ignored(reason)
    }

    async fn finish(&self, mut metrics: CycleMetrics, cycle_start: Instant) {
        metrics.total_ms = elapsed_ms(cycle_start);
        if self.options.verbose {
            log::info!(
                "cycle {} for '{}' finished {:?} in {}ms (snapshot: {:?}ms, measure: {:?}ms)",
                metrics.cycle_id,
                metrics.payload,
                metrics.status,
                metrics.total_ms,
                metrics.snapshot_ms,
                metrics.measure_ms
            );
        }
        self.stats.record_cycle(metrics).await;
    }

    async fn bounded<T, F>(&self, stage: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let Some(limit) = self.options.timeout else {
            return fut.await;
        };
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(ScanError::CaptureTimeout {
                stage,
                timeout_ms: limit.as_millis() as u64,
            }
            .into()),
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
