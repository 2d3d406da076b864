use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::camera::{
    AppLifecycleEvent, CameraBackend, CameraLifecycle, CameraState, PermissionGate,
    ProcessTerminator,
};
use crate::capture::{
    CaptureOptions, CapturePhase, CapturePipeline, CaptureSurface, HostAction, HostBinding,
    HostSink, ImageProbe,
};
use crate::detection::{DetectionEngine, DetectionSession, SeenPayloads, StrategyToggle};
use crate::error::ScanError;
use crate::metrics::PipelineStats;
use crate::models::{SelectionStrategy, SelectionUpdate};
use crate::overlay::{OverlayController, OverlaySurface};
use crate::settings::ScanSettings;

/// Everything the controller needs from the host platform.
pub struct ScanCollaborators {
    pub camera_backend: Arc<dyn CameraBackend>,
    pub permission: Arc<dyn PermissionGate>,
    pub terminator: Arc<dyn ProcessTerminator>,
    pub engine: Arc<dyn DetectionEngine>,
    /// Selection updates emitted by `engine`.
    pub selections: mpsc::Receiver<SelectionUpdate>,
    pub overlay_surface: Arc<dyn OverlaySurface>,
    pub capture_surface: Arc<dyn CaptureSurface>,
    pub image_probe: Arc<dyn ImageProbe>,
    pub host: Arc<dyn HostSink>,
    pub on_detect: Option<Arc<dyn HostAction>>,
}

/// A mounted barcode selection session: camera, detection, overlay and
/// capture pipeline under one owner.
pub struct ScanController {
    settings: ScanSettings,
    camera: Arc<CameraLifecycle>,
    detection: Arc<DetectionSession>,
    toggle: StrategyToggle,
    overlay: Arc<OverlayController>,
    pipeline: Arc<CapturePipeline>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    cancel_token: CancellationToken,
}

impl ScanController {
    pub fn new(settings: ScanSettings, parts: ScanCollaborators) -> Result<Self, ScanError> {
        let config = settings.session_config()?;
        let options = CaptureOptions::from_settings(&settings)?;

        let camera = Arc::new(CameraLifecycle::new(
            parts.camera_backend,
            parts.permission,
            parts.terminator,
            settings.camera.clone(),
        ));
        let detection = Arc::new(DetectionSession::new(parts.engine, parts.selections));
        let overlay = Arc::new(OverlayController::new(
            parts.overlay_surface,
            settings.overlay.clone(),
        ));
        let pipeline = Arc::new(CapturePipeline::new(
            parts.capture_surface,
            parts.image_probe,
            overlay.clone(),
            HostBinding::new(parts.host, parts.on_detect),
            SeenPayloads::new(settings.duplicate_policy, config.duplicate_window()),
            options,
        ));

        Ok(Self {
            toggle: StrategyToggle::new(detection.clone()),
            settings,
            camera,
            detection,
            overlay,
            pipeline,
            tasks: Mutex::new(Vec::new()),
            cancel_token: CancellationToken::new(),
        })
    }

    /// Configure detection, attach the overlay, and start following the host
    /// lifecycle. The camera is started from the current `app_state` value.
    pub async fn mount(&self, app_state: watch::Receiver<AppLifecycleEvent>) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(ScanError::Disposed.into());
        }

        self.detection
            .configure(self.settings.session_config()?)
            .context("failed to configure detection session")?;
        self.overlay.show();

        let events = self.detection.subscribe()?;

        let mut tasks = self.tasks.lock().await;
        tasks.push(tokio::spawn(self.pipeline.clone().run(
            events,
            self.settings.busy_policy,
            self.cancel_token.clone(),
        )));
        tasks.push(
            self.camera
                .clone()
                .watch_app_lifecycle(app_state, self.cancel_token.clone()),
        );

        info!(
            "scan session mounted (strategy {:?}, busy policy {:?})",
            self.settings.strategy, self.settings.busy_policy
        );
        Ok(())
    }

    /// Switch between aim-triggered and tap-triggered selection. Only future
    /// detections are affected.
    pub fn set_strategy(&self, strategy: SelectionStrategy) -> Result<bool> {
        if self.cancel_token.is_cancelled() {
            return Err(ScanError::Disposed.into());
        }
        self.toggle.set_strategy(strategy)
    }

    pub fn strategy(&self) -> Option<SelectionStrategy> {
        self.toggle.strategy()
    }

    pub fn camera(&self) -> &Arc<CameraLifecycle> {
        &self.camera
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn pipeline_phase(&self) -> CapturePhase {
        self.pipeline.phase()
    }

    pub fn watch_pipeline_phase(&self) -> watch::Receiver<CapturePhase> {
        self.pipeline.watch_phase()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    pub fn stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    pub async fn seen_payloads(&self) -> Vec<String> {
        self.pipeline.seen_payloads().await
    }

    /// Tear the session down. An in-flight capture cycle is allowed to
    /// finish first. Calling this more than once is a no-op.
    pub async fn dispose(&self) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Ok(());
        }
        self.cancel_token.cancel();
        self.detection.dispose();

        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(err) = task.await {
                warn!("scan session task failed to join: {err}");
            }
        }

        self.camera
            .release()
            .await
            .context("failed to release camera")?;
        info!("scan session disposed");
        Ok(())
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        self.detection.dispose();
    }
}
