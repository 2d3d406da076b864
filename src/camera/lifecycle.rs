use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;
use crate::models::CameraSettings;

use super::{AppLifecycleEvent, CameraState, FrameSourceState, PermissionGate, ProcessTerminator};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn switch_to_desired_state(&self, state: FrameSourceState) -> Result<()>;
}

/// Creates capture devices and wires them into the data capture context.
pub trait CameraBackend: Send + Sync {
    fn create_device(&self, settings: &CameraSettings) -> Result<Arc<dyn CameraDevice>>;
    fn set_frame_source(&self, device: Option<Arc<dyn CameraDevice>>);
}

struct CameraInner {
    device: Option<Arc<dyn CameraDevice>>,
    state: CameraState,
    /// Bumped by every start and stop so a late permission answer can tell
    /// whether it is still wanted.
    generation: u64,
}

struct PendingStart {
    device: Arc<dyn CameraDevice>,
    generation: u64,
}

/// Owns the capture device and its power state.
pub struct CameraLifecycle {
    backend: Arc<dyn CameraBackend>,
    permission: Arc<dyn PermissionGate>,
    terminator: Arc<dyn ProcessTerminator>,
    settings: CameraSettings,
    inner: Mutex<CameraInner>,
    state_tx: watch::Sender<CameraState>,
}

impl CameraLifecycle {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        permission: Arc<dyn PermissionGate>,
        terminator: Arc<dyn ProcessTerminator>,
        settings: CameraSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(CameraState::Off);
        Self {
            backend,
            permission,
            terminator,
            settings,
            inner: Mutex::new(CameraInner {
                device: None,
                state: CameraState::Off,
                generation: 0,
            }),
            state_tx,
        }
    }

    pub fn state(&self) -> CameraState {
        *self.state_tx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<CameraState> {
        self.state_tx.subscribe()
    }

    /// Power the camera on, creating the device on first use.
    ///
    /// Waits for the permission prompt. A denial terminates the host through
    /// the configured [`ProcessTerminator`] and returns
    /// [`ScanError::PermissionDenied`].
    pub async fn start(&self) -> Result<()> {
        if let Some(pending) = self.begin_start().await? {
            self.finish_start(pending).await?;
        }
        Ok(())
    }

    /// Power the camera off. A no-op when there is no device or it is already off.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let Some(device) = inner.device.clone() else {
            return Ok(());
        };
        if inner.state == CameraState::Off {
            return Ok(());
        }

        if inner.state == CameraState::On {
            device
                .switch_to_desired_state(FrameSourceState::Off)
                .await
                .context("failed to switch camera off")?;
        }
        inner.generation += 1;
        self.set_state(&mut inner, CameraState::Off);
        log_info!("camera switched off");
        Ok(())
    }

    /// Stop the camera and drop the device handle.
    pub async fn release(&self) -> Result<()> {
        self.stop().await?;
        let mut inner = self.inner.lock().await;
        if inner.device.take().is_some() {
            self.backend.set_frame_source(None);
            log_info!("camera device released");
        }
        Ok(())
    }

    /// React to a host foreground/background transition.
    ///
    /// Starting only waits for the device to be claimed; the permission prompt
    /// is awaited on a separate task so a following background transition is
    /// not held up behind it.
    pub async fn handle_app_state(self: &Arc<Self>, event: AppLifecycleEvent) {
        log_debug!("app lifecycle -> {event:?}");
        if !event.wants_camera() {
            if let Err(err) = self.stop().await {
                log_error!("Failed to stop camera: {err:#}");
            }
            return;
        }

        match self.begin_start().await {
            Ok(Some(pending)) => {
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(err) = this.finish_start(pending).await {
                        log_error!("Failed to start camera: {err:#}");
                    }
                });
            }
            Ok(None) => {}
            Err(err) => log_error!("Failed to start camera: {err:#}"),
        }
    }

    /// Follow `app_state` until it closes or `cancel_token` fires. The current
    /// value is applied immediately.
    pub fn watch_app_lifecycle(
        self: Arc<Self>,
        mut app_state: watch::Receiver<AppLifecycleEvent>,
        cancel_token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = *app_state.borrow_and_update();
            self.handle_app_state(initial).await;

            loop {
                tokio::select! {
                    changed = app_state.changed() => {
                        if changed.is_err() {
                            log_debug!("app lifecycle source closed");
                            break;
                        }
                        let next = *app_state.borrow_and_update();
                        self.handle_app_state(next).await;
                    }
                    _ = cancel_token.cancelled() => break,
                }
            }
        })
    }

    async fn begin_start(&self) -> Result<Option<PendingStart>> {
        let mut inner = self.inner.lock().await;
        if inner.state != CameraState::Off {
            log_debug!("camera already {:?}; start is a no-op", inner.state);
            return Ok(None);
        }

        let device = match &inner.device {
            Some(device) => Arc::clone(device),
            None => {
                let device = self
                    .backend
                    .create_device(&self.settings)
                    .context("failed to create camera device")?;
                self.backend.set_frame_source(Some(Arc::clone(&device)));
                inner.device = Some(Arc::clone(&device));
                log_info!(
                    "camera device created ({}x{})",
                    self.settings.preferred_width,
                    self.settings.preferred_height
                );
                device
            }
        };

        inner.generation += 1;
        self.set_state(&mut inner, CameraState::Starting);
        Ok(Some(PendingStart {
            device,
            generation: inner.generation,
        }))
    }

    async fn finish_start(&self, pending: PendingStart) -> Result<()> {
        let answer = self.permission.request_camera_permission().await;

        let mut inner = self.inner.lock().await;
        let still_wanted =
            inner.generation == pending.generation && inner.state == CameraState::Starting;

        if let Err(err) = answer {
            if !still_wanted {
                log_warn!("ignoring stale camera permission denial: {err:#}");
                return Ok(());
            }
            self.set_state(&mut inner, CameraState::Off);
            drop(inner);
            log_error!("Camera permission denied: {err:#}");
            self.terminator.terminate(&ScanError::PermissionDenied);
            return Err(ScanError::PermissionDenied.into());
        }

        if !still_wanted {
            log_info!("camera stopped while permission was pending; leaving it off");
            return Ok(());
        }

        if let Err(err) = pending
            .device
            .switch_to_desired_state(FrameSourceState::On)
            .await
        {
            self.set_state(&mut inner, CameraState::Off);
            return Err(err.context("failed to switch camera on"));
        }

        self.set_state(&mut inner, CameraState::On);
        log_info!("camera switched on");
        Ok(())
    }

    fn set_state(&self, inner: &mut CameraInner, state: CameraState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }
}
