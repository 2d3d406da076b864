#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use selectscan_lib::camera::{
    CameraBackend, CameraDevice, FrameSourceState, PermissionGate, ProcessTerminator,
};
use selectscan_lib::capture::{
    ActionStatus, CaptureSurface, HostAction, HostField, HostSink, ImageProbe,
};
use selectscan_lib::detection::{DetectionEngine, SessionConfig};
use selectscan_lib::models::{
    CameraSettings, ImageDimensions, ImageHandle, SelectionUpdate, SnapshotOptions,
};
use selectscan_lib::overlay::{OverlayStyle, OverlaySurface};
use selectscan_lib::{ScanCollaborators, ScanError};

#[derive(Default)]
pub struct Engine {
    pub applied: Mutex<Vec<SessionConfig>>,
    pub disposed: AtomicUsize,
}

impl DetectionEngine for Engine {
    fn apply_settings(&self, config: &SessionConfig) -> Result<()> {
        self.applied.lock().unwrap().push(config.clone());
        Ok(())
    }

    fn dispose(&self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct Device {
    pub switches: Mutex<Vec<FrameSourceState>>,
}

#[async_trait]
impl CameraDevice for Device {
    async fn switch_to_desired_state(&self, state: FrameSourceState) -> Result<()> {
        self.switches.lock().unwrap().push(state);
        Ok(())
    }
}

#[derive(Default)]
pub struct Backend {
    pub created: AtomicUsize,
    pub attached: Mutex<Option<bool>>,
}

impl CameraBackend for Backend {
    fn create_device(&self, _settings: &CameraSettings) -> Result<Arc<dyn CameraDevice>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Device::default()))
    }

    fn set_frame_source(&self, device: Option<Arc<dyn CameraDevice>>) {
        *self.attached.lock().unwrap() = Some(device.is_some());
    }
}

pub struct Permission {
    pub granted: bool,
}

#[async_trait]
impl PermissionGate for Permission {
    async fn request_camera_permission(&self) -> Result<()> {
        if self.granted {
            Ok(())
        } else {
            Err(anyhow!("denied"))
        }
    }
}

#[derive(Default)]
pub struct Terminator {
    pub calls: AtomicUsize,
}

impl ProcessTerminator for Terminator {
    fn terminate(&self, _reason: &ScanError) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct Overlay {
    pub added: AtomicUsize,
    pub removed: AtomicUsize,
}

impl OverlaySurface for Overlay {
    fn add_overlay(&self, _style: &OverlayStyle) {
        self.added.fetch_add(1, Ordering::SeqCst);
    }

    fn remove_overlay(&self) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct Surface {
    pub scripted: Mutex<VecDeque<Result<String, String>>>,
    pub count: AtomicUsize,
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl Surface {
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl CaptureSurface for Surface {
    async fn snapshot(&self, _options: SnapshotOptions) -> Result<ImageHandle> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let next = self.scripted.lock().unwrap().pop_front();
        match next {
            Some(Ok(uri)) => Ok(ImageHandle::new(uri)),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Ok(ImageHandle::new("file:///tmp/H.jpg")),
        }
    }
}

pub struct Probe(pub ImageDimensions);

#[async_trait]
impl ImageProbe for Probe {
    async fn measure(&self, _image: &ImageHandle) -> Result<ImageDimensions> {
        Ok(self.0)
    }
}

#[derive(Default)]
pub struct Host {
    pub values: Mutex<HashMap<HostField, String>>,
    pub barcodes: Mutex<Vec<String>>,
}

impl Host {
    pub fn value(&self, field: HostField) -> Option<String> {
        self.values.lock().unwrap().get(&field).cloned()
    }
}

impl HostSink for Host {
    fn set_value(&self, field: HostField, value: String) {
        if field == HostField::Barcode {
            self.barcodes.lock().unwrap().push(value.clone());
        }
        self.values.lock().unwrap().insert(field, value);
    }
}

#[derive(Default)]
pub struct Action {
    pub executions: AtomicUsize,
}

impl HostAction for Action {
    fn status(&self) -> ActionStatus {
        ActionStatus::Idle
    }

    fn execute(&self) {
        self.executions.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Fakes {
    pub engine: Arc<Engine>,
    pub selections: mpsc::Sender<SelectionUpdate>,
    pub backend: Arc<Backend>,
    pub terminator: Arc<Terminator>,
    pub overlay: Arc<Overlay>,
    pub surface: Arc<Surface>,
    pub host: Arc<Host>,
    pub action: Arc<Action>,
}

pub fn collaborators(permission_granted: bool) -> (ScanCollaborators, Fakes) {
    let (selections_tx, selections_rx) = mpsc::channel(16);
    let fakes = Fakes {
        engine: Arc::new(Engine::default()),
        selections: selections_tx,
        backend: Arc::new(Backend::default()),
        terminator: Arc::new(Terminator::default()),
        overlay: Arc::new(Overlay::default()),
        surface: Arc::new(Surface::default()),
        host: Arc::new(Host::default()),
        action: Arc::new(Action::default()),
    };
    let parts = ScanCollaborators {
        camera_backend: fakes.backend.clone(),
        permission: Arc::new(Permission {
            granted: permission_granted,
        }),
        terminator: fakes.terminator.clone(),
        engine: fakes.engine.clone(),
        selections: selections_rx,
        overlay_surface: fakes.overlay.clone(),
        capture_surface: fakes.surface.clone(),
        image_probe: Arc::new(Probe(ImageDimensions::new(640, 480))),
        host: fakes.host.clone(),
        on_detect: Some(fakes.action.clone()),
    };
    (parts, fakes)
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
