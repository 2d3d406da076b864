//! Recording fakes for the collaborator seams.

use std::collections::{HashMap, VecDeque};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::camera::{CameraBackend, CameraDevice, FrameSourceState, PermissionGate, ProcessTerminator};
use crate::capture::{ActionStatus, CaptureSurface, HostAction, HostField, HostSink, ImageProbe};
use crate::detection::{DetectionEngine, SessionConfig};
use crate::error::ScanError;
use crate::models::{CameraSettings, ImageDimensions, ImageHandle, SnapshotOptions};
use crate::overlay::{OverlayStyle, OverlaySurface};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    AddOverlay,
    RemoveOverlay,
    SnapshotStarted,
    SnapshotFinished,
}

#[derive(Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<SurfaceCall>>>);

impl Timeline {
    pub fn push(&self, call: SurfaceCall) {
        lock(&self.0).push(call);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        lock(&self.0).clone()
    }
}

#[derive(Default)]
pub struct MockEngine {
    applied: Mutex<Vec<SessionConfig>>,
    fail_next: Mutex<bool>,
    disposed: AtomicUsize,
}

impl MockEngine {
    pub fn applied(&self) -> Vec<SessionConfig> {
        lock(&self.applied).clone()
    }

    pub fn fail_next_apply(&self) {
        *lock(&self.fail_next) = true;
    }

    pub fn dispose_count(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl DetectionEngine for MockEngine {
    fn apply_settings(&self, config: &SessionConfig) -> Result<()> {
        if std::mem::take(&mut *lock(&self.fail_next)) {
            bail!("engine refused settings");
        }
        lock(&self.applied).push(config.clone());
        Ok(())
    }

    fn dispose(&self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockOverlaySurface {
    timeline: Timeline,
}

impl MockOverlaySurface {
    pub fn with_timeline(timeline: Timeline) -> Self {
        Self { timeline }
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.timeline.calls()
    }
}

impl OverlaySurface for MockOverlaySurface {
    fn add_overlay(&self, _style: &OverlayStyle) {
        self.timeline.push(SurfaceCall::AddOverlay);
    }

    fn remove_overlay(&self) {
        self.timeline.push(SurfaceCall::RemoveOverlay);
    }
}

#[derive(Default)]
pub struct MockCaptureSurface {
    timeline: Timeline,
    scripted: Mutex<VecDeque<Result<String, String>>>,
    options: Mutex<Vec<SnapshotOptions>>,
    count: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockCaptureSurface {
    pub fn with_timeline(timeline: Timeline) -> Self {
        Self {
            timeline,
            ..Self::default()
        }
    }

    pub fn push_success(&self, uri: &str) {
        lock(&self.scripted).push_back(Ok(uri.to_string()));
    }

    pub fn push_failure(&self, reason: &str) {
        lock(&self.scripted).push_back(Err(reason.to_string()));
    }

    /// Make every snapshot wait for a permit on the returned `Notify`.
    pub fn hold_snapshots(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    pub fn snapshot_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn requested_options(&self) -> Vec<SnapshotOptions> {
        lock(&self.options).clone()
    }
}

#[async_trait]
impl CaptureSurface for MockCaptureSurface {
    async fn snapshot(&self, options: SnapshotOptions) -> Result<ImageHandle> {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.options).push(options);
        self.timeline.push(SurfaceCall::SnapshotStarted);

        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let scripted = lock(&self.scripted).pop_front();
        self.timeline.push(SurfaceCall::SnapshotFinished);
        match scripted {
            Some(Ok(uri)) => Ok(ImageHandle::new(uri)),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Ok(ImageHandle::new(format!("file:///tmp/snapshot-{n}.jpg"))),
        }
    }
}

pub struct MockProbe {
    result: Mutex<Result<ImageDimensions, String>>,
    count: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockProbe {
    pub fn returning(dims: ImageDimensions) -> Self {
        Self {
            result: Mutex::new(Ok(dims)),
            count: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    /// Make every measurement wait for a permit on the returned `Notify`.
    pub fn hold_measurements(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    pub fn set_dimensions(&self, dims: ImageDimensions) {
        *lock(&self.result) = Ok(dims);
    }

    pub fn fail_with(&self, reason: &str) {
        *lock(&self.result) = Err(reason.to_string());
    }

    pub fn measure_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProbe for MockProbe {
    async fn measure(&self, _image: &ImageHandle) -> Result<ImageDimensions> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.result).clone().map_err(|reason| anyhow!(reason))
    }
}

#[derive(Default)]
pub struct MockHost {
    values: Mutex<HashMap<HostField, String>>,
    barcode_emissions: AtomicUsize,
}

impl MockHost {
    pub fn value(&self, field: HostField) -> Option<String> {
        lock(&self.values).get(&field).cloned()
    }

    pub fn barcode_emissions(&self) -> usize {
        self.barcode_emissions.load(Ordering::SeqCst)
    }
}

impl HostSink for MockHost {
    fn set_value(&self, field: HostField, value: String) {
        if field == HostField::Barcode {
            self.barcode_emissions.fetch_add(1, Ordering::SeqCst);
        }
        lock(&self.values).insert(field, value);
    }
}

pub struct MockAction {
    status: Mutex<ActionStatus>,
    executions: AtomicUsize,
}

impl MockAction {
    pub fn new(status: ActionStatus) -> Self {
        Self {
            status: Mutex::new(status),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn set_status(&self, status: ActionStatus) {
        *lock(&self.status) = status;
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl HostAction for MockAction {
    fn status(&self) -> ActionStatus {
        *lock(&self.status)
    }

    fn execute(&self) {
        self.executions.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockDevice {
    switches: Mutex<Vec<FrameSourceState>>,
}

impl MockDevice {
    pub fn switches(&self) -> Vec<FrameSourceState> {
        lock(&self.switches).clone()
    }
}

#[async_trait]
impl CameraDevice for MockDevice {
    async fn switch_to_desired_state(&self, state: FrameSourceState) -> Result<()> {
        lock(&self.switches).push(state);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockBackend {
    devices: Mutex<Vec<Arc<MockDevice>>>,
    frame_source_attached: Mutex<Option<bool>>,
}

impl MockBackend {
    pub fn devices_created(&self) -> usize {
        lock(&self.devices).len()
    }

    pub fn device(&self, index: usize) -> Arc<MockDevice> {
        lock(&self.devices)[index].clone()
    }

    pub fn frame_source_attached(&self) -> Option<bool> {
        *lock(&self.frame_source_attached)
    }
}

impl CameraBackend for MockBackend {
    fn create_device(&self, _settings: &CameraSettings) -> Result<Arc<dyn CameraDevice>> {
        let device = Arc::new(MockDevice::default());
        lock(&self.devices).push(device.clone());
        Ok(device)
    }

    fn set_frame_source(&self, device: Option<Arc<dyn CameraDevice>>) {
        *lock(&self.frame_source_attached) = Some(device.is_some());
    }
}

pub struct MockPermission {
    granted: bool,
    requests: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockPermission {
    pub fn granting() -> Self {
        Self {
            granted: true,
            requests: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    pub fn denying() -> Self {
        Self {
            granted: false,
            ..Self::granting()
        }
    }

    /// Keep requests pending until the returned `Notify` is signalled.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionGate for MockPermission {
    async fn request_camera_permission(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.granted {
            Ok(())
        } else {
            bail!("user declined camera access")
        }
    }
}

#[derive(Default)]
pub struct MockTerminator {
    reasons: Mutex<Vec<String>>,
}

impl MockTerminator {
    pub fn terminations(&self) -> usize {
        lock(&self.reasons).len()
    }
}

impl ProcessTerminator for MockTerminator {
    fn terminate(&self, reason: &ScanError) {
        lock(&self.reasons).push(reason.to_string());
    }
}
