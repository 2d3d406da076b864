use std::sync::Arc;

use crate::models::CaptureResult;

/// Output fields the host exposes to the scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostField {
    Barcode,
    Image,
    Width,
    Height,
}

pub trait HostSink: Send + Sync {
    fn set_value(&self, field: HostField, value: String);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Idle,
    Executing,
    Disabled,
}

/// Completion action supplied by the host.
pub trait HostAction: Send + Sync {
    fn status(&self) -> ActionStatus;
    fn execute(&self);
}

/// Run `action` if it is present and idle. Returns whether it ran.
pub fn execute_action(action: Option<&dyn HostAction>) -> bool {
    match action {
        Some(action) if action.status() == ActionStatus::Idle => {
            action.execute();
            true
        }
        _ => false,
    }
}

#[derive(Clone)]
pub struct HostBinding {
    sink: Arc<dyn HostSink>,
    on_detect: Option<Arc<dyn HostAction>>,
}

impl HostBinding {
    pub fn new(sink: Arc<dyn HostSink>, on_detect: Option<Arc<dyn HostAction>>) -> Self {
        Self { sink, on_detect }
    }

    pub fn emit_payload(&self, payload: &str) {
        self.sink.set_value(HostField::Barcode, payload.to_string());
    }

    pub fn emit_capture(&self, result: &CaptureResult) {
        self.sink
            .set_value(HostField::Image, result.image.as_str().to_string());
        self.sink.set_value(HostField::Width, result.width.to_string());
        self.sink
            .set_value(HostField::Height, result.height.to_string());
    }

    pub fn complete(&self) -> bool {
        execute_action(self.on_detect.as_deref())
    }
}
