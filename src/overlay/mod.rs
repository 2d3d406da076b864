pub mod style;

pub use style::{Brush, Color, OverlayStyle};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// The view the selection overlay is attached to.
pub trait OverlaySurface: Send + Sync {
    fn add_overlay(&self, style: &OverlayStyle);
    fn remove_overlay(&self);
}

/// Shows and hides the live selection feedback layer.
///
/// Both directions are idempotent: asking for the state already in force does
/// not touch the surface.
pub struct OverlayController {
    surface: Arc<dyn OverlaySurface>,
    style: OverlayStyle,
    visible: AtomicBool,
}

impl OverlayController {
    pub fn new(surface: Arc<dyn OverlaySurface>, style: OverlayStyle) -> Self {
        Self {
            surface,
            style,
            visible: AtomicBool::new(false),
        }
    }

    /// Returns `true` if the overlay was attached by this call.
    pub fn show(&self) -> bool {
        if self.visible.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.surface.add_overlay(&self.style);
        true
    }

    /// Returns `true` if the overlay was detached by this call.
    pub fn hide(&self) -> bool {
        if !self.visible.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.surface.remove_overlay();
        true
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}
