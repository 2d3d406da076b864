use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;
use crate::models::{DetectionEvent, SelectionStrategy, SelectionUpdate};

use super::SessionConfig;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const EVENT_BUFFER: usize = 32;

/// The black-box recogniser. Selection updates reach the session through the
/// channel handed to [`DetectionSession::new`].
pub trait DetectionEngine: Send + Sync {
    fn apply_settings(&self, config: &SessionConfig) -> Result<()>;

    /// Release engine resources. Called once from controller disposal.
    fn dispose(&self) {}
}

/// Owns the active [`SessionConfig`] and turns engine selection updates into a
/// single-subscriber stream of [`DetectionEvent`]s.
pub struct DetectionSession {
    engine: Arc<dyn DetectionEngine>,
    config: watch::Sender<Option<SessionConfig>>,
    updates: Mutex<Option<mpsc::Receiver<SelectionUpdate>>>,
    cancel_token: CancellationToken,
}

impl DetectionSession {
    pub fn new(
        engine: Arc<dyn DetectionEngine>,
        updates: mpsc::Receiver<SelectionUpdate>,
    ) -> Self {
        let (config, _) = watch::channel(None);
        Self {
            engine,
            config,
            updates: Mutex::new(Some(updates)),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Apply `config` to the engine. Returns `false` when it matches the
    /// config already in force and nothing was sent to the engine.
    pub fn configure(&self, config: SessionConfig) -> Result<bool> {
        if self.config.borrow().as_ref() == Some(&config) {
            log_debug!("detection config unchanged; skipping apply");
            return Ok(false);
        }

        self.engine
            .apply_settings(&config)
            .context("detection engine rejected settings")?;

        log_info!(
            "detection configured: {} symbologies, window {}ms, strategy {:?}",
            config.vocabulary.len(),
            config.duplicate_window_ms,
            config.strategy
        );
        self.config.send_replace(Some(config));
        Ok(true)
    }

    pub fn current_config(&self) -> Option<SessionConfig> {
        self.config.borrow().clone()
    }

    pub fn strategy(&self) -> Option<SelectionStrategy> {
        self.config.borrow().as_ref().map(|config| config.strategy)
    }

    /// Start forwarding detections. Only one subscriber is ever served; a
    /// second call fails with [`ScanError::AlreadySubscribed`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self) -> Result<mpsc::Receiver<DetectionEvent>, ScanError> {
        let updates = {
            let mut guard = match self.updates.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.take().ok_or(ScanError::AlreadySubscribed)?
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(forward_selections(
            updates,
            tx,
            self.config.subscribe(),
            self.cancel_token.clone(),
        ));
        Ok(rx)
    }

    pub fn dispose(&self) {
        if self.cancel_token.is_cancelled() {
            return;
        }
        self.cancel_token.cancel();
        self.engine.dispose();
        log_info!("detection session disposed");
    }
}

async fn forward_selections(
    mut updates: mpsc::Receiver<SelectionUpdate>,
    events: mpsc::Sender<DetectionEvent>,
    config: watch::Receiver<Option<SessionConfig>>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else {
                    log_debug!("detection engine closed its selection stream");
                    break;
                };
                let strategy = config
                    .borrow()
                    .as_ref()
                    .map(|config| config.strategy)
                    .unwrap_or_default();
                for payload in update.newly_selected {
                    if payload.is_empty() {
                        log_debug!("skipping empty selection");
                        continue;
                    }
                    if events.send(DetectionEvent::new(payload, strategy)).await.is_err() {
                        log_debug!("detection subscriber dropped; stopping forwarder");
                        return;
                    }
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }
}
