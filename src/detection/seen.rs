use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// How long an accepted payload keeps suppressing repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// For the lifetime of the session.
    Session,
    /// Until the duplicate window has elapsed since the last acceptance.
    Window,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Session
    }
}

/// Payloads accepted during one scan session.
#[derive(Debug)]
pub struct SeenPayloads {
    policy: DuplicatePolicy,
    window: Duration,
    last_accepted: HashMap<String, Instant>,
    /// Acceptance order, append-only.
    history: Vec<String>,
}

impl SeenPayloads {
    pub fn new(policy: DuplicatePolicy, window: Duration) -> Self {
        Self {
            policy,
            window,
            last_accepted: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Whether `payload` would be rejected as a duplicate at `now`.
    pub fn contains(&self, payload: &str, now: Instant) -> bool {
        let Some(accepted_at) = self.last_accepted.get(payload) else {
            return false;
        };
        match self.policy {
            DuplicatePolicy::Session => true,
            DuplicatePolicy::Window => now.saturating_duration_since(*accepted_at) < self.window,
        }
    }

    /// Record `payload` as accepted. Returns `false` for a duplicate.
    pub fn record(&mut self, payload: &str, now: Instant) -> bool {
        if self.contains(payload, now) {
            return false;
        }
        self.last_accepted.insert(payload.to_string(), now);
        self.history.push(payload.to_string());
        true
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}
