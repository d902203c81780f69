use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Sliding-window request counter keyed by caller identifier.
///
/// Windows are recomputed relative to "now" on every check, so a burst
/// cannot be gamed by straddling a bucket boundary. State is in-memory
/// only and resets with the process: this is a soft throttle for login
/// attempts, not a hard security boundary.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or reject a request for `identifier`, recording it only
    /// when accepted.
    pub fn check(&self, identifier: &str, max_requests: usize, window: Duration) -> bool {
        self.check_at(identifier, max_requests, window, Utc::now())
    }

    /// Deterministic form of [`check`](Self::check) with an explicit clock.
    pub fn check_at(
        &self,
        identifier: &str,
        max_requests: usize,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let mut windows = self.windows.lock().unwrap();
        let entries = windows.entry(identifier.to_string()).or_default();

        let cutoff = now - window;
        entries.retain(|stamp| *stamp > cutoff);

        if entries.len() >= max_requests {
            return false;
        }
        entries.push(now);
        true
    }

    /// Forget all recorded attempts for an identifier.
    pub fn reset(&self, identifier: &str) {
        self.windows.lock().unwrap().remove(identifier);
    }

    /// Drop identifiers whose every recorded attempt has aged out of the
    /// window, bounding memory across long-running sessions.
    pub fn retain_active(&self, window: Duration, now: DateTime<Utc>) {
        let cutoff = now - window;
        self.windows
            .lock()
            .unwrap()
            .retain(|_, entries| entries.iter().any(|stamp| *stamp > cutoff));
    }
}
