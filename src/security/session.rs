use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;

/// Idle-session lifecycle. `Expired` is terminal for the clock instance;
/// recovery requires a new login and with it a fresh clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Warning,
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionClockConfig {
    /// Idle time after which the session expires.
    pub timeout: Duration,
    /// How long before expiry the warning fires.
    pub warning_window: Duration,
    /// Cadence of the background poll when the ticker is running.
    pub poll_interval: std::time::Duration,
}

impl Default for SessionClockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::seconds(1800),
            warning_window: Duration::seconds(300),
            poll_interval: std::time::Duration::from_secs(60),
        }
    }
}

type Hook = Box<dyn Fn() + Send + Sync>;

struct ClockState {
    last_activity: DateTime<Utc>,
    phase: SessionPhase,
    alive: bool,
}

struct ClockShared {
    state: Mutex<ClockState>,
    on_warning: Hook,
    on_expiry: Hook,
}

enum Fired {
    Warning,
    Expiry,
}

/// Tracks last activity and raises warning/expiry transitions.
///
/// The warning hook fires exactly once per warning episode (a fresh
/// episode starts each time activity returns the clock to `Active`); the
/// expiry hook fires exactly once ever. [`stop`](Self::stop) flips the
/// liveness flag synchronously, so a poll that was already scheduled can
/// no longer reach either hook.
pub struct SessionClock {
    shared: Arc<ClockShared>,
    config: SessionClockConfig,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionClock {
    pub fn new(
        config: SessionClockConfig,
        now: DateTime<Utc>,
        on_warning: impl Fn() + Send + Sync + 'static,
        on_expiry: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(ClockShared {
                state: Mutex::new(ClockState {
                    last_activity: now,
                    phase: SessionPhase::Active,
                    alive: true,
                }),
                on_warning: Box::new(on_warning),
                on_expiry: Box::new(on_expiry),
            }),
            config,
            ticker: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.state.lock().unwrap().phase
    }

    /// Record a tracked interaction (click, keypress, scroll, pointer
    /// move). Returns the clock to `Active` unless it already expired.
    pub fn record_activity(&self, now: DateTime<Utc>) {
        let mut state = self.shared.state.lock().unwrap();
        if !state.alive || state.phase == SessionPhase::Expired {
            return;
        }
        state.last_activity = now;
        state.phase = SessionPhase::Active;
    }

    /// Explicit "stay signed in" affordance from the warning dialog.
    pub fn extend(&self, now: DateTime<Utc>) {
        self.record_activity(now);
    }

    /// Run one timeout check against the given clock reading.
    pub fn poll(&self, now: DateTime<Utc>) {
        Self::poll_shared(&self.shared, &self.config, now);
    }

    /// Returns false once polling is pointless (stopped or expired).
    fn poll_shared(shared: &ClockShared, config: &SessionClockConfig, now: DateTime<Utc>) -> bool {
        let fired = {
            let mut state = shared.state.lock().unwrap();
            if !state.alive {
                return false;
            }
            if state.phase == SessionPhase::Expired {
                return false;
            }

            let elapsed = now - state.last_activity;
            if elapsed > config.timeout {
                state.phase = SessionPhase::Expired;
                Some(Fired::Expiry)
            } else if elapsed > config.timeout - config.warning_window
                && state.phase == SessionPhase::Active
            {
                state.phase = SessionPhase::Warning;
                Some(Fired::Warning)
            } else {
                None
            }
        };

        match fired {
            Some(Fired::Expiry) => {
                tracing::debug!("session clock expired");
                (shared.on_expiry)();
                false
            }
            Some(Fired::Warning) => {
                tracing::debug!("session clock entered warning window");
                (shared.on_warning)();
                true
            }
            None => true,
        }
    }

    /// Spawn the periodic poll on the current tokio runtime. Returns
    /// false when no runtime is available, in which case the host drives
    /// [`poll`](Self::poll) itself.
    pub fn start_ticker(&self) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return false;
        };

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let task = handle.spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so checks
            // start one full interval after the clock does.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !Self::poll_shared(&shared, &config, Utc::now()) {
                    break;
                }
            }
        });

        *self.ticker.lock().unwrap() = Some(task);
        true
    }

    /// Stop the clock. The liveness flag is cleared synchronously before
    /// the ticker is aborted, so no hook fires after this returns.
    pub fn stop(&self) {
        {
            self.shared.state.lock().unwrap().alive = false;
        }
        if let Some(task) = self.ticker.lock().unwrap().take() {
            task.abort();
        }
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.stop();
    }
}
