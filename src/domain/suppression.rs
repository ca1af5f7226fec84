// Time-windowed gate that silences stale alerts after an operator reset
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Source of the current time, injectable so expiry can be tested without sleeping
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall time read once at construction, then advanced by a monotonic timer.
/// An NTP step while running cannot stretch or cut short a window.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Utc::now(),
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or(TimeDelta::MAX);
        self.origin
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuppressionWindow {
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Expiry is resolved lazily: nothing flips a flag when the window ends,
/// `is_suppressing` just compares against the clock at query time.
#[derive(Clone)]
pub struct SuppressionGate {
    clock: Arc<dyn Clock>,
    expires_at: Option<DateTime<Utc>>,
}

impl SuppressionGate {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            expires_at: None,
        }
    }

    /// Start a window of `duration` from now, replacing any window already running.
    pub fn arm(&mut self, duration: Duration) {
        let now = self.clock.now();
        let span = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(span)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        tracing::debug!("Suppression window armed until {}", expires_at);
        self.expires_at = Some(expires_at);
    }

    pub fn is_suppressing(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| self.clock.now() < expires_at)
    }

    pub fn window(&self) -> SuppressionWindow {
        let active = self.is_suppressing();
        SuppressionWindow {
            active,
            expires_at: self.expires_at.filter(|_| active),
        }
    }
}
