//! Time abstraction for debounced behaviour.
//!
//! Menus never call `Instant::now()` directly; they ask a [`TimeSource`].
//! Production code uses [`RealTimeSource`], tests use [`TestTimeSource`] and
//! advance it by hand so timer expiry is deterministic.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;

    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

pub type SharedTimeSource = Arc<dyn TimeSource>;

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTimeSource;

impl RealTimeSource {
    pub fn shared() -> SharedTimeSource {
        Arc::new(RealTimeSource)
    }
}

impl TimeSource for RealTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct TestTimeSource {
    now: Mutex<Instant>,
}

impl Default for TestTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTimeSource {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn shared() -> Arc<TestTimeSource> {
        Arc::new(Self::new())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl TimeSource for TestTimeSource {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
