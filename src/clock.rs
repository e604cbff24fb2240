//! Monotonic time sources for the tick scheduler.
//!
//! The session never sleeps or spawns timers. The host calls
//! [`GameSession::poll`](crate::GameSession::poll) and the session asks its
//! [`Clock`] how much time has passed. Tests drive a [`ManualClock`].

use std::sync::Arc;

use parking_lot::Mutex;
use web_time::{Duration, Instant};

/// A monotonic time source, measured from an arbitrary fixed origin.
#[cfg(feature = "sync-send")]
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin. Must never go backwards.
    fn now(&self) -> Duration;
}

/// A monotonic time source, measured from an arbitrary fixed origin.
#[cfg(not(feature = "sync-send"))]
pub trait Clock {
    /// Time elapsed since the clock's origin. Must never go backwards.
    fn now(&self) -> Duration;
}

/// The real clock. Uses `web_time::Instant`, so it also works on wasm.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// A clock whose origin is the moment of creation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the session.
///
/// ```
/// use jugger_stones::{Clock, ManualClock};
/// use web_time::Duration;
///
/// let clock = ManualClock::new();
/// let session_handle = clock.clone();
/// clock.advance(Duration::from_millis(1500));
/// assert_eq!(session_handle.now(), Duration::from_millis(1500));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// A manual clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }

    /// Moves the clock to `at`. Earlier times are ignored.
    pub fn set(&self, at: Duration) {
        let mut now = self.now.lock();
        if at > *now {
            *now = at;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}
