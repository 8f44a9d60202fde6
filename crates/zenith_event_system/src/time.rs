//! Engine time sources.
//!
//! Every [`EventManager`](crate::EventManager) reads time through a [`Clock`]
//! so scheduling and drain budgets can be driven by a real monotonic clock in
//! the engine and by a [`ManualClock`] in tests and simulations.

use crate::types::Timestamp;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// A monotonic source of [`Timestamp`]s.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Timestamp;
}

/// Monotonic wall clock whose origin is the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.origin.elapsed())
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use zenith_event_system::{Clock, ManualClock, Timestamp};
///
/// let clock = ManualClock::new();
/// assert_eq!(clock.now(), Timestamp::NOW);
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now(), Timestamp::from_millis(250));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start.as_duration()),
        }
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(step);
    }

    /// Jumps to `at`. Going backwards is ignored.
    pub fn set(&self, at: Timestamp) {
        let mut now = self.now.lock();
        if at.as_duration() > *now {
            *now = at.as_duration();
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(*self.now.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_manual_clock_never_goes_backwards() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(10));
        clock.set(Timestamp::from_millis(5));
        assert_eq!(clock.now(), Timestamp::from_millis(10));
        clock.set(Timestamp::from_millis(40));
        clock.advance(Duration::from_millis(2));
        assert_eq!(clock.now(), Timestamp::from_millis(42));
    }
}
