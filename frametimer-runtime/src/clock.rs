//! Monotonic time sources.

use std::cell::Cell;
use std::rc::Rc;

use tokio::time::Instant;

use crate::Timestamp;

/// A monotonic millisecond clock.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Host clock measured from the moment it was created.
///
/// Backed by `tokio::time::Instant`, so it stands still while tokio time is
/// paused and jumps with `tokio::time::advance`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        // Offset by one so the clock never reads zero, like a host clock.
        1.0 + self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for deterministic tests and simulations.
///
/// Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, by: f64) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
