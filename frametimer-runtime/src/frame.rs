//! Frame tick sources a driver can wait on.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, Sleep};

use crate::Millis;

/// Host primitive that resolves at the next animation frame.
///
/// # Example
///
/// ```rust
/// use frametimer_runtime::FrameSource;
/// use std::future::Future;
/// use std::pin::Pin;
///
/// /// Never delays: every tick is immediately ready.
/// struct Immediate;
///
/// impl FrameSource for Immediate {
///     fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + '_>> {
///         Box::pin(async {})
///     }
/// }
/// ```
pub trait FrameSource {
    /// Wait for the next frame.
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + '_>>;
}

/// Whole microseconds; negative or NaN inputs clamp to zero.
pub(crate) fn millis(ms: Millis) -> Duration {
    Duration::from_micros((ms.max(0.0) * 1000.0).round() as u64)
}

/// Frames on a fixed-rate grid; frames missed while busy are skipped.
pub struct PacedFrames {
    interval: Interval,
}

impl PacedFrames {
    pub fn new(frame_interval: Millis) -> Self {
        let period = millis(frame_interval);
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl FrameSource for PacedFrames {
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(async move {
            self.interval.tick().await;
        })
    }
}

/// A one-shot delay measured from each request.
///
/// A pending delay survives the tick future being dropped, so re-polling
/// resumes the same wait instead of starting over.
pub struct TimeoutFrames {
    delay: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl TimeoutFrames {
    pub fn new(frame_interval: Millis) -> Self {
        Self {
            delay: millis(frame_interval),
            pending: None,
        }
    }
}

impl FrameSource for TimeoutFrames {
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(async move {
            let delay = self.delay;
            let sleep = self
                .pending
                .get_or_insert_with(|| Box::pin(tokio::time::sleep(delay)));
            sleep.as_mut().await;
            self.pending = None;
        })
    }
}
