use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::Notify;
use tracing::{debug, trace};

use super::builder::{FrameSourceFactory, SchedulerBuilder};
use super::timer::Timer;
use crate::callback::{Callback, IntoCallbackResult};
use crate::clock::{Clock, MonotonicClock};
use crate::config::SchedulerConfig;
use crate::error::TimerError;
use crate::queue::TaskQueue;
use crate::{Millis, Timestamp};

/// What the scheduler currently expects from its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Armed {
    /// A frame tick should call [`Scheduler::on_frame`] to wake the loop.
    pub frame: bool,
    /// The cached clock is waiting for the next frame tick to be cleared.
    pub clear_pending: bool,
    /// Raw clock time (skew removed) at which to call [`Scheduler::on_timeout`].
    pub timeout_at: Option<Timestamp>,
    /// Heartbeat generation, bumped every time the heartbeat is (re)started.
    pub heartbeat: Option<u64>,
}

impl Armed {
    pub fn is_idle(&self) -> bool {
        !self.frame && !self.clear_pending && self.timeout_at.is_none()
    }
}

#[derive(Debug)]
pub(crate) struct State {
    pub(crate) queue: TaskQueue,
    clock_now: Option<Timestamp>,
    clock_last: Timestamp,
    clock_skew: f64,
    clear_pending: bool,
    frame: bool,
    flush_depth: u32,
    timeout_at: Option<Timestamp>,
    heartbeat: Option<u64>,
    heartbeat_epoch: u64,
}

impl State {
    fn new() -> Self {
        Self {
            queue: TaskQueue::new(),
            clock_now: None,
            clock_last: 0.0,
            clock_skew: 0.0,
            clear_pending: false,
            frame: false,
            flush_depth: 0,
            timeout_at: None,
            heartbeat: None,
            heartbeat_epoch: 0,
        }
    }

    fn now(&mut self, clock: &dyn Clock) -> Timestamp {
        match self.clock_now {
            Some(now) => now,
            None => {
                self.clear_pending = true;
                let now = clock.now() + self.clock_skew;
                self.clock_now = Some(now);
                now
            }
        }
    }

    /// Arms exactly one wake for `time`; `None` means "at the next frame".
    fn sleep(&mut self, clock: &dyn Clock, config: &SchedulerConfig, time: Option<Timestamp>) -> bool {
        if self.frame || self.flush_depth > 0 {
            return false;
        }
        self.timeout_at = None;

        let now = match self.clock_now {
            Some(now) => now,
            None => clock.now() + self.clock_skew,
        };

        match time {
            Some(time) if time - now > config.frame_threshold => {
                if time.is_finite() {
                    let at = time - self.clock_skew;
                    debug!(deadline = time, delay = time - now, "arming coarse alarm");
                    self.timeout_at = Some(at);
                } else {
                    debug!("timer queue idle");
                }
                if self.heartbeat.take().is_some() {
                    debug!("heartbeat stopped");
                }
            }
            _ => {
                if self.heartbeat.is_none() {
                    self.clock_last = clock.now();
                    self.heartbeat_epoch += 1;
                    self.heartbeat = Some(self.heartbeat_epoch);
                    debug!(period = config.heartbeat_period, "heartbeat started");
                }
                self.frame = true;
            }
        }
        true
    }

    fn nap(&mut self, clock: &dyn Clock, config: &SchedulerConfig) -> bool {
        let pass = self.queue.compact();
        if pass.reaped > 0 {
            debug!(reaped = pass.reaped, remaining = self.queue.len(), "compacted timer queue");
        }
        self.sleep(clock, config, Some(pass.next_activation))
    }
}

pub(crate) struct Inner {
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) config: SchedulerConfig,
    pub(crate) frame_source: FrameSourceFactory,
    pub(crate) state: RefCell<State>,
    pub(crate) armed: Notify,
}

impl Inner {
    pub(crate) fn new(clock: Box<dyn Clock>, config: SchedulerConfig, frame_source: FrameSourceFactory) -> Self {
        Self {
            clock,
            config,
            frame_source,
            state: RefCell::new(State::new()),
            armed: Notify::new(),
        }
    }
}

/// Restores the flush depth even when a callback fails or panics mid-pass.
///
/// No state borrow is held while callbacks run, so the borrow here cannot
/// conflict.
struct FlushGuard<'a>(&'a Inner);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.state.borrow_mut().flush_depth -= 1;
    }
}

/// Cooperative timer loop.
///
/// One scheduler owns one task queue, one cached clock and one set of armed
/// wakes. Handles are cheap to clone and all clones drive the same loop.
/// The scheduler is single-threaded: it is neither `Send` nor `Sync`, and
/// every callback runs on the thread that drives it.
///
/// # Example
///
/// ```rust
/// use frametimer_runtime::{ManualClock, SchedulerBuilder};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let clock = ManualClock::new(1000.0);
/// let scheduler = SchedulerBuilder::new().clock(clock.clone()).build()?;
///
/// let fired = Rc::new(Cell::new(0));
/// let counter = fired.clone();
/// scheduler.timeout(move |_elapsed| counter.set(counter.get() + 1), None, None);
///
/// scheduler.timer_flush()?;
/// scheduler.timer_flush()?;
/// assert_eq!(fired.get(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Scheduler {
    pub(crate) inner: Rc<Inner>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("config", &self.inner.config).finish_non_exhaustive()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Scheduler on the host monotonic clock with default settings
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    /// Scheduler on a custom clock with default settings
    pub fn with_clock<C: Clock + 'static>(clock: C) -> Self {
        let config = SchedulerConfig::default();
        let frame_source = SchedulerBuilder::default_frame_source();
        Self {
            inner: Rc::new(Inner::new(Box::new(clock), config, frame_source)),
        }
    }

    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Current cycle time.
    ///
    /// The first read computes the skew-corrected clock and caches it until
    /// the next frame tick, so every read in one synchronous stretch agrees.
    pub fn now(&self) -> Timestamp {
        self.inner.state.borrow_mut().now(&*self.inner.clock)
    }

    /// Schedule `callback` to run once `time + delay` is reached.
    ///
    /// `time` defaults to [`now`](Self::now) and `delay` to zero. The timer
    /// keeps firing on every frame until it is stopped or restarted.
    ///
    /// # Panics
    ///
    /// Panics if the queue would hold more than `u32::MAX` linked timers.
    pub fn timer<F, R>(
        &self,
        callback: F,
        delay: impl Into<Option<Millis>>,
        time: impl Into<Option<Timestamp>>,
    ) -> Timer
    where
        F: Fn(Millis) -> R + 'static,
        R: IntoCallbackResult,
    {
        let timer = Timer::new(self);
        self.schedule(&timer, Callback::new(callback), delay.into(), time.into());
        timer
    }

    /// Like [`timer`](Self::timer), but stops itself before its first
    /// invocation returns.
    ///
    /// The callback receives the time elapsed since `time`.
    ///
    /// # Panics
    ///
    /// Panics if the queue would hold more than `u32::MAX` linked timers.
    pub fn timeout<F, R>(
        &self,
        callback: F,
        delay: impl Into<Option<Millis>>,
        time: impl Into<Option<Timestamp>>,
    ) -> Timer
    where
        F: Fn(Millis) -> R + 'static,
        R: IntoCallbackResult,
    {
        let timer = Timer::timeout_handle(self);
        let delay = delay.into();
        let time = time.into();
        let wrapped = timer.wrap(self, Callback::new(callback), delay, time);
        self.schedule(&timer, wrapped.callback, wrapped.delay, wrapped.time);
        timer
    }

    /// Like [`timer`](Self::timer), but reschedules itself every `delay`
    /// milliseconds until stopped. Without a delay it fires on every frame.
    ///
    /// The callback receives the time elapsed since `time`.
    ///
    /// # Panics
    ///
    /// Panics if the queue would hold more than `u32::MAX` linked timers.
    pub fn interval<F, R>(
        &self,
        callback: F,
        delay: impl Into<Option<Millis>>,
        time: impl Into<Option<Timestamp>>,
    ) -> Timer
    where
        F: Fn(Millis) -> R + 'static,
        R: IntoCallbackResult,
    {
        let timer = Timer::interval_handle(self);
        let delay = delay.into();
        let time = time.into();
        let wrapped = timer.wrap(self, Callback::new(callback), delay, time);
        self.schedule(&timer, wrapped.callback, wrapped.delay, wrapped.time);
        timer
    }

    /// Links or updates the node behind `timer` and arms the next frame.
    pub(crate) fn schedule(
        &self,
        timer: &Timer,
        callback: Callback,
        delay: Option<Millis>,
        time: Option<Timestamp>,
    ) {
        let inner = &*self.inner;
        let replaced = {
            let mut guard = inner.state.borrow_mut();
            let state = &mut *guard;
            let base = match time {
                Some(time) => time,
                None => state.now(&*inner.clock),
            };
            let activation = base + delay.unwrap_or(0.0);

            let replaced = if let Some(node) = timer.id().and_then(|id| state.queue.get_mut(id)) {
                node.activation = activation;
                node.callback.replace(callback)
            } else {
                let id = state.queue.push_back(callback, activation);
                timer.set_id(id);
                trace!(?id, activation, "timer linked");
                None
            };

            if state.sleep(&*inner.clock, &inner.config, None) {
                inner.armed.notify_one();
            }
            replaced
        };
        // The old callback may own handles whose drop re-enters the scheduler.
        drop(replaced);
    }

    /// Moves a live node to `activation`, keeping its callback.
    pub(crate) fn reschedule(&self, timer: &Timer, activation: Timestamp) {
        let inner = &*self.inner;
        let mut state = inner.state.borrow_mut();
        let Some(node) = timer.id().and_then(|id| state.queue.get_mut(id)) else {
            return;
        };
        if node.callback.is_none() {
            return;
        }
        node.activation = activation;
        if state.sleep(&*inner.clock, &inner.config, None) {
            inner.armed.notify_one();
        }
    }

    pub(crate) fn cancel(&self, timer: &Timer) {
        let inner = &*self.inner;
        let Some(id) = timer.id() else {
            return;
        };
        let removed = {
            let mut guard = inner.state.borrow_mut();
            let state = &mut *guard;
            let Some(node) = state.queue.get_mut(id) else {
                return;
            };
            let Some(removed) = node.callback.take() else {
                return;
            };
            node.activation = f64::INFINITY;
            trace!(?id, "timer stopped");
            if state.sleep(&*inner.clock, &inner.config, None) {
                inner.armed.notify_one();
            }
            removed
        };
        drop(removed);
    }

    pub(crate) fn is_active(&self, timer: &Timer) -> bool {
        let state = self.inner.state.borrow();
        timer
            .id()
            .and_then(|id| state.queue.get(id))
            .is_some_and(|node| node.callback.is_some())
    }

    pub(crate) fn is_linked(&self, timer: &Timer) -> bool {
        let state = self.inner.state.borrow();
        timer.id().and_then(|id| state.queue.get(id)).is_some()
    }

    /// Run every due timer now, bypassing the armed wake.
    ///
    /// Walks the live queue once. Timers linked by callbacks during the pass
    /// are visited if the walk has not passed them yet. A nested call from a
    /// callback runs to completion before the outer pass continues. The
    /// first failing callback abandons the pass and its error is returned.
    pub fn timer_flush(&self) -> Result<(), TimerError> {
        let inner = &*self.inner;
        let mut cursor = {
            let mut state = inner.state.borrow_mut();
            state.now(&*inner.clock);
            state.flush_depth += 1;
            state.queue.head()
        };
        let _guard = FlushGuard(inner);

        while let Some(index) = cursor {
            let due = {
                let mut state = inner.state.borrow_mut();
                let now = state.now(&*inner.clock);
                state.queue.at(index).and_then(|node| {
                    let elapsed = now - node.activation;
                    if elapsed >= 0.0 {
                        node.callback.clone().map(|callback| (callback, elapsed))
                    } else {
                        None
                    }
                })
            };

            if let Some((callback, elapsed)) = due {
                trace!(index, elapsed, "invoking timer callback");
                callback.call(elapsed).map_err(TimerError::Callback)?;
            }

            cursor = inner.state.borrow().queue.at(index).and_then(|node| node.next);
        }
        Ok(())
    }

    /// Wake entered from an armed frame or coarse alarm.
    fn wake(&self) -> Result<(), TimerError> {
        let inner = &*self.inner;
        {
            let mut state = inner.state.borrow_mut();
            state.clock_last = inner.clock.now();
            state.clock_now = Some(state.clock_last + state.clock_skew);
            state.frame = false;
            state.timeout_at = None;
        }

        let result = self.timer_flush();

        {
            let mut state = inner.state.borrow_mut();
            state.frame = false;
            if state.nap(&*inner.clock, &inner.config) {
                inner.armed.notify_one();
            }
            state.clock_now = None;
        }
        result
    }

    /// Host entry point for a frame tick.
    ///
    /// Clears the cached clock if a read is waiting on it, then wakes the
    /// loop if a frame was armed. Ignored while a flush is running.
    pub fn on_frame(&self) -> Result<(), TimerError> {
        let wake = {
            let mut state = self.inner.state.borrow_mut();
            if state.flush_depth > 0 {
                debug!("frame tick during flush ignored");
                return Ok(());
            }
            if state.clear_pending {
                state.clear_pending = false;
                state.clock_now = None;
            }
            state.frame
        };
        if wake {
            self.wake()
        } else {
            Ok(())
        }
    }

    /// Host entry point for the coarse alarm. Ignored unless it is armed.
    pub fn on_timeout(&self) -> Result<(), TimerError> {
        let wake = {
            let state = self.inner.state.borrow();
            state.flush_depth == 0 && state.timeout_at.is_some()
        };
        if wake {
            self.wake()
        } else {
            Ok(())
        }
    }

    /// Heartbeat: fold a stall longer than one heartbeat period into the skew.
    pub fn poke(&self) {
        let inner = &*self.inner;
        let mut state = inner.state.borrow_mut();
        if state.heartbeat.is_none() {
            return;
        }
        let now = inner.clock.now();
        let delay = now - state.clock_last;
        if delay > inner.config.heartbeat_period {
            state.clock_skew -= delay;
            state.clock_last = now;
            debug!(delay, skew = state.clock_skew, "clock skew corrected");
        }
    }

    pub fn armed(&self) -> Armed {
        let state = self.inner.state.borrow();
        Armed {
            frame: state.frame,
            clear_pending: state.clear_pending,
            timeout_at: state.timeout_at,
            heartbeat: state.heartbeat,
        }
    }

    /// Accumulated skew correction; zero or negative.
    pub fn skew(&self) -> f64 {
        self.inner.state.borrow().clock_skew
    }

    /// Number of linked nodes, including stopped ones not yet reaped.
    pub fn queue_len(&self) -> usize {
        self.inner.state.borrow().queue.len()
    }

    pub(crate) fn downgrade(&self) -> std::rc::Weak<Inner> {
        Rc::downgrade(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn state_at(clock: &ManualClock) -> State {
        let mut state = State::new();
        state.now(clock);
        state
    }

    #[test]
    fn near_deadlines_arm_a_frame_and_start_the_heartbeat() {
        let clock = ManualClock::new(100.0);
        let config = SchedulerConfig::default();
        let mut state = state_at(&clock);

        assert!(state.sleep(&clock, &config, Some(124.0)));
        assert!(state.frame);
        assert_eq!(state.timeout_at, None);
        assert_eq!(state.heartbeat, Some(1));
        assert_eq!(state.clock_last, 100.0);
    }

    #[test]
    fn far_deadlines_arm_the_alarm_on_the_raw_clock() {
        let clock = ManualClock::new(100.0);
        let config = SchedulerConfig::default();
        let mut state = State::new();
        state.clock_skew = -40.0;
        state.heartbeat = Some(3);

        assert!(state.sleep(&clock, &config, Some(200.0)));
        assert!(!state.frame);
        assert_eq!(state.timeout_at, Some(240.0));
        assert_eq!(state.heartbeat, None);
    }

    #[test]
    fn an_empty_queue_arms_nothing() {
        let clock = ManualClock::new(100.0);
        let config = SchedulerConfig::default();
        let mut state = state_at(&clock);
        state.timeout_at = Some(500.0);

        assert!(state.sleep(&clock, &config, Some(f64::INFINITY)));
        assert!(!state.frame);
        assert_eq!(state.timeout_at, None);
    }

    #[test]
    fn sleeping_is_skipped_while_a_frame_or_flush_is_pending() {
        let clock = ManualClock::new(100.0);
        let config = SchedulerConfig::default();
        let mut state = state_at(&clock);

        state.frame = true;
        assert!(!state.sleep(&clock, &config, Some(10_000.0)));
        assert_eq!(state.timeout_at, None);

        state.frame = false;
        state.flush_depth = 1;
        assert!(!state.sleep(&clock, &config, None));
        assert!(!state.frame);
    }

    #[test]
    fn restarting_the_heartbeat_bumps_its_generation() {
        let clock = ManualClock::new(0.0);
        let config = SchedulerConfig::default();
        let mut state = state_at(&clock);

        state.sleep(&clock, &config, None);
        state.frame = false;
        state.sleep(&clock, &config, Some(f64::INFINITY));
        state.sleep(&clock, &config, None);
        assert_eq!(state.heartbeat, Some(2));
    }

    #[test]
    fn nap_reaps_stopped_nodes_before_arming() {
        let clock = ManualClock::new(0.0);
        let config = SchedulerConfig::default();
        let mut state = state_at(&clock);
        let live = state.queue.push_back(Callback::new(|_| ()), 1000.0);
        let dead = state.queue.push_back(Callback::new(|_| ()), 5.0);
        if let Some(node) = state.queue.get_mut(dead) {
            node.callback = None;
            node.activation = f64::INFINITY;
        }

        state.nap(&clock, &config);
        assert_eq!(state.queue.len(), 1);
        assert!(state.queue.get(live).is_some());
        assert_eq!(state.timeout_at, Some(1000.0));
    }
}
