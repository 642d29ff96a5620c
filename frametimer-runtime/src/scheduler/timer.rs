use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::scheduler::{Inner, Scheduler};
use crate::callback::{Callback, IntoCallbackResult};
use crate::error::TimerError;
use crate::queue::TimerId;
use crate::{Millis, Timestamp};

/// How a handle wraps the callbacks it is (re)started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires on every frame once due, until stopped.
    Once,
    /// Stops itself on the first invocation.
    Timeout,
    /// Reschedules itself one period later on every invocation.
    Interval,
}

struct Shared {
    id: Cell<Option<TimerId>>,
    kind: TimerKind,
}

/// Handle to a scheduled callback.
///
/// Clones refer to the same timer. The handle holds its scheduler weakly, so
/// a callback may capture its own handle without keeping the scheduler alive.
#[derive(Clone)]
pub struct Timer {
    scheduler: Weak<Inner>,
    shared: Rc<Shared>,
}

/// A callback with the activation arguments it should be linked with.
pub(crate) struct Wrapped {
    pub(crate) callback: Callback,
    pub(crate) delay: Option<Millis>,
    pub(crate) time: Option<Timestamp>,
}

impl Timer {
    /// Unlinked handle; nothing runs until [`restart`](Self::restart).
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_kind(scheduler, TimerKind::Once)
    }

    pub(crate) fn timeout_handle(scheduler: &Scheduler) -> Self {
        Self::with_kind(scheduler, TimerKind::Timeout)
    }

    pub(crate) fn interval_handle(scheduler: &Scheduler) -> Self {
        Self::with_kind(scheduler, TimerKind::Interval)
    }

    fn with_kind(scheduler: &Scheduler, kind: TimerKind) -> Self {
        Self {
            scheduler: scheduler.downgrade(),
            shared: Rc::new(Shared {
                id: Cell::new(None),
                kind,
            }),
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.shared.kind
    }

    /// Queue node currently backing this handle, if one was ever linked.
    pub fn id(&self) -> Option<TimerId> {
        self.shared.id.get()
    }

    pub(crate) fn set_id(&self, id: TimerId) {
        self.shared.id.set(Some(id));
    }

    fn scheduler(&self) -> Option<Scheduler> {
        self.scheduler.upgrade().map(|inner| Scheduler { inner })
    }

    /// Reschedule this timer with a new callback.
    ///
    /// `time` defaults to the scheduler's `now()` and `delay` to zero. The
    /// same queue node is reused while the timer is still linked.
    ///
    /// # Panics
    ///
    /// Panics if the queue would hold more than `u32::MAX` linked timers.
    pub fn restart<F, R>(
        &self,
        callback: F,
        delay: impl Into<Option<Millis>>,
        time: impl Into<Option<Timestamp>>,
    ) -> Result<(), TimerError>
    where
        F: Fn(Millis) -> R + 'static,
        R: IntoCallbackResult,
    {
        self.restart_with(Some(Callback::new(callback)), delay, time)
    }

    /// Type-erased form of [`restart`](Self::restart).
    ///
    /// Fails with [`TimerError::InvalidCallback`] when `callback` is `None`,
    /// leaving the timer exactly as it was.
    ///
    /// # Panics
    ///
    /// Panics if the queue would hold more than `u32::MAX` linked timers.
    pub fn restart_with(
        &self,
        callback: Option<Callback>,
        delay: impl Into<Option<Millis>>,
        time: impl Into<Option<Timestamp>>,
    ) -> Result<(), TimerError> {
        let callback = callback.ok_or(TimerError::InvalidCallback)?;
        let scheduler = self.scheduler().ok_or(TimerError::SchedulerDropped)?;
        let wrapped = self.wrap(&scheduler, callback, delay.into(), time.into());
        scheduler.schedule(self, wrapped.callback, wrapped.delay, wrapped.time);
        Ok(())
    }

    /// Cancel the timer. Idempotent; the node is reaped on the next wake.
    pub fn stop(&self) {
        if let Some(scheduler) = self.scheduler() {
            scheduler.cancel(self);
        }
    }

    /// Whether the timer still has a callback to run.
    pub fn is_active(&self) -> bool {
        self.scheduler().is_some_and(|scheduler| scheduler.is_active(self))
    }

    /// Whether the timer still occupies a queue node, stopped or not.
    pub fn is_linked(&self) -> bool {
        self.scheduler().is_some_and(|scheduler| scheduler.is_linked(self))
    }

    pub(crate) fn wrap(
        &self,
        scheduler: &Scheduler,
        callback: Callback,
        delay: Option<Millis>,
        time: Option<Timestamp>,
    ) -> Wrapped {
        match (self.shared.kind, delay) {
            (TimerKind::Timeout, _) => {
                let offset = delay.unwrap_or(0.0);
                let handle = self.clone();
                Wrapped {
                    callback: Callback::new(move |elapsed| {
                        handle.stop();
                        callback.call(elapsed + offset)
                    }),
                    delay,
                    time,
                }
            }
            (TimerKind::Interval, Some(period)) => {
                let base = time.unwrap_or_else(|| scheduler.now());
                let total = Cell::new(period);
                let handle = self.clone();
                Wrapped {
                    callback: Callback::new(move |elapsed| {
                        let elapsed = elapsed + total.get();
                        total.set(total.get() + period);
                        if let Some(scheduler) = handle.scheduler() {
                            scheduler.reschedule(&handle, base + total.get());
                        }
                        callback.call(elapsed)
                    }),
                    delay: Some(period),
                    time: Some(base),
                }
            }
            _ => Wrapped {
                callback,
                delay,
                time,
            },
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id())
            .field("kind", &self.shared.kind)
            .finish()
    }
}
