use std::future::pending;

use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error};

use super::handle::DriverHandle;
use super::scheduler::Scheduler;
use crate::config::ErrorPolicy;
use crate::error::TimerError;
use crate::frame::{millis, FrameSource};

/// Heartbeat interval tagged with the generation it was started for.
type Heartbeat = Option<(u64, Interval)>;

async fn next_heartbeat(heartbeat: &mut Heartbeat) {
    match heartbeat {
        Some((_, interval)) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}

impl Scheduler {
    /// Drive frames, the coarse alarm and the heartbeat until nothing is armed.
    ///
    /// Must run on the thread that owns the scheduler. Deadlines are measured
    /// against tokio time, so the scheduler should use the host clock.
    pub async fn run_until_idle(&self) -> Result<(), TimerError> {
        let mut frames = (self.inner.frame_source)(&self.inner.config);
        self.drive(frames.as_mut(), true).await
    }

    /// Spawn a driver that runs until shut down, sleeping while idle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `tokio::task::LocalSet`, since the
    /// scheduler cannot leave its thread.
    pub fn start(&self) -> DriverHandle {
        let scheduler = self.clone();
        let task = tokio::task::spawn_local(async move {
            let mut frames = (scheduler.inner.frame_source)(&scheduler.inner.config);
            scheduler.drive(frames.as_mut(), false).await
        });
        debug!("timer driver started");
        DriverHandle { task }
    }

    async fn drive(&self, frames: &mut dyn FrameSource, stop_when_idle: bool) -> Result<(), TimerError> {
        let mut heartbeat: Heartbeat = None;

        loop {
            let armed = self.armed();

            match armed.heartbeat {
                Some(epoch) if heartbeat.as_ref().map(|(current, _)| *current) != Some(epoch) => {
                    let period = millis(self.inner.config.heartbeat_period);
                    let mut interval = interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    heartbeat = Some((epoch, interval));
                }
                None => heartbeat = None,
                _ => {}
            }

            if armed.is_idle() {
                if stop_when_idle {
                    debug!("timer driver idle");
                    return Ok(());
                }
                self.inner.armed.notified().await;
                continue;
            }

            let want_frame = armed.frame || armed.clear_pending;
            let beating = heartbeat.is_some();
            let deadline = armed
                .timeout_at
                .map(|at| Instant::now() + millis(at - self.inner.clock.now()));

            tokio::select! {
                _ = frames.tick(), if want_frame => {
                    self.report(self.on_frame())?;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.report(self.on_timeout())?;
                }
                _ = next_heartbeat(&mut heartbeat), if beating => {
                    self.poke();
                }
                _ = self.inner.armed.notified() => {}
            }
        }
    }

    fn report(&self, result: Result<(), TimerError>) -> Result<(), TimerError> {
        match (result, self.inner.config.error_policy) {
            (Ok(()), _) => Ok(()),
            (Err(err), ErrorPolicy::Log) => {
                error!(error = %err, "timer callback failed");
                Ok(())
            }
            (Err(err), ErrorPolicy::Propagate) => Err(err),
        }
    }
}
