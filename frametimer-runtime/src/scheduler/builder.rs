use std::path::Path;
use std::rc::Rc;

use tracing::info;

use super::scheduler::{Inner, Scheduler};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{load_toml_config, load_yaml_config, ErrorPolicy, FrameSourceKind, SchedulerConfig};
use crate::error::TimerError;
use crate::frame::{FrameSource, PacedFrames, TimeoutFrames};
use crate::Millis;

/// Creates the frame source a driver ticks on.
pub type FrameSourceFactory = Box<dyn Fn(&SchedulerConfig) -> Box<dyn FrameSource>>;

/// Builder for the scheduler
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    clock: Option<Box<dyn Clock>>,
    frame_source: Option<FrameSourceFactory>,
}

impl std::fmt::Debug for SchedulerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerBuilder {
    /// Create a new scheduler builder with default settings
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create with settings read from a TOML file
    pub fn with_toml<P: AsRef<Path>>(path: P) -> Result<Self, TimerError> {
        Ok(Self::with_config(load_toml_config(path)?))
    }

    /// Create with settings read from a YAML file
    pub fn with_yaml<P: AsRef<Path>>(path: P) -> Result<Self, TimerError> {
        Ok(Self::with_config(load_yaml_config(path)?))
    }

    /// Create with explicit settings
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            clock: None,
            frame_source: None,
        }
    }

    /// Replace the host monotonic clock, e.g. with a `ManualClock` in tests
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Inject a custom frame source instead of the configured one
    pub fn frame_source<F>(mut self, factory: F) -> Self
    where
        F: Fn(&SchedulerConfig) -> Box<dyn FrameSource> + 'static,
    {
        self.frame_source = Some(Box::new(factory));
        self
    }

    pub fn heartbeat_period(mut self, period: Millis) -> Self {
        self.config.heartbeat_period = period;
        self
    }

    pub fn frame_threshold(mut self, threshold: Millis) -> Self {
        self.config.frame_threshold = threshold;
        self
    }

    pub fn frame_interval(mut self, interval: Millis) -> Self {
        self.config.frame_interval = interval;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    pub(crate) fn default_frame_source() -> FrameSourceFactory {
        Box::new(|config: &SchedulerConfig| -> Box<dyn FrameSource> {
            match config.frame_source {
                FrameSourceKind::Paced => Box::new(PacedFrames::new(config.frame_interval)),
                FrameSourceKind::Timeout => Box::new(TimeoutFrames::new(config.frame_interval)),
            }
        })
    }

    /// Build the scheduler. Nothing is armed until the first timer is scheduled.
    pub fn build(self) -> Result<Scheduler, TimerError> {
        self.config.validate()?;

        info!(
            heartbeat_period = self.config.heartbeat_period,
            frame_threshold = self.config.frame_threshold,
            frame_interval = self.config.frame_interval,
            frame_source = ?self.config.frame_source,
            custom_clock = self.clock.is_some(),
            "Building scheduler"
        );

        let clock = self.clock.unwrap_or_else(|| Box::new(MonotonicClock::new()));
        let frame_source = self.frame_source.unwrap_or_else(Self::default_frame_source);

        Ok(Scheduler {
            inner: Rc::new(Inner::new(clock, self.config, frame_source)),
        })
    }
}
