//! Frametimer Runtime - Core timer loop for frame-driven animation
//!
//! This crate provides a single-threaded, cooperative timer queue that wakes
//! on animation frames for near deadlines and on a coarse alarm for far
//! ones, correcting for clock drift while the host is throttled or asleep.

mod callback;
mod clock;
mod config;
mod error;
mod frame;
mod queue;
mod scheduler;
mod time_unit;

/// Skew-corrected milliseconds on the scheduler's clock.
pub type Timestamp = f64;
/// A span of milliseconds.
pub type Millis = f64;

// Re-export public API
pub use callback::{Callback, CallbackResult, IntoCallbackResult};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{load_toml_config, load_yaml_config, ErrorPolicy, FrameSourceKind, SchedulerConfig, ENV_PREFIX};
pub use error::{BoxError, TimerError};
pub use frame::{FrameSource, PacedFrames, TimeoutFrames};
pub use queue::TimerId;
pub use scheduler::{Armed, DriverHandle, FrameSourceFactory, Scheduler, SchedulerBuilder, Timer, TimerKind};
pub use time_unit::TimeUnit;
