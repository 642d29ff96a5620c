//! # Frametimer - Frame-aligned Timers for Animation Loops
//!
//! A cooperative timer queue for driving animations: schedule callbacks to run
//! once, repeatedly, or after a delay, and let the scheduler pick the host
//! wake-up that fits each deadline.
//!
//! ## Features
//!
//! - **Frame-tight wakes**: deadlines within ~24ms are served on animation frames
//! - **Coarse alarms**: far deadlines sleep on a single one-shot alarm
//! - **Drift correction**: a heartbeat folds host stalls into a clock skew
//! - **Consistent time**: `now()` is cached for a whole frame, so timers
//!   scheduled together compare equal
//! - **Re-entrant**: callbacks may start, restart or stop timers, including
//!   themselves, and may flush the queue recursively
//! - **Config support**: tune the loop from TOML/YAML or `FRAMETIMER__*` env vars
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frametimer::Scheduler;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = Scheduler::new();
//!
//!     let handle = scheduler.clone();
//!     scheduler.timeout(
//!         move |elapsed| println!("fired after {elapsed:.1}ms (now = {})", handle.now()),
//!         250.0,
//!         None,
//!     );
//!
//!     scheduler.run_until_idle().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Create `config/frametimer.toml`:
//!
//! ```toml
//! [timer]
//! heartbeat_period = "1s"
//! frame_threshold = 24
//! frame_interval = "17ms"
//! frame_source = "paced"    # or "timeout"
//! error_policy = "log"      # or "propagate"
//! ```
//!
//! Or `config/frametimer.yaml`:
//!
//! ```yaml
//! timer:
//!   heartbeat_period: 1s
//!   frame_interval: 17ms
//! ```
//!
//! Environment variables override file values:
//!
//! ```bash
//! export FRAMETIMER__TIMER__HEARTBEAT_PERIOD=2s
//! ```

// Re-export core types
pub use frametimer_runtime::{
    load_toml_config, load_yaml_config, Armed, BoxError, Callback, CallbackResult, Clock,
    DriverHandle, ErrorPolicy, FrameSource, FrameSourceFactory, FrameSourceKind,
    IntoCallbackResult, ManualClock, Millis, MonotonicClock, PacedFrames, Scheduler,
    SchedulerBuilder, SchedulerConfig, TimeUnit, TimeoutFrames, Timer, TimerError, TimerId,
    TimerKind, Timestamp,
};

// Make frametimer_runtime available for lower-level access
pub use frametimer_runtime;
