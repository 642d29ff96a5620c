mod builder;
mod driver;
mod handle;
mod scheduler;
mod timer;

pub use builder::{FrameSourceFactory, SchedulerBuilder};
pub use handle::DriverHandle;
pub use scheduler::{Armed, Scheduler};
pub use timer::{Timer, TimerKind};
