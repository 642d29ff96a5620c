use thiserror::Error;

/// Error returned by a callback; the pass that invoked it is abandoned.
pub type BoxError = Box<dyn std::error::Error>;

#[derive(Debug, Error)]
pub enum TimerError {
    /// `restart` was given no callback. Nothing was mutated.
    #[error("callback is not a function")]
    InvalidCallback,

    /// The handle outlived the scheduler it was created on.
    #[error("timer handle refers to a scheduler that has been dropped")]
    SchedulerDropped,

    /// A timer callback failed during a flush pass.
    #[error("timer callback failed: {0}")]
    Callback(#[source] BoxError),

    #[error("invalid scheduler configuration: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigSource(#[from] config::ConfigError),
}
