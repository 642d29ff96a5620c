use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::TimerError;
use crate::frame::millis;
use crate::time_unit::TimeUnit;
use crate::Millis;

/// Environment variable prefix, e.g. `FRAMETIMER__TIMER__HEARTBEAT_PERIOD=2s`
pub const ENV_PREFIX: &str = "FRAMETIMER";

/// Which host primitive produces frame ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSourceKind {
    /// Fixed-rate frame grid, the way a display refresh paces animation frames.
    #[default]
    Paced,
    /// One-shot delay from each request.
    Timeout,
}

/// What the driver does when a callback fails during a wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Report the failure and keep driving.
    #[default]
    Log,
    /// Stop the driver and hand the error to whoever awaits it.
    Propagate,
}

/// Tunables of the timer loop. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// How often the heartbeat checks for clock skew.
    pub heartbeat_period: Millis,
    /// Deadlines further away than this use the coarse alarm instead of frames.
    pub frame_threshold: Millis,
    /// Nominal spacing of frame ticks.
    pub frame_interval: Millis,
    pub frame_source: FrameSourceKind,
    pub error_policy: ErrorPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            heartbeat_period: 1000.0,
            frame_threshold: 24.0,
            frame_interval: 17.0,
            frame_source: FrameSourceKind::Paced,
            error_policy: ErrorPolicy::Log,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Millis(f64),
    Text(String),
}

impl DurationValue {
    fn resolve(self, key: &str) -> Result<Millis, TimerError> {
        let millis = match self {
            DurationValue::Millis(value) if value.is_finite() && value >= 0.0 => Some(value),
            DurationValue::Millis(_) => None,
            DurationValue::Text(text) => TimeUnit::resolve_millis(&text, TimeUnit::Milliseconds),
        };
        millis.ok_or_else(|| TimerError::Config(format!("'{}' is not a valid duration", key)))
    }
}

#[derive(Debug, Default, Deserialize)]
struct TimerSection {
    heartbeat_period: Option<DurationValue>,
    frame_threshold: Option<DurationValue>,
    frame_interval: Option<DurationValue>,
    frame_source: Option<FrameSourceKind>,
    error_policy: Option<ErrorPolicy>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    timer: TimerSection,
}

impl SchedulerConfig {
    /// Read the `[timer]` table of an already assembled `config::Config`.
    ///
    /// Missing keys keep their defaults.
    pub fn from_config(config: &Config) -> Result<Self, TimerError> {
        let file: ConfigFile = config.clone().try_deserialize()?;
        let section = file.timer;
        let mut resolved = Self::default();

        if let Some(value) = section.heartbeat_period {
            resolved.heartbeat_period = value.resolve("timer.heartbeat_period")?;
        }
        if let Some(value) = section.frame_threshold {
            resolved.frame_threshold = value.resolve("timer.frame_threshold")?;
        }
        if let Some(value) = section.frame_interval {
            resolved.frame_interval = value.resolve("timer.frame_interval")?;
        }
        if let Some(kind) = section.frame_source {
            resolved.frame_source = kind;
        }
        if let Some(policy) = section.error_policy {
            resolved.error_policy = policy;
        }

        resolved.validate()?;
        Ok(resolved)
    }

    pub(crate) fn validate(&self) -> Result<(), TimerError> {
        check_period("heartbeat_period", self.heartbeat_period)?;
        check_period("frame_interval", self.frame_interval)?;
        Ok(())
    }
}

/// Periods drive tokio intervals, which reject a zero `Duration`.
fn check_period(key: &str, period: Millis) -> Result<(), TimerError> {
    if period.is_finite() && millis(period) > Duration::ZERO {
        Ok(())
    } else {
        Err(TimerError::Config(format!(
            "{} must be a finite period of at least one microsecond, got {}",
            key, period
        )))
    }
}

fn load<P: AsRef<Path>>(path: P, format: FileFormat) -> Result<Config, TimerError> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()).format(format))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;
    Ok(config)
}

/// Load scheduler settings from a TOML file, overridable from the environment
pub fn load_toml_config<P: AsRef<Path>>(path: P) -> Result<SchedulerConfig, TimerError> {
    SchedulerConfig::from_config(&load(path, FileFormat::Toml)?)
}

/// Load scheduler settings from a YAML file, overridable from the environment
pub fn load_yaml_config<P: AsRef<Path>>(path: P) -> Result<SchedulerConfig, TimerError> {
    SchedulerConfig::from_config(&load(path, FileFormat::Yaml)?)
}
