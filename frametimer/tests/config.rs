use std::fs;
use std::path::PathBuf;

use frametimer::{
    load_yaml_config, ErrorPolicy, FrameSourceKind, SchedulerBuilder, SchedulerConfig, TimerError,
};

fn write_config(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("frametimer-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn builder_reads_toml_files() {
    let path = write_config(
        "frametimer.toml",
        r#"
        [timer]
        heartbeat_period = "2s"
        frame_threshold = 40
        frame_interval = "8ms"
        frame_source = "timeout"
        "#,
    );

    let scheduler = SchedulerBuilder::with_toml(&path).unwrap().build().unwrap();
    let config = scheduler.config();
    assert_eq!(config.heartbeat_period, 2000.0);
    assert_eq!(config.frame_threshold, 40.0);
    assert_eq!(config.frame_interval, 8.0);
    assert_eq!(config.frame_source, FrameSourceKind::Timeout);
    assert_eq!(config.error_policy, ErrorPolicy::Log);
}

#[test]
fn builder_reads_yaml_files() {
    let path = write_config(
        "frametimer.yaml",
        "timer:\n  heartbeat_period: 500ms\n  error_policy: propagate\n",
    );

    let scheduler = SchedulerBuilder::with_yaml(&path).unwrap().build().unwrap();
    assert_eq!(scheduler.config().heartbeat_period, 500.0);
    assert_eq!(scheduler.config().error_policy, ErrorPolicy::Propagate);
    assert_eq!(scheduler.config().frame_threshold, 24.0);
}

#[test]
fn files_without_a_timer_table_use_defaults() {
    let path = write_config("unrelated.yaml", "app:\n  name: demo\n");
    assert_eq!(load_yaml_config(&path).unwrap(), SchedulerConfig::default());
}

#[test]
fn builder_setters_override_file_values() {
    let path = write_config("override.toml", "[timer]\nframe_threshold = 100\n");
    let scheduler = SchedulerBuilder::with_toml(&path)
        .unwrap()
        .frame_threshold(10.0)
        .build()
        .unwrap();
    assert_eq!(scheduler.config().frame_threshold, 10.0);
}

#[test]
fn missing_files_are_reported() {
    let err = SchedulerBuilder::with_toml("does/not/exist.toml").unwrap_err();
    assert!(matches!(err, TimerError::ConfigSource(_)), "{err:?}");
}

#[test]
fn invalid_values_fail_the_build() {
    let path = write_config("invalid.toml", "[timer]\nframe_interval = \"soon\"\n");
    assert!(matches!(
        SchedulerBuilder::with_toml(&path),
        Err(TimerError::Config(_))
    ));

    let err = SchedulerBuilder::new().heartbeat_period(0.0).build().unwrap_err();
    assert!(matches!(err, TimerError::Config(_)), "{err:?}");
}

#[test]
fn periods_that_round_to_zero_fail_the_build() {
    let err = SchedulerBuilder::new()
        .heartbeat_period(f64::NAN)
        .build()
        .unwrap_err();
    assert!(matches!(err, TimerError::Config(_)), "{err:?}");

    let err = SchedulerBuilder::new().frame_interval(0.0001).build().unwrap_err();
    assert!(matches!(err, TimerError::Config(_)), "{err:?}");

    let path = write_config("tiny.toml", "[timer]\nheartbeat_period = \"0.0001ms\"\n");
    assert!(matches!(
        SchedulerBuilder::with_toml(&path),
        Err(TimerError::Config(_))
    ));

    assert!(SchedulerBuilder::new().frame_interval(0.5).build().is_ok());
}
