use frametimer::{load_toml_config, FrameSourceKind};

#[test]
fn environment_overrides_file_values() {
    let dir = std::env::temp_dir().join(format!("frametimer-env-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("frametimer.toml");
    std::fs::write(&path, "[timer]\nframe_interval = 17\nframe_threshold = 24\n").unwrap();

    std::env::set_var("FRAMETIMER__TIMER__FRAME_INTERVAL", "8ms");
    std::env::set_var("FRAMETIMER__TIMER__FRAME_SOURCE", "timeout");
    let config = load_toml_config(&path).unwrap();
    std::env::remove_var("FRAMETIMER__TIMER__FRAME_INTERVAL");
    std::env::remove_var("FRAMETIMER__TIMER__FRAME_SOURCE");

    assert_eq!(config.frame_interval, 8.0);
    assert_eq!(config.frame_source, FrameSourceKind::Timeout);
    assert_eq!(config.frame_threshold, 24.0);
}
