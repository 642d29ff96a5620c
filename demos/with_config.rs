use chrono::Local;
use frametimer::{BoxError, SchedulerBuilder, TimeUnit};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .with_target(false)
        .init();

    println!("🚀 Starting scheduler with TOML configuration...\n");
    println!("📁 Config file: demos/config/frametimer.toml");
    println!("💡 Override any value with FRAMETIMER__TIMER__<KEY>, e.g.");
    println!("   FRAMETIMER__TIMER__FRAME_INTERVAL=8ms\n");

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/config/frametimer.toml");
    let scheduler = SchedulerBuilder::with_toml(path)?.build()?;

    let config = scheduler.config();
    println!("📝 Configuration values:");
    println!("   - heartbeat_period: {}ms", config.heartbeat_period);
    println!("   - frame_threshold: {}ms", config.frame_threshold);
    println!("   - frame_interval: {}ms", config.frame_interval);
    println!("   - frame_source: {:?}", config.frame_source);
    println!("   - error_policy: {:?}\n", config.error_policy);

    // Near deadline: served on frames
    scheduler.timeout(
        |elapsed| {
            let now = Local::now().format("%H:%M:%S%.3f");
            println!("[{}] ⚡ [NEAR] fired after {:.1}ms", now, elapsed);
        },
        20.0,
        None,
    );

    // Far deadline: sleeps on the coarse alarm
    scheduler.timeout(
        |elapsed| {
            let now = Local::now().format("%H:%M:%S%.3f");
            println!("[{}] 💤 [FAR] fired after {:.1}ms", now, elapsed);
        },
        TimeUnit::resolve_millis("1.5s", TimeUnit::Milliseconds).unwrap_or(1500.0),
        None,
    );

    // A failing callback is logged and the loop keeps going
    scheduler.timeout(
        |_| Err::<(), BoxError>("sprite sheet not loaded".into()),
        100.0,
        None,
    );

    scheduler.run_until_idle().await?;
    println!("\n✅ All timers fired.");
    Ok(())
}
