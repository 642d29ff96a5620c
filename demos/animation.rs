use chrono::Local;
use frametimer::{Scheduler, SchedulerBuilder};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

/// Linear tween of a value over a fixed duration.
struct Tween {
    from: f64,
    to: f64,
    duration: f64,
    value: f64,
}

impl Tween {
    fn step(&mut self, elapsed: f64) -> bool {
        let t = (elapsed / self.duration).min(1.0);
        self.value = self.from + (self.to - self.from) * t;
        t >= 1.0
    }
}

fn animate(scheduler: &Scheduler, name: &'static str, tween: Tween, delay: f64) {
    let tween = Rc::new(RefCell::new(tween));
    let timer = scheduler.timer(|_| (), None, None);
    let handle = timer.clone();
    let restarted = timer.restart(
        move |elapsed| {
            let mut tween = tween.borrow_mut();
            let done = tween.step(elapsed);
            println!(
                "[{}] [{}] {:>6.1}ms -> {:>6.2}",
                Local::now().format("%H:%M:%S%.3f"),
                name,
                elapsed,
                tween.value
            );
            if done {
                handle.stop();
            }
        },
        delay,
        None,
    );
    if let Err(err) = restarted {
        tracing::error!(%err, name, "could not start animation");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_target(false)
        .init();

    println!("🎞️  Staggered tweens on a shared frame loop\n");

    let local = LocalSet::new();
    local
        .run_until(async {
            let scheduler = SchedulerBuilder::new().frame_interval(16.0).build()?;
            let driver = scheduler.start();

            let fade = Tween { from: 0.0, to: 1.0, duration: 300.0, value: 0.0 };
            let slide = Tween { from: -200.0, to: 0.0, duration: 400.0, value: -200.0 };
            animate(&scheduler, "FADE", fade, 0.0);
            animate(&scheduler, "SLIDE", slide, 150.0);

            // Far enough out to sleep on the coarse alarm between frames
            scheduler.timeout(
                |elapsed| println!("\n⏰ [DONE] all tweens settled ({:.1}ms)", elapsed),
                1000.0,
                None,
            );

            tokio::time::sleep(Duration::from_millis(1200)).await;
            println!("\n👋 Shutting down driver...");
            driver.shutdown().await?;
            Ok::<_, Box<dyn std::error::Error>>(())
        })
        .await
}
