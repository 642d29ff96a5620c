use chrono::Local;
use frametimer::Scheduler;
use std::cell::Cell;
use std::rc::Rc;

fn stamp() -> String {
    Local::now().format("%H:%M:%S%.3f").to_string()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 Frame timers: timeout, interval and a per-frame timer\n");

    let scheduler = Scheduler::new();

    // Fires once, 250ms from now
    scheduler.timeout(
        |elapsed| println!("[{}] [TIMEOUT] fired after {:.1}ms", stamp(), elapsed),
        250.0,
        None,
    );

    // Fires every 100ms, five times
    let ticks = Rc::new(Cell::new(0));
    let interval = scheduler.interval(|_| (), 100.0, None);
    let (counter, handle) = (ticks.clone(), interval.clone());
    interval.restart(
        move |elapsed| {
            counter.set(counter.get() + 1);
            println!("[{}] [INTERVAL] tick #{} at {:.1}ms", stamp(), counter.get(), elapsed);
            if counter.get() == 5 {
                handle.stop();
            }
        },
        100.0,
        None,
    )?;

    // Fires on every frame for the first 80ms
    let frames = Rc::new(Cell::new(0));
    let timer = scheduler.timer(|_| (), None, None);
    let (counter, handle) = (frames.clone(), timer.clone());
    timer.restart(
        move |elapsed| {
            counter.set(counter.get() + 1);
            if elapsed >= 80.0 {
                println!("[{}] [FRAME] stopped after {} frames", stamp(), counter.get());
                handle.stop();
            }
        },
        None,
        None,
    )?;

    scheduler.run_until_idle().await?;

    println!("\n✅ Queue drained: {} interval ticks, {} frames", ticks.get(), frames.get());
    Ok(())
}
