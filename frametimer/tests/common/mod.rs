#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use frametimer::{Clock, ManualClock, Scheduler, SchedulerBuilder};

pub const FRAME: f64 = 17.0;

/// Scheduler on a hand-driven clock reading `start`.
pub fn scheduler_at(start: f64) -> (Scheduler, ManualClock) {
    let clock = ManualClock::new(start);
    let scheduler = SchedulerBuilder::new()
        .clock(clock.clone())
        .build()
        .expect("default config is valid");
    (scheduler, clock)
}

/// Advance the clock by one frame and deliver the frame tick.
pub fn frame(scheduler: &Scheduler, clock: &ManualClock) {
    clock.advance(FRAME);
    scheduler.on_frame().expect("frame callbacks succeed");
}

/// Play the host: deliver frames or the coarse alarm, whichever is armed,
/// until the scheduler goes idle or the next wake would land past `limit`.
pub fn run_host(scheduler: &Scheduler, clock: &ManualClock, limit: f64) {
    loop {
        let armed = scheduler.armed();
        if armed.frame || armed.clear_pending {
            if clock.now() + FRAME > limit {
                break;
            }
            frame(scheduler, clock);
        } else if let Some(at) = armed.timeout_at {
            if at > limit {
                break;
            }
            clock.set(at.max(clock.now()));
            scheduler.on_timeout().expect("alarm callbacks succeed");
        } else {
            break;
        }
    }
}

/// Shared log callbacks can push into.
pub fn log<T>() -> Rc<RefCell<Vec<T>>> {
    Rc::new(RefCell::new(Vec::new()))
}
