mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{frame, log, run_host, scheduler_at};
use frametimer::TimerKind;

#[test]
fn timeout_invokes_the_callback_once() {
    let (scheduler, clock) = scheduler_at(1000.0);
    let count = Rc::new(Cell::new(0));
    let counter = count.clone();
    let timer = scheduler.timeout(move |_| counter.set(counter.get() + 1), None, None);
    assert_eq!(timer.kind(), TimerKind::Timeout);

    for _ in 0..5 {
        scheduler.timer_flush().unwrap();
    }
    frame(&scheduler, &clock);
    frame(&scheduler, &clock);
    assert_eq!(count.get(), 1);
    assert!(!timer.is_active());
}

#[test]
fn timeout_with_delay_fires_after_the_delay() {
    let (scheduler, clock) = scheduler_at(1000.0);
    let then = scheduler.now();
    let fired = log();

    let (recorder, observer) = (fired.clone(), scheduler.clone());
    scheduler.timeout(
        move |elapsed| recorder.borrow_mut().push((elapsed, observer.now() - then)),
        50.0,
        None,
    );

    run_host(&scheduler, &clock, 5000.0);
    let fired = fired.borrow();
    assert_eq!(fired.len(), 1);
    let (elapsed, since_then) = fired[0];
    assert_eq!(elapsed, since_then);
    assert!((50.0..=60.0).contains(&since_then), "fired {since_then}ms after scheduling");
}

#[test]
fn timeout_with_delay_and_time_is_relative_to_time() {
    let (scheduler, clock) = scheduler_at(1000.0);
    let then = scheduler.now() + 50.0;
    let fired = log();

    let (recorder, observer) = (fired.clone(), scheduler.clone());
    scheduler.timeout(
        move |elapsed| recorder.borrow_mut().push((elapsed, observer.now() - then)),
        50.0,
        then,
    );

    run_host(&scheduler, &clock, 5000.0);
    let fired = fired.borrow();
    assert_eq!(fired.len(), 1);
    let (elapsed, since_then) = fired[0];
    assert_eq!(elapsed, since_then);
    assert!((50.0..=60.0).contains(&since_then), "fired {since_then}ms after {then}");
}

#[test]
fn timeout_passes_elapsed_time_since_scheduling() {
    let (scheduler, clock) = scheduler_at(1000.0);
    let then = scheduler.now();
    let fired = log();

    let (recorder, observer) = (fired.clone(), scheduler.clone());
    scheduler.timeout(
        move |elapsed| recorder.borrow_mut().push((elapsed, observer.now() - then)),
        None,
        None,
    );

    frame(&scheduler, &clock);
    assert_eq!(*fired.borrow(), vec![(17.0, 17.0)]);
}

#[test]
fn stopped_timeout_never_fires() {
    let (scheduler, clock) = scheduler_at(1000.0);
    let count = Rc::new(Cell::new(0));
    let counter = count.clone();
    let timer = scheduler.timeout(move |_| counter.set(counter.get() + 1), None, None);
    timer.stop();

    run_host(&scheduler, &clock, 1100.0);
    assert_eq!(count.get(), 0);
    assert_eq!(scheduler.queue_len(), 0);
}

#[test]
fn restarting_a_timeout_keeps_it_one_shot() {
    let (scheduler, clock) = scheduler_at(1000.0);
    let count = Rc::new(Cell::new(0));
    let timer = scheduler.timeout(|_| (), 500.0, None);

    let counter = count.clone();
    timer
        .restart(move |_| counter.set(counter.get() + 1), 20.0, None)
        .unwrap();
    assert_eq!(timer.kind(), TimerKind::Timeout);

    run_host(&scheduler, &clock, 2000.0);
    assert_eq!(count.get(), 1);
    assert!(!timer.is_linked());
}

#[test]
fn timeout_reentering_the_flush_still_fires_once() {
    let (scheduler, _clock) = scheduler_at(1000.0);
    let count = Rc::new(Cell::new(0));
    let (counter, nested) = (count.clone(), scheduler.clone());
    scheduler.timeout(
        move |_| {
            counter.set(counter.get() + 1);
            nested.timer_flush()
        },
        None,
        None,
    );

    scheduler.timer_flush().unwrap();
    assert_eq!(count.get(), 1);
}
