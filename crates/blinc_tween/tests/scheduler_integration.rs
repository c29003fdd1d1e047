//! Integration tests for the scheduler, property drivers and handles
//!
//! These tests verify that:
//! - Pooled property drivers never carry state between rentals
//! - Global kills work from inside another tween's callback
//! - Bucket moves keep progress and respect phase ordering
//! - The frame driver feeds every phase the right deltas

use blinc_tween::{
    FrameDriver, LoopType, TargetRef, TweenError, TweenId, TweenScheduler, UpdatePhase, Vec2,
};
use std::cell::Cell;
use std::rc::Rc;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn bind(value: &Rc<Cell<f32>>) -> (impl FnMut() -> f32, impl FnMut(f32)) {
    let read = value.clone();
    let write = value.clone();
    (move || read.get(), move |v| write.set(v))
}

/// Releasing and re-renting must not observe the previous rental's bindings
#[test]
fn test_pooled_rentals_do_not_cross_talk() {
    let scheduler = TweenScheduler::new();

    let a = Rc::new(Cell::new(0.0));
    let (get_a, set_a) = bind(&a);
    let first = scheduler.to(None, get_a, set_a, 10.0, 1.0);
    first.set_relative(true).set_loops(2, LoopType::Incremental);
    first.complete(true);

    assert!(approx(a.get(), 10.0));
    assert_eq!(scheduler.pooled_properties::<f32>(), 1);
    assert_eq!(first.try_with(|_| ()), Err(TweenError::Released));

    let b = Rc::new(Cell::new(0.0));
    let (get_b, set_b) = bind(&b);
    let second = scheduler.to(None, get_b, set_b, 5.0, 1.0);
    assert_eq!(scheduler.pooled_properties::<f32>(), 0);

    scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
    assert!(approx(b.get(), 2.5));
    assert!(approx(a.get(), 10.0));
    assert_eq!(second.loops_done(), Some(0));

    // The old handle is stale and cannot reach the new rental
    first.pause();
    assert!(second.is_playing());
}

/// An absolute incremental rental measures its own delta, not the one cached
/// by the rental before it
#[test]
fn test_pooled_rentals_resolve_their_own_incremental_delta() {
    let scheduler = TweenScheduler::new();

    let a = Rc::new(Cell::new(0.0));
    let (get_a, set_a) = bind(&a);
    let first = scheduler.to(None, get_a, set_a, 10.0, 1.0);
    first.set_loops(2, LoopType::Incremental);
    scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
    assert!(approx(a.get(), 5.0));
    first.complete(false);
    assert_eq!(scheduler.pooled_properties::<f32>(), 1);

    let b = Rc::new(Cell::new(4.0));
    let (get_b, set_b) = bind(&b);
    let second = scheduler.to(None, get_b, set_b, 10.0, 1.0);
    second.set_loops(2, LoopType::Incremental);
    assert_eq!(scheduler.pooled_properties::<f32>(), 0);

    scheduler.tick(UpdatePhase::Normal, 1.0, 1.0);
    assert!(approx(b.get(), 10.0));
    scheduler.tick(UpdatePhase::Normal, 0.0, 0.0);
    scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);

    assert_eq!(second.loops_done(), Some(1));
    assert!(approx(second.end_value().unwrap_or(f32::NAN), 16.0));
    assert!(approx(b.get(), 13.0));
}

#[test]
fn test_pools_are_keyed_by_value_type() {
    let scheduler = TweenScheduler::new();
    let scalar = Rc::new(Cell::new(0.0));
    let (get, set) = bind(&scalar);
    scheduler.to(None, get, set, 1.0, 0.1).complete(false);

    let point = Rc::new(Cell::new(Vec2::new(0.0, 0.0)));
    let (read, write) = (point.clone(), point.clone());
    scheduler.to(None, move || read.get(), move |v| write.set(v), Vec2::new(4.0, 2.0), 1.0);

    assert_eq!(scheduler.pooled_properties::<f32>(), 1);
    assert_eq!(scheduler.pooled_properties::<Vec2>(), 0);

    scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
    let p = point.get();
    assert!(approx(p.x, 2.0) && approx(p.y, 1.0));
}

/// Kill by target from inside another tween's completion callback
#[test]
fn test_kill_target_from_callback() {
    let scheduler = TweenScheduler::new();
    let handle = scheduler.handle();
    let owner = Rc::new(());
    let target = TargetRef::from_rc(&owner);

    let killed = Rc::new(Cell::new(0));
    let killed_count = killed.clone();
    let kill_target = target.clone();
    scheduler
        .tween(None)
        .add_interval(0.1)
        .on_complete(move || killed_count.set(handle.kill_target(&kill_target, false)));

    let value = Rc::new(Cell::new(0.0));
    let (get, set) = bind(&value);
    let driven = scheduler.to(Some(target.clone()), get, set, 10.0, 1.0);

    scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
    scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);

    assert_eq!(killed.get(), 1);
    assert!(approx(value.get(), 2.0));
    assert!(!scheduler.is_tweening_target(&target));
    assert_eq!(scheduler.active_count(), 0);
    assert!(!driven.is_valid());

    scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
    assert!(approx(value.get(), 2.0));
}

#[test]
fn test_paused_tween_still_counts_as_tweening() {
    let scheduler = TweenScheduler::new();
    let tween = scheduler.tween(None);
    tween.add_interval(1.0).set_id("pulse").pause();

    let id = TweenId::from("pulse");
    assert!(scheduler.is_tweening_id(&id));

    tween.kill();
    assert!(!scheduler.is_tweening_id(&id));
}

#[test]
fn test_bucket_change_keeps_progress() {
    let scheduler = TweenScheduler::new();
    let value = Rc::new(Cell::new(0.0));
    let (get, set) = bind(&value);
    let tween = scheduler.to(None, get, set, 10.0, 1.0);

    scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
    assert!(approx(value.get(), 5.0));

    tween.set_update(UpdatePhase::Late, false);
    scheduler.tick(UpdatePhase::Normal, 0.25, 0.25);
    assert!(approx(value.get(), 5.0));

    scheduler.tick(UpdatePhase::Late, 0.25, 0.25);
    assert!(approx(value.get(), 7.5));
    assert_eq!(scheduler.bucket_len(UpdatePhase::Late, false), 1);
    assert_eq!(scheduler.bucket_len(UpdatePhase::Normal, false), 0);
}

#[test]
fn test_frame_driver_runs_delayed_fixed_tween() {
    let scheduler = TweenScheduler::new();
    let value = Rc::new(Cell::new(0.0));
    let (get, set) = bind(&value);
    scheduler
        .to(None, get, set, 10.0, 1.0)
        .set_delay(0.075)
        .set_update(UpdatePhase::Fixed, false);

    let mut driver = FrameDriver::new().with_fixed_step(0.05);
    driver.advance_by(0.05, &scheduler);
    assert_eq!(value.get(), 0.0);

    driver.advance_by(0.05, &scheduler);
    assert!(approx(value.get(), 0.25));

    driver.advance_by(0.05, &scheduler);
    assert!(approx(value.get(), 0.75));
}

#[test]
fn test_yoyo_runs_there_and_back() {
    let scheduler = TweenScheduler::new();
    let value = Rc::new(Cell::new(0.0));
    let (get, set) = bind(&value);
    let completed = Rc::new(Cell::new(false));
    let done = completed.clone();
    scheduler
        .to(None, get, set, 8.0, 1.0)
        .set_loops(2, LoopType::Yoyo)
        .on_complete(move || done.set(true));

    let mut samples = Vec::new();
    for _ in 0..8 {
        scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
        samples.push(value.get());
    }

    assert!(approx(samples[0], 4.0));
    assert!(approx(samples[1], 8.0));
    assert!(samples.iter().skip(2).all(|v| *v <= 8.0 + 1e-4));
    assert!(approx(value.get(), 0.0));
    assert_eq!(scheduler.active_count(), 0);
    assert!(!completed.get());
}

#[test]
fn test_infinite_loops_run_until_killed() {
    let scheduler = TweenScheduler::new();
    let value = Rc::new(Cell::new(0.0));
    let (get, set) = bind(&value);
    let tween = scheduler.to(None, get, set, 1.0, 0.25);
    tween.set_loops(-1, LoopType::Restart);

    for _ in 0..100 {
        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
    }
    assert_eq!(scheduler.active_count(), 1);
    assert!(tween.loops_done().is_some_and(|n| n > 10));

    assert_eq!(scheduler.kill_all(false), 1);
    assert_eq!(scheduler.active_count(), 0);
}
