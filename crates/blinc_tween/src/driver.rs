//! Frame driver
//!
//! Turns frame timestamps into phase ticks: `Normal` then `Late` once per
//! frame, and `Fixed` zero or more times at a fixed step accumulated from
//! scaled time.

use std::time::Instant;

use crate::scheduler::TweenScheduler;
use crate::tween::UpdatePhase;

/// Default fixed step, 50 Hz
pub const DEFAULT_FIXED_STEP: f32 = 0.02;

/// Longest frame delta fed to the scheduler
pub const DEFAULT_MAX_DELTA: f32 = 0.25;

// Bounds catch-up work after a hitch
const MAX_FIXED_STEPS_PER_FRAME: u32 = 8;

/// Host-side tick source for a [`TweenScheduler`]
#[derive(Clone, Debug)]
pub struct FrameDriver {
    last: Option<Instant>,
    time_scale: f32,
    fixed_step: f32,
    fixed_accum: f32,
    max_delta: f32,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            last: None,
            time_scale: 1.0,
            fixed_step: DEFAULT_FIXED_STEP,
            fixed_accum: 0.0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Multiplier for scaled buckets; negative values clamp to 0
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.set_time_scale(time_scale);
        self
    }

    pub fn with_fixed_step(mut self, fixed_step: f32) -> Self {
        if fixed_step > 0.0 {
            self.fixed_step = fixed_step;
        }
        self
    }

    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        if max_delta > 0.0 {
            self.max_delta = max_delta;
        }
        self
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = if time_scale.is_nan() { 0.0 } else { time_scale.max(0.0) };
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    /// Tick with the time since the previous call; the first call only
    /// records the timestamp
    pub fn advance(&mut self, now: Instant, scheduler: &TweenScheduler) {
        let Some(last) = self.last.replace(now) else {
            return;
        };
        let dt = now.saturating_duration_since(last).as_secs_f32();
        self.advance_by(dt, scheduler);
    }

    /// Tick with an explicit unscaled frame delta
    pub fn advance_by(&mut self, dt: f32, scheduler: &TweenScheduler) {
        let unscaled = if dt.is_nan() { 0.0 } else { dt.clamp(0.0, self.max_delta) };
        let scaled = unscaled * self.time_scale;

        scheduler.tick(UpdatePhase::Normal, scaled, unscaled);
        scheduler.tick(UpdatePhase::Late, scaled, unscaled);

        self.fixed_accum += scaled;
        let mut steps = 0;
        while self.fixed_accum >= self.fixed_step && steps < MAX_FIXED_STEPS_PER_FRAME {
            self.fixed_accum -= self.fixed_step;
            scheduler.tick(UpdatePhase::Fixed, self.fixed_step, self.fixed_step);
            steps += 1;
        }
        if steps == MAX_FIXED_STEPS_PER_FRAME {
            self.fixed_accum = self.fixed_accum.min(self.fixed_step);
        }
    }

    /// Forget the previous timestamp and any partial fixed step
    pub fn reset(&mut self) {
        self.last = None;
        self.fixed_accum = 0.0;
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn phase_cell(scheduler: &TweenScheduler, phase: UpdatePhase) -> Rc<Cell<f32>> {
        let value = Rc::new(Cell::new(0.0));
        let read = value.clone();
        let write = value.clone();
        scheduler
            .to(None, move || read.get(), move |v| write.set(v), 100.0, 100.0)
            .set_update(phase, false);
        value
    }

    #[test]
    fn test_normal_and_late_tick_every_frame() {
        let scheduler = TweenScheduler::new();
        let normal = phase_cell(&scheduler, UpdatePhase::Normal);
        let late = phase_cell(&scheduler, UpdatePhase::Late);
        let mut driver = FrameDriver::new();

        driver.advance_by(0.1, &scheduler);
        assert!((normal.get() - 0.1).abs() < 1e-4);
        assert!((late.get() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_fixed_steps_accumulate() {
        let scheduler = TweenScheduler::new();
        let fixed = phase_cell(&scheduler, UpdatePhase::Fixed);
        let mut driver = FrameDriver::new().with_fixed_step(0.05);

        driver.advance_by(0.03, &scheduler);
        assert_eq!(fixed.get(), 0.0);
        driver.advance_by(0.03, &scheduler);
        assert!((fixed.get() - 0.05).abs() < 1e-4);
        driver.advance_by(0.1, &scheduler);
        assert!((fixed.get() - 0.15).abs() < 1e-4);
    }

    #[test]
    fn test_time_scale_only_affects_scaled_buckets() {
        let scheduler = TweenScheduler::new();
        let scaled = phase_cell(&scheduler, UpdatePhase::Normal);
        let unscaled = Rc::new(Cell::new(0.0_f32));
        let (read, write) = (unscaled.clone(), unscaled.clone());
        scheduler
            .to(None, move || read.get(), move |v| write.set(v), 100.0, 100.0)
            .set_update(UpdatePhase::Normal, true);

        let mut driver = FrameDriver::new().with_time_scale(0.5);
        driver.advance_by(0.2, &scheduler);
        assert!((scaled.get() - 0.1).abs() < 1e-4);
        assert!((unscaled.get() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_hitches_are_clamped() {
        let scheduler = TweenScheduler::new();
        let normal = phase_cell(&scheduler, UpdatePhase::Normal);
        let mut driver = FrameDriver::new().with_max_delta(0.1);

        driver.advance_by(5.0, &scheduler);
        assert!((normal.get() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_first_timestamp_only_primes() {
        let scheduler = TweenScheduler::new();
        let normal = phase_cell(&scheduler, UpdatePhase::Normal);
        let mut driver = FrameDriver::new();
        let start = Instant::now();

        driver.advance(start, &scheduler);
        assert_eq!(normal.get(), 0.0);
        driver.advance(start + Duration::from_millis(100), &scheduler);
        assert!((normal.get() - 0.1).abs() < 1e-4);
    }
}
