//! Generation-checked handles to scheduled animatables
//!
//! Factories on the scheduler return a [`TweenHandle`]. Pooled instances
//! are recycled, so a handle remembers the generation it was issued for and
//! refuses to touch the instance once it has been released or rented again.
//!
//! Fluent methods log and ignore failures so chains stay terse. Use
//! [`TweenHandle::try_with_mut`] where the error matters.

use std::cell::RefCell;
use std::rc::Rc;

use crate::easing::Easing;
use crate::error::{Result, TweenError};
use crate::property::PropertyTween;
use crate::step::Step;
use crate::target::{TargetRef, TweenId};
use crate::timeline::{Timeline, TimelineEntryId};
use crate::tween::{ActionTween, Animatable, LoopType, SharedAnimatable, UpdatePhase};

/// Handle to a property tween
pub type PropertyHandle<T> = TweenHandle<PropertyTween<T>>;

/// Handle to a timeline
pub type TimelineHandle = TweenHandle<Timeline>;

/// Handle to a step-based action tween
pub type ActionHandle = TweenHandle<ActionTween>;

/// Shared reference to an animatable plus the generation it was issued for
pub struct TweenHandle<A> {
    cell: Rc<RefCell<A>>,
    generation: u64,
}

impl<A> Clone for TweenHandle<A> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            generation: self.generation,
        }
    }
}

impl<A: Animatable + 'static> TweenHandle<A> {
    /// Wrap an instance at its current generation
    pub fn new(cell: Rc<RefCell<A>>) -> Self {
        let generation = cell.try_borrow().map_or(0, |a| a.core().generation());
        Self { cell, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn check(&self, animatable: &A) -> Result<()> {
        if animatable.is_released() {
            return Err(TweenError::Released);
        }
        let current = animatable.core().generation();
        if current != self.generation {
            return Err(TweenError::Stale {
                held: self.generation,
                current,
            });
        }
        Ok(())
    }

    pub fn try_with<R>(&self, f: impl FnOnce(&A) -> R) -> Result<R> {
        let animatable = self.cell.try_borrow().map_err(|_| TweenError::Busy)?;
        self.check(&animatable)?;
        Ok(f(&animatable))
    }

    pub fn try_with_mut<R>(&self, f: impl FnOnce(&mut A) -> R) -> Result<R> {
        let mut animatable = self.cell.try_borrow_mut().map_err(|_| TweenError::Busy)?;
        self.check(&animatable)?;
        Ok(f(&mut animatable))
    }

    /// Whether the handle still refers to the instance it was issued for
    pub fn is_valid(&self) -> bool {
        self.try_with(|_| ()).is_ok()
    }

    /// Type-erased reference, e.g. for placing on a timeline
    pub fn shared(&self) -> SharedAnimatable {
        self.cell.clone()
    }

    fn apply(&self, op: &'static str, f: impl FnOnce(&mut A)) -> &Self {
        if let Err(err) = self.try_with_mut(f) {
            tracing::warn!(%err, op, "tween handle operation ignored");
        }
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn set_id(&self, id: impl Into<TweenId>) -> &Self {
        let id = id.into();
        self.apply("set_id", |a| {
            a.core_mut().set_id(id);
        })
    }

    pub fn set_target(&self, target: Option<TargetRef>) -> &Self {
        self.apply("set_target", |a| {
            a.core_mut().set_target(target);
        })
    }

    pub fn set_update(&self, phase: UpdatePhase, unscaled: bool) -> &Self {
        self.apply("set_update", |a| {
            a.core_mut().set_update(phase, unscaled);
        })
    }

    pub fn set_delay(&self, delay: f32) -> &Self {
        self.apply("set_delay", |a| {
            a.core_mut().set_delay(delay);
        })
    }

    pub fn set_speed(&self, speed: f32) -> &Self {
        self.apply("set_speed", |a| {
            a.core_mut().set_speed(speed);
        })
    }

    pub fn set_loops(&self, loops: i32, loop_type: LoopType) -> &Self {
        self.apply("set_loops", |a| {
            a.core_mut().set_loops(loops, loop_type);
        })
    }

    /// Ease for the most recently added step
    pub fn set_ease(&self, ease: Easing) -> &Self {
        self.apply("set_ease", |a| {
            a.core_mut().set_ease(ease);
        })
    }

    pub fn set_auto_kill(&self, auto_kill: bool) -> &Self {
        self.apply("set_auto_kill", |a| {
            a.core_mut().set_auto_kill(auto_kill);
        })
    }

    pub fn set_auto_play(&self, auto_play: bool) -> &Self {
        self.apply("set_auto_play", |a| {
            a.core_mut().set_auto_play(auto_play);
        })
    }

    pub fn on_complete<F: FnMut() + 'static>(&self, f: F) -> &Self {
        self.apply("on_complete", |a| {
            a.core_mut().on_complete(f);
        })
    }

    pub fn on_play<F: FnMut() + 'static>(&self, f: F) -> &Self {
        self.apply("on_play", |a| {
            a.core_mut().on_play(f);
        })
    }

    pub fn on_pause<F: FnMut() + 'static>(&self, f: F) -> &Self {
        self.apply("on_pause", |a| {
            a.core_mut().on_pause(f);
        })
    }

    pub fn on_kill<F: FnMut() + 'static>(&self, f: F) -> &Self {
        self.apply("on_kill", |a| {
            a.core_mut().on_kill(f);
        })
    }

    pub fn add_interval(&self, duration: f32) -> &Self {
        self.apply("add_interval", |a| {
            a.core_mut().add_interval(duration);
        })
    }

    pub fn add_callback<F: FnMut() + 'static>(&self, callback: F) -> &Self {
        self.apply("add_callback", |a| {
            a.core_mut().add_callback(callback);
        })
    }

    // =========================================================================
    // Playback
    // =========================================================================

    pub fn play(&self) -> &Self {
        self.apply("play", |a| {
            a.core_mut().play();
        })
    }

    pub fn resume(&self) -> &Self {
        self.apply("resume", |a| {
            a.core_mut().resume();
        })
    }

    pub fn pause(&self) -> &Self {
        self.apply("pause", |a| {
            a.core_mut().pause();
        })
    }

    pub fn kill(&self) -> &Self {
        self.apply("kill", |a| {
            a.core_mut().kill();
        })
    }

    pub fn play_forward(&self) -> &Self {
        self.apply("play_forward", |a| {
            a.core_mut().play_forward();
        })
    }

    pub fn play_backwards(&self) -> &Self {
        self.apply("play_backwards", |a| {
            a.core_mut().play_backwards();
        })
    }

    pub fn play_from_end(&self) -> &Self {
        self.apply("play_from_end", |a| a.play_from_end())
    }

    pub fn goto(&self, time: f32, play: bool) -> &Self {
        self.apply("goto", |a| a.goto(time, play))
    }

    pub fn goto_normalized(&self, t01: f32, play: bool) -> &Self {
        self.apply("goto_normalized", |a| a.goto_normalized(t01, play))
    }

    pub fn rewind(&self, play: bool) -> &Self {
        self.apply("rewind", |a| a.rewind(play))
    }

    pub fn restart(&self, play: bool) -> &Self {
        self.apply("restart", |a| a.restart(play))
    }

    /// Jump to the end; the handle usually goes stale if this released it
    pub fn complete(&self, with_callbacks: bool) -> &Self {
        self.apply("complete", |a| a.complete(with_callbacks))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn duration(&self) -> Option<f32> {
        self.try_with(|a| a.duration()).ok()
    }

    pub fn position(&self) -> Option<f32> {
        self.try_with(|a| a.position()).ok()
    }

    pub fn is_playing(&self) -> bool {
        self.try_with(|a| a.core().is_playing()).unwrap_or(false)
    }

    pub fn is_paused(&self) -> bool {
        self.try_with(|a| a.core().is_paused()).unwrap_or(false)
    }

    pub fn is_killed(&self) -> bool {
        self.try_with(|a| a.core().is_killed()).unwrap_or(false)
    }

    pub fn loops_done(&self) -> Option<u32> {
        self.try_with(|a| a.core().loops_done()).ok()
    }
}

impl TweenHandle<ActionTween> {
    pub fn add_step(&self, step: Step) -> &Self {
        self.apply("add_step", |a| {
            a.add_step(step);
        })
    }
}

impl<T: Clone + 'static> TweenHandle<PropertyTween<T>> {
    /// Start from an absolute value instead of the current one
    pub fn from(&self, value: T) -> &Self {
        self.apply("from", |p| {
            p.from(value);
        })
    }

    pub fn from_relative(&self, offset: T) -> &Self {
        self.apply("from_relative", |p| {
            p.from_relative(offset);
        })
    }

    pub fn from_current(&self) -> &Self {
        self.apply("from_current", |p| {
            p.from_current();
        })
    }

    pub fn set_relative(&self, relative: bool) -> &Self {
        self.apply("set_relative", |p| {
            p.set_relative(relative);
        })
    }

    /// Start value resolved when the current step began
    pub fn start_value(&self) -> Option<T> {
        self.try_with(|p| p.start_value().cloned()).ok().flatten()
    }

    pub fn end_value(&self) -> Option<T> {
        self.try_with(|p| p.end_value().cloned()).ok().flatten()
    }
}

impl TweenHandle<Timeline> {
    fn place<B, F>(&self, op: &'static str, child: &TweenHandle<B>, place: F) -> Option<TimelineEntryId>
    where
        B: Animatable + 'static,
        F: FnOnce(&mut Timeline, SharedAnimatable) -> Option<TimelineEntryId>,
    {
        if let Err(err) = child.try_with(|_| ()) {
            tracing::warn!(%err, op, "timeline child handle is not usable");
            return None;
        }
        match self.try_with_mut(|timeline| place(timeline, child.shared())) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(%err, op, "tween handle operation ignored");
                None
            }
        }
    }

    pub fn append<B: Animatable + 'static>(&self, child: &TweenHandle<B>) -> Option<TimelineEntryId> {
        self.place("append", child, Timeline::append)
    }

    pub fn join<B: Animatable + 'static>(&self, child: &TweenHandle<B>) -> Option<TimelineEntryId> {
        self.place("join", child, Timeline::join)
    }

    pub fn prepend<B: Animatable + 'static>(&self, child: &TweenHandle<B>) -> Option<TimelineEntryId> {
        self.place("prepend", child, Timeline::prepend)
    }

    pub fn insert<B: Animatable + 'static>(&self, at: f32, child: &TweenHandle<B>) -> Option<TimelineEntryId> {
        self.place("insert", child, |timeline, child| timeline.insert(at, child))
    }

    pub fn append_callback<F: FnMut() + 'static>(&self, callback: F) -> Option<TimelineEntryId> {
        self.try_with_mut(|timeline| timeline.append_callback(callback)).ok()
    }

    pub fn append_interval(&self, duration: f32) -> &Self {
        self.apply("append_interval", |timeline| {
            timeline.append_interval(duration);
        })
    }

    pub fn prepend_interval(&self, duration: f32) -> &Self {
        self.apply("prepend_interval", |timeline| {
            timeline.prepend_interval(duration);
        })
    }

    pub fn entry_count(&self) -> usize {
        self.try_with(Timeline::entry_count).unwrap_or(0)
    }
}

impl<A: Animatable + 'static> std::fmt::Debug for TweenHandle<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenHandle")
            .field("generation", &self.generation)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TweenScheduler;
    use std::cell::Cell;

    fn float_cell(initial: f32) -> (Rc<Cell<f32>>, impl FnMut() -> f32, impl FnMut(f32)) {
        let value = Rc::new(Cell::new(initial));
        let read = value.clone();
        let write = value.clone();
        (value, move || read.get(), move |v| write.set(v))
    }

    #[test]
    fn test_fresh_handle_is_valid() {
        let scheduler = TweenScheduler::new();
        let (_value, get, set) = float_cell(0.0);
        let handle = scheduler.to(None, get, set, 1.0, 1.0);

        assert!(handle.is_valid());
        assert!(handle.is_playing());
        assert_eq!(handle.duration(), Some(1.0));
    }

    #[test]
    fn test_released_then_rented_handle_is_stale() {
        let scheduler = TweenScheduler::new();
        let (_a, get_a, set_a) = float_cell(0.0);
        let first = scheduler.to(None, get_a, set_a, 1.0, 0.1);

        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        assert_eq!(first.try_with(|_| ()), Err(TweenError::Released));

        let (_b, get_b, set_b) = float_cell(0.0);
        let second = scheduler.to(None, get_b, set_b, 2.0, 1.0);
        assert!(second.is_valid());
        assert!(matches!(first.try_with(|_| ()), Err(TweenError::Stale { .. })));

        // Operations through the stale handle must not reach the new owner
        first.kill();
        assert!(!second.is_killed());
    }

    #[test]
    fn test_busy_inside_own_callback() {
        let scheduler = TweenScheduler::new();
        let tween = scheduler.tween(None);
        let inner = tween.clone();
        let observed = Rc::new(RefCell::new(None));
        let slot = observed.clone();

        tween.add_interval(0.1).on_complete(move || {
            *slot.borrow_mut() = Some(inner.try_with(|_| ()));
        });
        scheduler.tick(UpdatePhase::Normal, 0.2, 0.2);
        scheduler.tick(UpdatePhase::Normal, 0.2, 0.2);

        assert_eq!(*observed.borrow(), Some(Err(TweenError::Busy)));
    }

    #[test]
    fn test_property_from_through_handle() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(5.0);
        let handle = scheduler.to(None, get, set, 10.0, 1.0);
        handle.from(0.0);

        scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
        assert!((value.get() - 5.0).abs() < 1e-4);
        assert_eq!(handle.start_value(), Some(0.0));
        assert_eq!(handle.end_value(), Some(10.0));
    }

    #[test]
    fn test_timeline_rejects_itself() {
        let scheduler = TweenScheduler::new();
        let timeline = scheduler.timeline();
        assert_eq!(timeline.append(&timeline.clone()), None);
        assert_eq!(timeline.entry_count(), 0);
    }
}
