//! Property driver: interpolates one external value over a single step
//!
//! A [`PropertyTween`] owns exactly one `Driven` step. Each time that step is
//! entered it reads the target's current value and resolves its start and
//! end:
//!
//! * start follows the [`FromInstruction`]: an absolute value is written to
//!   the target, a relative offset is added to the provisional end and
//!   written, anything else keeps the freshly read value;
//! * end is `start + base_end * k` in relative mode, where `k` is
//!   `loops_done + 1` for incremental loops and `1` otherwise; in absolute
//!   incremental mode it is `base_end + delta * loops_done`, with `delta`
//!   cached on the very first start as `base_end - current`.
//!
//! Re-entries caused by `goto`/`rewind` reuse the start and end already
//! resolved for this rental, so repeated seeking (a timeline scrubbing its
//! children every frame) does not drift. Sequential playback, including
//! loop restarts, always resolves afresh.
//!
//! Instances are pooled per value type. `rent` overwrites every field and
//! bumps the generation; `release` drops all external references first.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::TweenerConfig;
use crate::scheduler::SchedulerHandle;
use crate::step::{FromInstruction, Step, StepContext, StepDriver};
use crate::target::TargetRef;
use crate::tween::{Animatable, LoopType, TweenCore};
use crate::values::ValueOps;

/// Reads the current external value
pub type Getter<T> = Box<dyn FnMut() -> T>;
/// Writes a new external value
pub type Setter<T> = Box<dyn FnMut(T)>;

/// Everything a rental overwrites
pub(crate) struct PropertyInit<T> {
    pub target: Option<TargetRef>,
    pub getter: Getter<T>,
    pub setter: Setter<T>,
    pub end: T,
    pub duration: f32,
    pub ops: ValueOps<T>,
    pub auto_play: bool,
}

struct PropertyState<T> {
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
    ops: Option<ValueOps<T>>,
    base_end: Option<T>,
    start: Option<T>,
    end: Option<T>,
    relative: bool,
    from: FromInstruction<T>,
    delta: Option<T>,
    resolved: bool,
}

impl<T> PropertyState<T> {
    fn empty() -> Self {
        Self {
            getter: None,
            setter: None,
            ops: None,
            base_end: None,
            start: None,
            end: None,
            relative: false,
            from: FromInstruction::None,
            delta: None,
            resolved: false,
        }
    }

    fn bound(getter: Getter<T>, setter: Setter<T>, base_end: T, ops: ValueOps<T>) -> Self {
        Self {
            getter: Some(getter),
            setter: Some(setter),
            ops: Some(ops),
            base_end: Some(base_end),
            ..Self::empty()
        }
    }

    fn write(&mut self, value: T) {
        if let Some(setter) = self.setter.as_mut() {
            setter(value);
        }
    }
}

impl<T: Clone> PropertyState<T> {
    /// End value for a cycle, measured from `origin` in relative mode
    fn resolve_end(&self, ops: &ValueOps<T>, base_end: &T, origin: &T, factor: f32, cx: StepContext) -> T {
        if self.relative {
            return match (ops.add, ops.scale) {
                (Some(add), Some(scale)) => add(origin, &scale(base_end, factor)),
                _ => base_end.clone(),
            };
        }

        match (cx.loop_type, ops.add, ops.scale, self.delta.as_ref()) {
            (LoopType::Incremental, Some(add), Some(scale), Some(delta)) => {
                add(base_end, &scale(delta, cx.loops_done as f32))
            }
            _ => base_end.clone(),
        }
    }
}

impl<T: Clone> StepDriver for PropertyState<T> {
    fn start_step(&mut self, cx: StepContext) {
        if cx.seeking && self.resolved {
            return;
        }
        let (Some(ops), Some(base_end)) = (self.ops, self.base_end.clone()) else {
            return;
        };
        let Some(getter) = self.getter.as_mut() else {
            return;
        };
        let current = getter();

        if !self.relative && self.delta.is_none() {
            if let Some(sub) = ops.sub {
                self.delta = Some(sub(&base_end, &current));
            }
        }

        let factor = match cx.loop_type {
            LoopType::Incremental => (cx.loops_done + 1) as f32,
            _ => 1.0,
        };
        let provisional_end = self.resolve_end(&ops, &base_end, &current, factor, cx);

        let start = match self.from.clone() {
            FromInstruction::Absolute(value) => {
                self.write(value.clone());
                value
            }
            FromInstruction::Relative(offset) => match ops.add {
                Some(add) => {
                    let value = add(&provisional_end, &offset);
                    self.write(value.clone());
                    value
                }
                None => current,
            },
            FromInstruction::Current | FromInstruction::None => current,
        };

        let end = self.resolve_end(&ops, &base_end, &start, factor, cx);
        self.start = Some(start);
        self.end = Some(end);
        self.resolved = true;
    }

    fn apply_step(&mut self, eased: f32) {
        let (Some(ops), Some(start), Some(end)) = (self.ops, self.start.as_ref(), self.end.as_ref()) else {
            return;
        };
        let value = (ops.lerp)(start, end, eased);
        self.write(value);
    }
}

/// Single-step tween of one external value of type `T`
pub struct PropertyTween<T> {
    core: TweenCore,
    state: PropertyState<T>,
    this: Weak<RefCell<PropertyTween<T>>>,
    in_pool: bool,
}

impl<T: Clone + 'static> PropertyTween<T> {
    fn allocate(scheduler: &SchedulerHandle, config: &TweenerConfig) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this: &Weak<RefCell<PropertyTween<T>>>| {
            let erased: Weak<RefCell<dyn Animatable>> = this.clone();
            RefCell::new(PropertyTween {
                core: TweenCore::new(config, scheduler.clone(), erased),
                state: PropertyState::empty(),
                this: this.clone(),
                in_pool: false,
            })
        })
    }

    /// Take an instance from the pool (or allocate one) and bind it
    pub(crate) fn rent(
        scheduler: &SchedulerHandle,
        config: &TweenerConfig,
        init: PropertyInit<T>,
    ) -> Rc<RefCell<Self>> {
        let cell = match scheduler.take_property::<T>() {
            Some(cell) if cell.try_borrow_mut().is_ok() => {
                tracing::debug!(
                    value_type = std::any::type_name::<T>(),
                    "renting pooled property tween"
                );
                cell
            }
            _ => Self::allocate(scheduler, config),
        };

        if let Ok(mut tween) = cell.try_borrow_mut() {
            tween.bind(init, config);
        }
        cell
    }

    fn bind(&mut self, init: PropertyInit<T>, config: &TweenerConfig) {
        self.core.reset(init.target, init.auto_play, config);
        self.state = PropertyState::bound(init.getter, init.setter, init.end, init.ops);
        self.in_pool = false;
        self.core.add_step(Step::driven(init.duration));
    }

    /// Property tween not attached to any scheduler; drive it with `update_tween`
    pub fn detached<G, S>(getter: G, setter: S, end: T, duration: f32, ops: ValueOps<T>) -> Rc<RefCell<Self>>
    where
        G: FnMut() -> T + 'static,
        S: FnMut(T) + 'static,
    {
        let scheduler = SchedulerHandle::detached();
        let init = PropertyInit {
            target: None,
            getter: Box::new(getter),
            setter: Box::new(setter),
            end,
            duration,
            ops,
            auto_play: false,
        };
        Self::rent(&scheduler, &TweenerConfig::unpooled(), init)
    }
}

impl<T: Clone> PropertyTween<T> {
    fn set_from(&mut self, from: FromInstruction<T>) -> &mut Self {
        if self.core.last_step_is_driven() {
            self.state.from = from;
            self.state.resolved = false;
        }
        self
    }

    /// Start from `value`, writing it to the target on step start
    pub fn from(&mut self, value: T) -> &mut Self {
        self.set_from(FromInstruction::Absolute(value))
    }

    /// Start from the provisional end plus `offset`
    pub fn from_relative(&mut self, offset: T) -> &mut Self {
        self.set_from(FromInstruction::Relative(offset))
    }

    pub fn from_current(&mut self) -> &mut Self {
        self.set_from(FromInstruction::Current)
    }

    /// Treat the end value as an offset from the start
    pub fn set_relative(&mut self, relative: bool) -> &mut Self {
        if self.core.last_step_is_driven() {
            self.state.relative = relative;
            self.state.resolved = false;
        }
        self
    }

    pub fn is_relative(&self) -> bool {
        self.state.relative
    }

    pub fn base_end(&self) -> Option<&T> {
        self.state.base_end.as_ref()
    }

    /// Start value resolved on the last step start
    pub fn start_value(&self) -> Option<&T> {
        self.state.start.as_ref()
    }

    /// End value resolved on the last step start
    pub fn end_value(&self) -> Option<&T> {
        self.state.end.as_ref()
    }

    pub fn from_instruction(&self) -> &FromInstruction<T> {
        &self.state.from
    }
}

impl<T: Clone + 'static> Animatable for PropertyTween<T> {
    fn core(&self) -> &TweenCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TweenCore {
        &mut self.core
    }

    fn update_tween(&mut self, dt: f32) -> bool {
        self.core.update_with(dt, &mut self.state)
    }

    fn goto(&mut self, time: f32, play: bool) {
        self.core.goto_with(time, play, &mut self.state);
    }

    fn rewind(&mut self, play: bool) {
        self.core.rewind_with(play, &mut self.state);
    }

    fn complete(&mut self, with_callbacks: bool) {
        if self.core.complete_with(with_callbacks, &mut self.state) {
            self.release();
        }
    }

    fn release(&mut self) {
        // A timeline child is reclaimed by its timeline
        if self.core.is_parented()
            || (!self.core.auto_kill() && !self.core.is_killed() && !self.core.is_dead())
        {
            self.core.pause();
            return;
        }
        if self.in_pool {
            return;
        }
        self.in_pool = true;

        self.state = PropertyState::empty();
        self.core.deregister();
        self.core.clear_external();

        let scheduler = self.core.scheduler().clone();
        if let Some(this) = self.this.upgrade() {
            if scheduler.put_property(this) {
                tracing::debug!(
                    value_type = std::any::type_name::<T>(),
                    "property tween returned to pool"
                );
            } else {
                tracing::debug!(
                    value_type = std::any::type_name::<T>(),
                    "property pool full, dropping instance"
                );
            }
        }
    }

    fn is_released(&self) -> bool {
        self.in_pool
    }
}

impl<T> std::fmt::Debug for PropertyTween<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyTween")
            .field("value_type", &std::any::type_name::<T>())
            .field("core", &self.core)
            .field("relative", &self.state.relative)
            .field("in_pool", &self.in_pool)
            .finish()
    }
}
