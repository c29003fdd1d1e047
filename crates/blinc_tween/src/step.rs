//! Steps: the atomic timed instructions of an animatable

use crate::easing::Easing;
use crate::tween::LoopType;

/// Durations below this are raised to it so progress never divides by zero
pub const MIN_STEP_DURATION: f32 = 0.0001;

/// Applies eased progress to external state
pub type ApplyFn = Box<dyn FnMut(f32)>;
/// One-shot hook fired when a step is entered
pub type StartFn = Box<dyn FnMut()>;

/// What a step does when entered and advanced
pub enum StepKind {
    /// Self-contained closures
    Action {
        apply: Option<ApplyFn>,
        on_start: Option<StartFn>,
    },
    /// Start and apply are forwarded to the owning animatable's driver state.
    /// Only a driven last step accepts "from" and "relative" configuration.
    Driven,
}

/// One timed, eased step owned by exactly one animatable
pub struct Step {
    pub(crate) duration: f32,
    pub(crate) ease: Option<Easing>,
    pub(crate) kind: StepKind,
    pub(crate) started: bool,
}

impl Step {
    /// Step that maps eased progress through `apply`
    pub fn new<F>(duration: f32, apply: F) -> Self
    where
        F: FnMut(f32) + 'static,
    {
        Self {
            duration,
            ease: None,
            kind: StepKind::Action {
                apply: Some(Box::new(apply)),
                on_start: None,
            },
            started: false,
        }
    }

    /// Empty step that only takes time
    pub fn interval(duration: f32) -> Self {
        Self {
            duration,
            ease: None,
            kind: StepKind::Action {
                apply: None,
                on_start: None,
            },
            started: false,
        }
    }

    /// Near-instant step whose start hook is `callback`
    pub fn callback<F>(callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self::interval(MIN_STEP_DURATION).on_start(callback)
    }

    pub(crate) fn driven(duration: f32) -> Self {
        Self {
            duration,
            ease: None,
            kind: StepKind::Driven,
            started: false,
        }
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Hook fired once each time the playhead enters this step
    ///
    /// Ignored on driven steps, whose start belongs to the driver.
    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + 'static,
    {
        if let StepKind::Action { on_start, .. } = &mut self.kind {
            *on_start = Some(Box::new(hook));
        }
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_driven(&self) -> bool {
        matches!(self.kind, StepKind::Driven)
    }

    pub fn has_started(&self) -> bool {
        self.started
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("driven", &self.is_driven())
            .field("started", &self.started)
            .finish()
    }
}

/// Where a property driver sources its start value on step start
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FromInstruction<T> {
    /// Read the current value
    #[default]
    None,
    /// Write `T` to the target and start from it
    Absolute(T),
    /// Start from the provisional end plus this offset, writing it first
    Relative(T),
    /// Read the current value
    Current,
}

/// Playhead context handed to a driver when its step starts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepContext {
    pub loops_done: u32,
    pub loop_type: LoopType,
    /// Entered through `goto`/`rewind` rather than sequential playback
    pub seeking: bool,
}

/// Receives start and apply calls for `Driven` steps
pub(crate) trait StepDriver {
    fn start_step(&mut self, cx: StepContext);
    fn apply_step(&mut self, eased: f32);
}

/// Driver for animatables made only of action steps
pub(crate) struct NoDriver;

impl StepDriver for NoDriver {
    fn start_step(&mut self, _cx: StepContext) {}
    fn apply_step(&mut self, _eased: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_callback_step_is_near_instant() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mut step = Step::callback(move || counter.set(counter.get() + 1));

        assert!((step.duration() - MIN_STEP_DURATION).abs() < 1e-9);
        if let StepKind::Action {
            on_start: Some(hook),
            ..
        } = &mut step.kind
        {
            hook();
        }
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_driven_step_ignores_start_hook() {
        let step = Step::driven(1.0).on_start(|| {});
        assert!(step.is_driven());
    }

    #[test]
    fn test_from_instruction_default() {
        assert_eq!(FromInstruction::<f32>::default(), FromInstruction::None);
    }
}
