//! Animatable core
//!
//! [`TweenCore`] is the step-sequencing playback state machine every tween
//! kind is built on. It owns an ordered list of [`Step`]s and a playhead
//! (current index, elapsed time inside that step, direction) and implements
//! play/pause/kill, scrubbing and looping on top of it.
//!
//! The playhead index ranges over `-1..=steps.len()`: `-1` is "before the
//! start" (reached by backward playback), `steps.len()` is "past the end".
//! Loop and finish resolution happens on the tick *after* the playhead
//! leaves the step list, so the final step always gets its progress-1 frame.
//!
//! Kinds plug in through [`Animatable`]. Steps of kind
//! [`StepKind::Driven`] forward their start/apply calls to the kind's own
//! driver state, which is how a property tween reaches its interpolation
//! fields without the step owning closures into them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::config::TweenerConfig;
use crate::easing::Easing;
use crate::scheduler::{BucketKey, SchedulerHandle};
use crate::step::{NoDriver, Step, StepContext, StepDriver, StepKind};
use crate::target::{TargetRef, TweenId};

/// Host update phase an animatable is ticked in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdatePhase {
    #[default]
    Normal,
    Late,
    Fixed,
}

impl UpdatePhase {
    pub const ALL: [UpdatePhase; 3] = [UpdatePhase::Normal, UpdatePhase::Late, UpdatePhase::Fixed];
}

/// What happens when a loop cycle ends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopType {
    /// Jump back to the start
    #[default]
    Restart,
    /// Reverse direction at each end
    Yoyo,
    /// Restart, with each cycle's target advanced by the first cycle's delta
    Incremental,
}

/// Playback direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Lifecycle callback
pub type Callback = Box<dyn FnMut()>;

/// Shared, dynamically typed animatable as stored by the scheduler and timelines
pub type SharedAnimatable = Rc<RefCell<dyn Animatable>>;

/// A tween kind the scheduler can drive
pub trait Animatable {
    fn core(&self) -> &TweenCore;
    fn core_mut(&mut self) -> &mut TweenCore;

    /// Total duration in seconds, excluding delay and loops
    fn duration(&self) -> f32 {
        self.core().duration()
    }

    /// Time since animation start under the current playhead
    fn position(&self) -> f32 {
        self.core().position()
    }

    /// Advance by `dt` seconds; `false` means evict from the scheduler
    fn update_tween(&mut self, dt: f32) -> bool;

    /// Seek to an absolute time, clamped to `[0, duration]`
    fn goto(&mut self, time: f32, play: bool);

    fn goto_normalized(&mut self, t01: f32, play: bool) {
        let duration = self.duration();
        self.goto(duration * clamp01(t01), play);
    }

    /// Reset the playhead to the start
    fn rewind(&mut self, play: bool);

    /// Jump to the end, then kill-and-release or pause depending on `auto_kill`
    fn complete(&mut self, with_callbacks: bool);

    /// Return to the pool, or pause in place when not auto-killing
    fn release(&mut self);

    /// Whether this instance currently sits in a free list
    fn is_released(&self) -> bool {
        false
    }

    fn is_dead(&self) -> bool {
        self.core().is_dead()
    }

    fn play_from_end(&mut self) {
        let duration = self.duration();
        self.goto(duration, false);
        self.core_mut().play_backwards();
    }

    fn restart(&mut self, play: bool) {
        self.rewind(false);
        if play {
            self.core_mut().play_forward();
        }
    }
}

pub(crate) fn clamp01(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn clamp_time(time: f32, duration: f32) -> f32 {
    if time.is_nan() {
        0.0
    } else {
        time.clamp(0.0, duration.max(0.0))
    }
}

fn fire(callback: &mut Option<Callback>) {
    if let Some(callback) = callback.as_mut() {
        callback();
    }
}

/// Step sequencer shared by every tween kind
pub struct TweenCore {
    steps: SmallVec<[Step; 1]>,
    target: Option<TargetRef>,
    id: Option<TweenId>,

    phase: UpdatePhase,
    unscaled: bool,

    delay: f32,
    delay_elapsed: f32,
    speed: f32,

    loops: i32,
    loop_type: LoopType,
    loops_done: u32,

    index: isize,
    elapsed: f32,
    direction: Direction,

    auto_play: bool,
    auto_kill: bool,
    registered: bool,
    playing: bool,
    paused: bool,
    killed: bool,
    parented: bool,

    on_complete: Option<Callback>,
    on_play: Option<Callback>,
    on_pause: Option<Callback>,
    on_kill: Option<Callback>,

    scheduler: SchedulerHandle,
    this: Weak<RefCell<dyn Animatable>>,
    generation: u64,

    min_step_duration: f32,
    default_ease: Easing,
}

impl TweenCore {
    pub(crate) fn new(
        config: &TweenerConfig,
        scheduler: SchedulerHandle,
        this: Weak<RefCell<dyn Animatable>>,
    ) -> Self {
        Self {
            steps: SmallVec::new(),
            target: None,
            id: None,
            phase: UpdatePhase::Normal,
            unscaled: false,
            delay: 0.0,
            delay_elapsed: 0.0,
            speed: 1.0,
            loops: 1,
            loop_type: LoopType::Restart,
            loops_done: 0,
            index: 0,
            elapsed: 0.0,
            direction: Direction::Forward,
            auto_play: false,
            auto_kill: config.auto_kill,
            registered: false,
            playing: false,
            paused: false,
            killed: false,
            parented: false,
            on_complete: None,
            on_play: None,
            on_pause: None,
            on_kill: None,
            scheduler,
            this,
            generation: 0,
            min_step_duration: config.min_step_duration,
            default_ease: config.default_ease,
        }
    }

    /// Reset every field for a new rental, keeping the self and scheduler links
    pub(crate) fn reset(&mut self, target: Option<TargetRef>, auto_play: bool, config: &TweenerConfig) {
        self.deregister();

        self.steps.clear();
        self.target = target;
        self.id = None;
        self.phase = UpdatePhase::Normal;
        self.unscaled = false;
        self.delay = 0.0;
        self.delay_elapsed = 0.0;
        self.speed = 1.0;
        self.loops = 1;
        self.loop_type = LoopType::Restart;
        self.loops_done = 0;
        self.index = 0;
        self.elapsed = 0.0;
        self.direction = Direction::Forward;
        self.auto_play = auto_play;
        self.auto_kill = config.auto_kill;
        self.playing = false;
        self.paused = false;
        self.killed = false;
        self.parented = false;
        self.clear_callbacks();
        self.min_step_duration = config.min_step_duration;
        self.default_ease = config.default_ease;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop everything that refers outside the engine
    pub(crate) fn clear_external(&mut self) {
        self.steps.clear();
        self.target = None;
        self.id = None;
        self.clear_callbacks();
    }

    fn clear_callbacks(&mut self) {
        self.on_complete = None;
        self.on_play = None;
        self.on_pause = None;
        self.on_kill = None;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn duration(&self) -> f32 {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn position(&self) -> f32 {
        if self.index < 0 {
            return 0.0;
        }
        let len = self.steps.len();
        let index = (self.index as usize).min(len);
        let before: f32 = self.steps[..index].iter().map(|s| s.duration).sum();
        if index < len {
            before + self.elapsed
        } else {
            before
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn target(&self) -> Option<&TargetRef> {
        self.target.as_ref()
    }

    pub fn id(&self) -> Option<&TweenId> {
        self.id.as_ref()
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn is_unscaled(&self) -> bool {
        self.unscaled
    }

    pub(crate) fn bucket_key(&self) -> BucketKey {
        BucketKey::new(self.phase, self.unscaled)
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn loops(&self) -> i32 {
        self.loops
    }

    pub fn loop_type(&self) -> LoopType {
        self.loop_type
    }

    pub fn loops_done(&self) -> u32 {
        self.loops_done
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current step index (`-1` before the start, `step_count()` past the end)
    pub fn current_step(&self) -> isize {
        self.index
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the playhead is past the last step
    pub fn is_at_end(&self) -> bool {
        self.index >= self.steps.len() as isize
    }

    pub fn is_playing(&self) -> bool {
        self.playing && !self.paused && !self.killed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn auto_kill(&self) -> bool {
        self.auto_kill
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    /// Owned by a timeline, which drives and releases it
    pub fn is_parented(&self) -> bool {
        self.parented
    }

    pub(crate) fn set_parented(&mut self, parented: bool) {
        self.parented = parented;
    }

    /// Hand back from a releasing timeline; auto-kill children are killed
    /// without firing `on_kill`
    pub(crate) fn orphan(&mut self) {
        self.parented = false;
        if self.auto_kill {
            self.killed = true;
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A target that no longer exists; animatables without one never die
    pub fn is_dead(&self) -> bool {
        self.target.as_ref().is_some_and(|t| !t.is_alive())
    }

    pub(crate) fn last_step_is_driven(&self) -> bool {
        self.steps.last().is_some_and(Step::is_driven)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Append a step; registers immediately when auto-playing
    pub fn add_step(&mut self, mut step: Step) -> &mut Self {
        if !(step.duration >= self.min_step_duration) {
            step.duration = self.min_step_duration;
        }
        if step.ease.is_none() {
            step.ease = Some(self.default_ease);
        }
        self.steps.push(step);
        self.autoplay();
        self
    }

    /// Start playing if auto-play is on and playback never started.
    /// A paused animatable stays paused.
    pub(crate) fn autoplay(&mut self) {
        if self.auto_play && !self.playing {
            self.play();
        }
    }

    pub fn add_interval(&mut self, duration: f32) -> &mut Self {
        self.add_step(Step::interval(duration))
    }

    pub fn add_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.add_step(Step::callback(callback))
    }

    /// Ease of the most recently added step; no-op without steps
    pub fn set_ease(&mut self, ease: Easing) -> &mut Self {
        if let Some(step) = self.steps.last_mut() {
            step.ease = Some(ease);
        }
        self
    }

    pub fn set_target(&mut self, target: Option<TargetRef>) -> &mut Self {
        self.target = target;
        self
    }

    pub fn set_id(&mut self, id: impl Into<TweenId>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// Change update phase and time scale, moving buckets while registered
    pub fn set_update(&mut self, phase: UpdatePhase, unscaled: bool) -> &mut Self {
        let old = self.bucket_key();
        self.phase = phase;
        self.unscaled = unscaled;
        let new = self.bucket_key();

        if self.registered && old != new {
            if let Some(this) = self.this.upgrade() {
                self.registered = self.scheduler.change_bucket(this, old, new);
            }
        }
        self
    }

    pub fn set_delay(&mut self, delay: f32) -> &mut Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        self.speed = speed.max(0.0);
        self
    }

    /// `1` plays once, `n > 1` loops `n` times, any negative value loops forever
    pub fn set_loops(&mut self, loops: i32, loop_type: LoopType) -> &mut Self {
        self.loops = match loops {
            l if l < 0 => -1,
            0 => 1,
            l => l,
        };
        self.loop_type = loop_type;
        self
    }

    pub fn set_auto_kill(&mut self, auto_kill: bool) -> &mut Self {
        self.auto_kill = auto_kill;
        self
    }

    pub fn set_auto_play(&mut self, auto_play: bool) -> &mut Self {
        self.auto_play = auto_play;
        self
    }

    pub fn on_complete<F: FnMut() + 'static>(&mut self, f: F) -> &mut Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_play<F: FnMut() + 'static>(&mut self, f: F) -> &mut Self {
        self.on_play = Some(Box::new(f));
        self
    }

    pub fn on_pause<F: FnMut() + 'static>(&mut self, f: F) -> &mut Self {
        self.on_pause = Some(Box::new(f));
        self
    }

    pub fn on_kill<F: FnMut() + 'static>(&mut self, f: F) -> &mut Self {
        self.on_kill = Some(Box::new(f));
        self
    }

    // =========================================================================
    // Controls
    // =========================================================================

    pub fn play(&mut self) -> &mut Self {
        if self.killed {
            return self;
        }

        let was_playing = self.playing && !self.paused;
        self.playing = true;
        self.paused = false;
        self.register();

        if !was_playing {
            fire(&mut self.on_play);
        }
        self
    }

    pub fn resume(&mut self) -> &mut Self {
        self.play()
    }

    pub fn pause(&mut self) -> &mut Self {
        if !self.paused {
            self.paused = true;
            fire(&mut self.on_pause);
        }
        self
    }

    /// Mark for eviction on the next tick
    pub fn kill(&mut self) -> &mut Self {
        if !self.killed {
            self.killed = true;
            fire(&mut self.on_kill);
        }
        self
    }

    pub fn play_forward(&mut self) -> &mut Self {
        self.direction = Direction::Forward;
        self.play()
    }

    /// Reverse playback; a playhead at or past the end moves onto the last step
    pub fn play_backwards(&mut self) -> &mut Self {
        let len = self.steps.len() as isize;
        if len > 0 {
            if self.index >= len {
                self.index = len - 1;
                self.elapsed = self.steps[(len - 1) as usize].duration;
            } else if self.index > 0 && self.elapsed <= 0.0 {
                self.index -= 1;
                self.elapsed = self.steps[self.index as usize].duration;
            }
        }

        self.direction = Direction::Backward;
        self.play()
    }

    // =========================================================================
    // Scheduler links
    // =========================================================================

    pub(crate) fn register(&mut self) {
        if self.registered {
            return;
        }
        if let Some(this) = self.this.upgrade() {
            self.registered = self.scheduler.register_entry(this, self.bucket_key());
        }
    }

    pub(crate) fn deregister(&mut self) {
        if !self.registered {
            return;
        }
        self.scheduler.deregister_entry(self.ptr(), self.bucket_key());
        self.registered = false;
    }

    /// Called by the scheduler once it has dropped this entry from a bucket
    pub(crate) fn mark_evicted(&mut self) {
        self.registered = false;
        self.playing = false;
    }

    pub(crate) fn ptr(&self) -> *const () {
        self.this.as_ptr() as *const ()
    }

    pub(crate) fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    // =========================================================================
    // Playhead
    // =========================================================================

    fn reset_steps(&mut self) {
        for step in &mut self.steps {
            step.started = false;
        }
    }

    /// Playhead back to the start of the first step, flags cleared
    pub(crate) fn reset_playhead(&mut self, delay_consumed: bool) {
        self.reset_steps();
        self.index = 0;
        self.elapsed = 0.0;
        self.loops_done = 0;
        self.direction = Direction::Forward;
        self.killed = false;
        self.delay_elapsed = if delay_consumed { self.delay } else { 0.0 };
    }

    fn enter_step(&mut self, index: usize, seeking: bool, driver: &mut dyn StepDriver) {
        let cx = StepContext {
            loops_done: self.loops_done,
            loop_type: self.loop_type,
            seeking,
        };
        let step = &mut self.steps[index];
        if step.started {
            return;
        }
        step.started = true;

        match &mut step.kind {
            StepKind::Action {
                on_start: Some(hook),
                ..
            } => hook(),
            StepKind::Action { .. } => {}
            StepKind::Driven => driver.start_step(cx),
        }
    }

    fn apply_step_at(&mut self, index: usize, t01: f32, driver: &mut dyn StepDriver) {
        let default_ease = self.default_ease;
        let step = &mut self.steps[index];
        let eased = step.ease.unwrap_or(default_ease).apply(clamp01(t01));

        match &mut step.kind {
            StepKind::Action {
                apply: Some(apply),
                ..
            } => apply(eased),
            StepKind::Action { .. } => {}
            StepKind::Driven => driver.apply_step(eased),
        }
    }

    fn finish_control(&mut self, play: bool) {
        if play {
            self.play();
        } else {
            self.pause();
        }
    }

    pub(crate) fn rewind_with(&mut self, play: bool, driver: &mut dyn StepDriver) {
        self.reset_playhead(false);
        if !self.steps.is_empty() {
            self.enter_step(0, true, driver);
            self.apply_step_at(0, 0.0, driver);
        }
        self.finish_control(play);
    }

    pub(crate) fn goto_with(&mut self, time: f32, play: bool, driver: &mut dyn StepDriver) {
        let duration = self.duration();
        let time = clamp_time(time, duration);
        let at_end = time >= duration;

        self.reset_playhead(true);

        let mut remaining = time;
        for i in 0..self.steps.len() {
            self.enter_step(i, true, driver);
            let d = self.steps[i].duration;

            if at_end || remaining >= d {
                self.apply_step_at(i, 1.0, driver);
                remaining -= d;
                self.index = i as isize + 1;
            } else {
                self.apply_step_at(i, remaining / d, driver);
                self.index = i as isize;
                self.elapsed = remaining;
                break;
            }
        }

        self.finish_control(play);
    }

    /// Seek to the end and settle; returns whether the caller must release
    pub(crate) fn complete_with(&mut self, with_callbacks: bool, driver: &mut dyn StepDriver) -> bool {
        let duration = self.duration();
        self.goto_with(duration, false, driver);
        self.settle_complete(with_callbacks)
    }

    pub(crate) fn settle_complete(&mut self, with_callbacks: bool) -> bool {
        if with_callbacks {
            fire(&mut self.on_complete);
        }

        if self.auto_kill {
            self.killed = true;
            true
        } else {
            self.paused = true;
            self.playing = false;
            false
        }
    }

    /// Killed, dead and paused checks shared by every kind.
    /// `Some(keep)` short-circuits the update.
    pub(crate) fn precheck(&mut self) -> Option<bool> {
        if self.killed || self.is_dead() {
            return Some(self.finish(false));
        }
        if self.paused {
            return Some(true);
        }
        None
    }

    /// Apply speed and consume delay; `None` while still delayed
    pub(crate) fn consume_delay(&mut self, dt: f32) -> Option<f32> {
        let dt = dt * self.speed;

        if self.delay_elapsed < self.delay {
            self.delay_elapsed += dt;
            if self.delay_elapsed < self.delay {
                return None;
            }
            let overflow = self.delay_elapsed - self.delay;
            self.delay_elapsed = self.delay;
            return Some(overflow);
        }
        Some(dt)
    }

    pub(crate) fn update_with(&mut self, dt: f32, driver: &mut dyn StepDriver) -> bool {
        if let Some(keep) = self.precheck() {
            return keep;
        }
        if self.steps.is_empty() {
            return self.finish(false);
        }
        let Some(dt) = self.consume_delay(dt) else {
            return true;
        };

        match self.direction {
            Direction::Forward => self.update_forward(dt, driver),
            Direction::Backward => self.update_backward(dt, driver),
        }
    }

    fn update_forward(&mut self, dt: f32, driver: &mut dyn StepDriver) -> bool {
        let len = self.steps.len() as isize;
        if self.index >= len {
            return self.resolve_loop(true);
        }
        if self.index < 0 {
            self.index = 0;
            self.elapsed = 0.0;
        }

        let i = self.index as usize;
        self.enter_step(i, false, driver);

        self.elapsed += dt;
        let d = self.steps[i].duration;
        self.apply_step_at(i, self.elapsed / d, driver);

        if self.elapsed >= d {
            self.elapsed = 0.0;
            self.index += 1;
        }
        true
    }

    fn update_backward(&mut self, dt: f32, driver: &mut dyn StepDriver) -> bool {
        let len = self.steps.len() as isize;
        if self.index < 0 {
            return self.resolve_loop(false);
        }
        if self.index >= len {
            self.index = len - 1;
            self.elapsed = self.steps[(len - 1) as usize].duration;
        }

        let i = self.index as usize;
        self.enter_step(i, false, driver);

        self.elapsed -= dt;
        let d = self.steps[i].duration;
        self.apply_step_at(i, self.elapsed / d, driver);

        if self.elapsed > 0.0 {
            return true;
        }

        self.index -= 1;
        self.elapsed = if self.index >= 0 {
            self.steps[self.index as usize].duration
        } else {
            0.0
        };
        true
    }

    pub(crate) fn loops_exhausted(&self) -> bool {
        self.loops != -1 && self.loops_done as i64 >= self.loops as i64 - 1
    }

    /// Count a finished cycle; `false` when no cycles remain
    pub(crate) fn advance_loop(&mut self) -> bool {
        if self.loops_exhausted() {
            return false;
        }
        self.loops_done += 1;
        tracing::trace!(
            loops_done = self.loops_done,
            loop_type = ?self.loop_type,
            "tween loop boundary"
        );
        true
    }

    fn resolve_loop(&mut self, forward_ended: bool) -> bool {
        if !self.advance_loop() {
            return self.finish(forward_ended);
        }

        match self.loop_type {
            LoopType::Restart | LoopType::Incremental => {
                self.reset_steps();
                self.index = 0;
                self.elapsed = 0.0;
                self.direction = Direction::Forward;
            }
            LoopType::Yoyo => match self.direction {
                Direction::Forward => {
                    let last = self.steps.len() - 1;
                    self.direction = Direction::Backward;
                    self.index = last as isize;
                    self.elapsed = self.steps[last].duration;
                }
                Direction::Backward => {
                    self.direction = Direction::Forward;
                    self.index = 0;
                    self.elapsed = 0.0;
                }
            },
        }
        true
    }

    /// Terminal path of an update; always signals eviction
    pub(crate) fn finish(&mut self, completed_forward: bool) -> bool {
        self.playing = false;
        if completed_forward {
            fire(&mut self.on_complete);
        }
        false
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }
}

impl std::fmt::Debug for TweenCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenCore")
            .field("steps", &self.steps.len())
            .field("target", &self.target)
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("unscaled", &self.unscaled)
            .field("index", &self.index)
            .field("elapsed", &self.elapsed)
            .field("direction", &self.direction)
            .field("loops", &self.loops)
            .field("loops_done", &self.loops_done)
            .field("playing", &self.playing)
            .field("paused", &self.paused)
            .field("killed", &self.killed)
            .finish()
    }
}

// ============================================================================
// Action tween
// ============================================================================

/// Animatable made of closure steps
pub struct ActionTween {
    core: TweenCore,
}

impl ActionTween {
    pub(crate) fn create(
        scheduler: SchedulerHandle,
        config: &TweenerConfig,
        target: Option<TargetRef>,
        auto_play: bool,
    ) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this: &Weak<RefCell<ActionTween>>| {
            let this: Weak<RefCell<dyn Animatable>> = this.clone();
            let mut core = TweenCore::new(config, scheduler, this);
            core.target = target;
            core.auto_play = auto_play;
            RefCell::new(ActionTween { core })
        })
    }

    /// Tween not attached to any scheduler; drive it with `update_tween`
    pub fn detached(target: Option<TargetRef>) -> Rc<RefCell<Self>> {
        Self::create(SchedulerHandle::detached(), &TweenerConfig::default(), target, false)
    }

    pub fn add_step(&mut self, step: Step) -> &mut Self {
        self.core.add_step(step);
        self
    }

    pub fn add_interval(&mut self, duration: f32) -> &mut Self {
        self.core.add_interval(duration);
        self
    }
}

impl Animatable for ActionTween {
    fn core(&self) -> &TweenCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TweenCore {
        &mut self.core
    }

    fn update_tween(&mut self, dt: f32) -> bool {
        self.core.update_with(dt, &mut NoDriver)
    }

    fn goto(&mut self, time: f32, play: bool) {
        self.core.goto_with(time, play, &mut NoDriver);
    }

    fn rewind(&mut self, play: bool) {
        self.core.rewind_with(play, &mut NoDriver);
    }

    fn complete(&mut self, with_callbacks: bool) {
        if self.core.complete_with(with_callbacks, &mut NoDriver) {
            self.release();
        }
    }

    fn release(&mut self) {
        if !self.core.auto_kill && !self.core.killed {
            self.core.pause();
        }
    }
}

impl std::fmt::Debug for ActionTween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTween").field("core", &self.core).finish()
    }
}
