//! Timeline orchestration for multiple animatables
//!
//! A timeline places child animatables and callback markers at offsets on one
//! shared clock. Children are never ticked themselves: each frame the
//! timeline seeks every child to its local time with an absolute `goto`, so
//! the result is the same whatever direction or order the clock moved in.
//! Callback markers fire on crossings, at most once per direction until the
//! next loop cycle or rewind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use crate::config::TweenerConfig;
use crate::scheduler::SchedulerHandle;
use crate::tween::{Animatable, Callback, Direction, LoopType, SharedAnimatable, TweenCore};

new_key_type! {
    pub struct TimelineEntryId;
}

/// An entry in a timeline
enum TimelineItem {
    Tween {
        child: SharedAnimatable,
        start: f32,
        end: f32,
    },
    Callback {
        start: f32,
        callback: Callback,
        fired_forward: bool,
        fired_backward: bool,
    },
}

impl TimelineItem {
    fn start(&self) -> f32 {
        match self {
            TimelineItem::Tween { start, .. } | TimelineItem::Callback { start, .. } => *start,
        }
    }

    fn shift(&mut self, by: f32) {
        match self {
            TimelineItem::Tween { start, end, .. } => {
                *start += by;
                *end += by;
            }
            TimelineItem::Callback { start, .. } => *start += by,
        }
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// A timeline that orchestrates multiple animatables on one clock
pub struct Timeline {
    core: TweenCore,
    entries: SlotMap<TimelineEntryId, TimelineItem>,
    order: Vec<TimelineEntryId>,
    duration: f32,
    last_start: f32,
    time: f32,
    this: Weak<RefCell<Timeline>>,
    in_pool: bool,
}

impl Timeline {
    fn allocate(scheduler: &SchedulerHandle, config: &TweenerConfig) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this: &Weak<RefCell<Timeline>>| {
            let erased: Weak<RefCell<dyn Animatable>> = this.clone();
            RefCell::new(Timeline {
                core: TweenCore::new(config, scheduler.clone(), erased),
                entries: SlotMap::with_key(),
                order: Vec::new(),
                duration: 0.0,
                last_start: 0.0,
                time: 0.0,
                this: this.clone(),
                in_pool: false,
            })
        })
    }

    pub(crate) fn rent(scheduler: &SchedulerHandle, config: &TweenerConfig, auto_play: bool) -> Rc<RefCell<Self>> {
        let cell = match scheduler.take_timeline() {
            Some(cell) if cell.try_borrow_mut().is_ok() => {
                tracing::debug!("renting pooled timeline");
                cell
            }
            _ => Self::allocate(scheduler, config),
        };

        if let Ok(mut timeline) = cell.try_borrow_mut() {
            timeline.core.reset(None, auto_play, config);
            timeline.clear_items();
            timeline.in_pool = false;
        }
        cell
    }

    /// Timeline not attached to any scheduler; drive it with `update_tween`
    pub fn detached() -> Rc<RefCell<Self>> {
        Self::rent(&SchedulerHandle::detached(), &TweenerConfig::unpooled(), false)
    }

    fn clear_items(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.duration = 0.0;
        self.last_start = 0.0;
        self.time = 0.0;
    }

    fn autoplay(&mut self) {
        self.core.autoplay();
    }

    fn release_children(&mut self) {
        for item in self.entries.values() {
            let TimelineItem::Tween { child, .. } = item else {
                continue;
            };
            let Ok(mut child) = child.try_borrow_mut() else {
                tracing::warn!("timeline child busy during release, leaving it parented");
                continue;
            };
            child.core_mut().orphan();
            child.release();
        }
    }

    /// Take a child out of scheduler control; returns its duration
    fn detach(child: &SharedAnimatable) -> Option<f32> {
        let Ok(mut child) = child.try_borrow_mut() else {
            tracing::warn!("cannot add a busy animatable to a timeline");
            return None;
        };
        child.core_mut().pause();
        child.core_mut().deregister();
        child.core_mut().set_parented(true);
        Some(child.duration())
    }

    fn push_tween(&mut self, child: SharedAnimatable, start: f32, duration: f32) -> TimelineEntryId {
        let id = self.entries.insert(TimelineItem::Tween {
            child,
            start,
            end: start + duration,
        });
        self.order.push(id);
        self.duration = self.duration.max(start + duration);
        id
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Place `child` after everything already on the timeline
    pub fn append(&mut self, child: SharedAnimatable) -> Option<TimelineEntryId> {
        let duration = Self::detach(&child)?;
        let start = self.duration;
        self.last_start = start;
        let id = self.push_tween(child, start, duration);
        self.autoplay();
        Some(id)
    }

    /// Run `child` alongside the most recent append or insert
    pub fn join(&mut self, child: SharedAnimatable) -> Option<TimelineEntryId> {
        let duration = Self::detach(&child)?;
        let id = self.push_tween(child, self.last_start, duration);
        self.autoplay();
        Some(id)
    }

    /// Shift everything by `child`'s duration and place it at 0
    pub fn prepend(&mut self, child: SharedAnimatable) -> Option<TimelineEntryId> {
        let duration = Self::detach(&child)?;
        for item in self.entries.values_mut() {
            item.shift(duration);
        }

        let id = self.entries.insert(TimelineItem::Tween {
            child,
            start: 0.0,
            end: duration,
        });
        self.order.insert(0, id);
        self.duration += duration;
        self.last_start += duration;
        self.autoplay();
        Some(id)
    }

    /// Place `child` at an absolute offset, clamped to be non-negative
    pub fn insert(&mut self, at: f32, child: SharedAnimatable) -> Option<TimelineEntryId> {
        let duration = Self::detach(&child)?;
        let at = non_negative(at);
        self.last_start = at;
        let id = self.push_tween(child, at, duration);
        self.autoplay();
        Some(id)
    }

    /// Zero-duration marker at the current end
    pub fn append_callback<F>(&mut self, callback: F) -> TimelineEntryId
    where
        F: FnMut() + 'static,
    {
        let id = self.entries.insert(TimelineItem::Callback {
            start: self.duration,
            callback: Box::new(callback),
            fired_forward: false,
            fired_backward: false,
        });
        self.order.push(id);
        self.autoplay();
        id
    }

    pub fn append_interval(&mut self, duration: f32) -> &mut Self {
        let duration = non_negative(duration);
        self.duration += duration;
        self.last_start = self.duration - duration;
        self.autoplay();
        self
    }

    pub fn prepend_interval(&mut self, duration: f32) -> &mut Self {
        let duration = non_negative(duration);
        for item in self.entries.values_mut() {
            item.shift(duration);
        }
        self.duration += duration;
        self.last_start += duration;
        self.autoplay();
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Shared clock position
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn entry_start(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries.get(id).map(TimelineItem::start)
    }

    /// End offset recorded when the entry was placed; callbacks end where they start
    pub fn entry_end(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries.get(id).map(|item| match item {
            TimelineItem::Tween { end, .. } => *end,
            TimelineItem::Callback { start, .. } => *start,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn last_entry(&self) -> Option<TimelineEntryId> {
        self.order.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Seek every child to its local time
    pub fn evaluate_scrub(&mut self, time: f32) {
        for id in &self.order {
            let Some(TimelineItem::Tween { child, start, .. }) = self.entries.get(*id) else {
                continue;
            };
            let Ok(mut child) = child.try_borrow_mut() else {
                continue;
            };
            let local = (time - start).clamp(0.0, child.duration().max(0.0));
            child.goto(local, false);
        }
    }

    /// Scrub to `now`, then fire callback markers crossed since `prev`
    pub fn evaluate_cross(&mut self, prev: f32, now: f32, forward: bool) {
        self.evaluate_scrub(now);

        for id in &self.order {
            let Some(TimelineItem::Callback {
                start,
                callback,
                fired_forward,
                fired_backward,
            }) = self.entries.get_mut(*id)
            else {
                continue;
            };

            let crossed = if forward {
                !*fired_forward && prev < *start && now >= *start
            } else {
                !*fired_backward && prev > *start && now <= *start
            };
            if !crossed {
                continue;
            }

            if forward {
                *fired_forward = true;
            } else {
                *fired_backward = true;
            }
            tracing::trace!(at = *start, forward, "timeline callback crossed");
            callback();
        }
    }

    fn reset_callback_flags(&mut self) {
        for item in self.entries.values_mut() {
            if let TimelineItem::Callback {
                fired_forward,
                fired_backward,
                ..
            } = item
            {
                *fired_forward = false;
                *fired_backward = false;
            }
        }
    }

    /// `true` when another cycle starts
    fn handle_loop_boundary(&mut self, forward_ended: bool) -> bool {
        if !self.core.advance_loop() {
            return false;
        }
        self.reset_callback_flags();

        if self.core.loop_type() == LoopType::Yoyo {
            let direction = self.core.direction().reversed();
            self.core.set_direction(direction);
            self.time = if forward_ended { self.duration } else { 0.0 };
            return true;
        }

        for item in self.entries.values() {
            if let TimelineItem::Tween { child, .. } = item {
                if let Ok(mut child) = child.try_borrow_mut() {
                    child.rewind(false);
                }
            }
        }
        self.core.set_direction(Direction::Forward);
        self.time = 0.0;
        true
    }

    fn control(&mut self, play: bool) {
        if play {
            self.core.play();
        } else {
            self.core.pause();
        }
    }
}

impl Animatable for Timeline {
    fn core(&self) -> &TweenCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TweenCore {
        &mut self.core
    }

    fn duration(&self) -> f32 {
        self.duration
    }

    fn position(&self) -> f32 {
        self.time
    }

    fn update_tween(&mut self, dt: f32) -> bool {
        if let Some(keep) = self.core.precheck() {
            return keep;
        }
        let Some(dt) = self.core.consume_delay(dt) else {
            return true;
        };

        let prev = self.time;
        match self.core.direction() {
            Direction::Forward => {
                self.time += dt;
                if self.time >= self.duration {
                    self.time = self.duration;
                    self.evaluate_cross(prev, self.time, true);
                    if self.handle_loop_boundary(true) {
                        return true;
                    }
                    return self.core.finish(true);
                }
                self.evaluate_cross(prev, self.time, true);
            }
            Direction::Backward => {
                self.time -= dt;
                if self.time <= 0.0 {
                    self.time = 0.0;
                    self.evaluate_cross(prev, self.time, false);
                    if self.handle_loop_boundary(false) {
                        return true;
                    }
                    return self.core.finish(false);
                }
                self.evaluate_cross(prev, self.time, false);
            }
        }
        true
    }

    fn goto(&mut self, time: f32, play: bool) {
        let time = non_negative(time).min(self.duration);
        self.core.reset_playhead(true);
        self.time = time;
        self.evaluate_scrub(time);
        self.control(play);
    }

    fn rewind(&mut self, play: bool) {
        self.core.reset_playhead(false);
        self.time = 0.0;
        self.reset_callback_flags();
        self.evaluate_scrub(0.0);
        self.control(play);
    }

    fn complete(&mut self, with_callbacks: bool) {
        let duration = self.duration;
        self.goto(duration, false);
        if self.core.settle_complete(with_callbacks) {
            self.release();
        }
    }

    fn release(&mut self) {
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

        self.release_children();
        self.clear_items();
        self.core.deregister();
        self.core.clear_external();

        let scheduler = self.core.scheduler().clone();
        if let Some(this) = self.this.upgrade() {
            if scheduler.put_timeline(this) {
                tracing::debug!("timeline returned to pool");
            } else {
                tracing::debug!("timeline pool full, dropping instance");
            }
        }
    }

    fn is_released(&self) -> bool {
        self.in_pool
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("entries", &self.entries.len())
            .field("duration", &self.duration)
            .field("time", &self.time)
            .field("core", &self.core)
            .finish()
    }
}
