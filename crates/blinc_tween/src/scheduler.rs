//! Tween scheduler
//!
//! Owns every playing animatable, bucketed by update phase and time scale,
//! and drives each bucket once per host tick.
//!
//! [`TweenScheduler`] is the strong owner, typically held by the host loop.
//! Animatables and components hold a [`SchedulerHandle`], which is weak and
//! cannot keep the scheduler alive.
//!
//! Buckets are never borrowed while an animatable runs: a tick first copies
//! the bucket into a reused snapshot buffer and then updates from that, so
//! callbacks may register, kill or create tweens freely.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::TweenerConfig;
use crate::error::{Result, TweenError};
use crate::handle::{ActionHandle, PropertyHandle, TimelineHandle, TweenHandle};
use crate::pool::TweenPool;
use crate::property::{PropertyInit, PropertyTween};
use crate::target::{TargetRef, TweenId};
use crate::timeline::Timeline;
use crate::tween::{ActionTween, SharedAnimatable, TweenCore, UpdatePhase};
use crate::values::{Tweenable, ValueOps};

const BUCKET_COUNT: usize = 6;

/// One of the six (phase, time scale) buckets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub phase: UpdatePhase,
    pub unscaled: bool,
}

impl BucketKey {
    pub fn new(phase: UpdatePhase, unscaled: bool) -> Self {
        Self { phase, unscaled }
    }

    fn index(self) -> usize {
        let phase = match self.phase {
            UpdatePhase::Normal => 0,
            UpdatePhase::Late => 1,
            UpdatePhase::Fixed => 2,
        };
        phase * 2 + usize::from(self.unscaled)
    }

    fn all() -> impl Iterator<Item = BucketKey> {
        UpdatePhase::ALL
            .into_iter()
            .flat_map(|phase| [false, true].into_iter().map(move |unscaled| BucketKey::new(phase, unscaled)))
    }
}

fn entry_ptr(entry: &SharedAnimatable) -> *const () {
    Rc::as_ptr(entry) as *const ()
}

pub(crate) struct SchedulerInner {
    config: TweenerConfig,
    buckets: RefCell<[Vec<SharedAnimatable>; BUCKET_COUNT]>,
    pool: RefCell<TweenPool>,
    scratch: RefCell<Vec<SharedAnimatable>>,
}

impl SchedulerInner {
    fn new(config: TweenerConfig) -> Self {
        Self {
            config,
            buckets: RefCell::new(Default::default()),
            pool: RefCell::new(TweenPool::new()),
            scratch: RefCell::new(Vec::new()),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    fn register(&self, entry: SharedAnimatable, key: BucketKey) -> bool {
        let mut buckets = self.buckets.borrow_mut();
        let bucket = &mut buckets[key.index()];
        let ptr = entry_ptr(&entry);

        if !bucket.iter().any(|e| entry_ptr(e) == ptr) {
            bucket.push(entry);
            tracing::debug!(?key, len = bucket.len(), "tween registered");
        }
        true
    }

    fn deregister(&self, ptr: *const (), key: BucketKey) {
        let mut buckets = self.buckets.borrow_mut();
        let bucket = &mut buckets[key.index()];

        if let Some(pos) = bucket.iter().position(|e| entry_ptr(e) == ptr) {
            bucket.remove(pos);
            tracing::debug!(?key, len = bucket.len(), "tween deregistered");
        }
    }

    fn change_bucket(&self, entry: SharedAnimatable, old: BucketKey, new: BucketKey) -> bool {
        tracing::debug!(?old, ?new, "moving tween between buckets");
        self.deregister(entry_ptr(&entry), old);
        self.register(entry, new)
    }

    fn snapshot_bucket(&self, key: BucketKey, into: &mut Vec<SharedAnimatable>) {
        into.clear();
        into.extend(self.buckets.borrow()[key.index()].iter().cloned());
    }

    fn snapshot_all(&self) -> Vec<(BucketKey, SharedAnimatable)> {
        let buckets = self.buckets.borrow();
        let mut entries = Vec::with_capacity(buckets.iter().map(Vec::len).sum());
        for key in BucketKey::all() {
            entries.extend(buckets[key.index()].iter().map(|e| (key, e.clone())));
        }
        entries
    }

    // =========================================================================
    // Tick
    // =========================================================================

    fn tick(&self, phase: UpdatePhase, scaled_dt: f32, unscaled_dt: f32) {
        self.update_bucket(BucketKey::new(phase, false), scaled_dt);
        self.update_bucket(BucketKey::new(phase, true), unscaled_dt);
    }

    fn update_bucket(&self, key: BucketKey, dt: f32) {
        // A nested tick from a callback gets its own empty buffer
        let mut scratch = std::mem::take(&mut *self.scratch.borrow_mut());
        self.snapshot_bucket(key, &mut scratch);

        for entry in scratch.iter().rev() {
            let Ok(mut tween) = entry.try_borrow_mut() else {
                continue;
            };
            if !tween.core().is_registered() || tween.core().bucket_key() != key {
                continue;
            }

            let keep = !tween.is_dead() && tween.update_tween(dt);
            if keep {
                continue;
            }

            tween.core_mut().mark_evicted();
            tween.release();
            drop(tween);
            self.deregister(entry_ptr(entry), key);
            tracing::trace!(?key, "tween evicted");
        }

        scratch.clear();
        *self.scratch.borrow_mut() = scratch;
    }

    // =========================================================================
    // Global operations
    // =========================================================================

    fn kill_matching<F>(&self, complete: bool, matches: F) -> usize
    where
        F: Fn(&TweenCore) -> bool,
    {
        let mut killed = 0;
        for (key, entry) in self.snapshot_all() {
            let Ok(mut tween) = entry.try_borrow_mut() else {
                continue;
            };
            if !tween.core().is_registered() || !matches(tween.core()) {
                continue;
            }

            if complete {
                tween.complete(true);
            } else {
                tween.core_mut().kill();
            }
            tween.core_mut().mark_evicted();
            tween.release();
            drop(tween);
            self.deregister(entry_ptr(&entry), key);
            killed += 1;
        }

        if killed > 0 {
            tracing::debug!(killed, complete, "killed tweens");
        }
        killed
    }

    fn any_active<F>(&self, matches: F) -> bool
    where
        F: Fn(&TweenCore) -> bool,
    {
        let buckets = self.buckets.borrow();
        buckets.iter().flatten().any(|entry| {
            entry
                .try_borrow()
                .map(|tween| !tween.core().is_killed() && matches(tween.core()))
                .unwrap_or(false)
        })
    }

    fn active_count(&self) -> usize {
        self.buckets.borrow().iter().map(Vec::len).sum()
    }

    fn bucket_len(&self, key: BucketKey) -> usize {
        self.buckets.borrow()[key.index()].len()
    }
}

// ============================================================================
// Factories
// ============================================================================

fn rent_property<T, G, S>(
    inner: &Rc<SchedulerInner>,
    ops: ValueOps<T>,
    target: Option<TargetRef>,
    getter: G,
    setter: S,
    end: T,
    duration: f32,
) -> PropertyHandle<T>
where
    T: Clone + 'static,
    G: FnMut() -> T + 'static,
    S: FnMut(T) + 'static,
{
    let handle = SchedulerHandle {
        inner: Rc::downgrade(inner),
    };
    let init = PropertyInit {
        target,
        getter: Box::new(getter),
        setter: Box::new(setter),
        end,
        duration,
        ops,
        auto_play: true,
    };
    TweenHandle::new(PropertyTween::rent(&handle, &inner.config, init))
}

fn create_action(inner: &Rc<SchedulerInner>, target: Option<TargetRef>) -> ActionHandle {
    let handle = SchedulerHandle {
        inner: Rc::downgrade(inner),
    };
    TweenHandle::new(ActionTween::create(handle, &inner.config, target, true))
}

fn rent_timeline(inner: &Rc<SchedulerInner>) -> TimelineHandle {
    let handle = SchedulerHandle {
        inner: Rc::downgrade(inner),
    };
    TweenHandle::new(Timeline::rent(&handle, &inner.config, true))
}

// ============================================================================
// Scheduler
// ============================================================================

/// The tween scheduler that ticks all playing animatables
///
/// Construct one per host loop (or per test) and call [`tick`](Self::tick)
/// once per update phase per frame.
pub struct TweenScheduler {
    inner: Rc<SchedulerInner>,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::with_config(TweenerConfig::default())
    }

    pub fn with_config(config: TweenerConfig) -> Self {
        Self {
            inner: Rc::new(SchedulerInner::new(config)),
        }
    }

    /// Get a weak handle for creating tweens elsewhere
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &TweenerConfig {
        &self.inner.config
    }

    /// Update the phase's scaled bucket, then its unscaled bucket
    pub fn tick(&self, phase: UpdatePhase, scaled_dt: f32, unscaled_dt: f32) {
        self.inner.tick(phase, scaled_dt, unscaled_dt);
    }

    /// Kill (or complete) every registered animatable; returns how many
    pub fn kill_all(&self, complete: bool) -> usize {
        self.inner.kill_matching(complete, |_| true)
    }

    pub fn kill_target(&self, target: &TargetRef, complete: bool) -> usize {
        self.inner
            .kill_matching(complete, |core| core.target().is_some_and(|t| t.same_as(target)))
    }

    pub fn kill_id(&self, id: &TweenId, complete: bool) -> usize {
        self.inner.kill_matching(complete, |core| core.id() == Some(id))
    }

    pub fn is_tweening_target(&self, target: &TargetRef) -> bool {
        self.inner
            .any_active(|core| core.target().is_some_and(|t| t.same_as(target)))
    }

    pub fn is_tweening_id(&self, id: &TweenId) -> bool {
        self.inner.any_active(|core| core.id() == Some(id))
    }

    /// Registered animatables across all buckets
    pub fn active_count(&self) -> usize {
        self.inner.active_count()
    }

    pub fn bucket_len(&self, phase: UpdatePhase, unscaled: bool) -> usize {
        self.inner.bucket_len(BucketKey::new(phase, unscaled))
    }

    pub fn has_active_tweens(&self) -> bool {
        self.active_count() > 0
    }

    /// Pooled property drivers for value type `T`
    pub fn pooled_properties<T: 'static>(&self) -> usize {
        self.inner.pool.borrow().property_len::<T>()
    }

    pub fn pooled_timelines(&self) -> usize {
        self.inner.pool.borrow().timeline_len()
    }

    pub fn clear_pool(&self) {
        self.inner.pool.borrow_mut().clear();
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Tween a `Tweenable` property from its current value to `end`
    pub fn to<T, G, S>(&self, target: Option<TargetRef>, getter: G, setter: S, end: T, duration: f32) -> PropertyHandle<T>
    where
        T: Tweenable,
        G: FnMut() -> T + 'static,
        S: FnMut(T) + 'static,
    {
        rent_property(&self.inner, T::value_ops(), target, getter, setter, end, duration)
    }

    /// Tween a property with a caller-supplied operator table
    pub fn to_with<T, G, S>(
        &self,
        ops: ValueOps<T>,
        target: Option<TargetRef>,
        getter: G,
        setter: S,
        end: T,
        duration: f32,
    ) -> PropertyHandle<T>
    where
        T: Clone + 'static,
        G: FnMut() -> T + 'static,
        S: FnMut(T) + 'static,
    {
        rent_property(&self.inner, ops, target, getter, setter, end, duration)
    }

    /// Empty auto-playing action tween; add steps to it
    pub fn tween(&self, target: Option<TargetRef>) -> ActionHandle {
        create_action(&self.inner, target)
    }

    /// Empty auto-playing timeline
    pub fn timeline(&self) -> TimelineHandle {
        rent_timeline(&self.inner)
    }
}

impl Default for TweenScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TweenScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenScheduler")
            .field("active", &self.active_count())
            .field("config", &self.inner.config)
            .finish()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// A weak handle to the tween scheduler
///
/// Held by every animatable to register itself. It won't prevent the
/// scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<SchedulerInner>,
}

impl SchedulerHandle {
    /// Handle that never upgrades; tweens built with it are driven manually
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn upgrade(&self) -> Result<Rc<SchedulerInner>> {
        self.inner.upgrade().ok_or(TweenError::SchedulerDropped)
    }

    pub(crate) fn register_entry(&self, entry: SharedAnimatable, key: BucketKey) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.register(entry, key))
    }

    pub(crate) fn deregister_entry(&self, ptr: *const (), key: BucketKey) {
        if let Some(inner) = self.inner.upgrade() {
            inner.deregister(ptr, key);
        }
    }

    pub(crate) fn change_bucket(&self, entry: SharedAnimatable, old: BucketKey, new: BucketKey) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.change_bucket(entry, old, new))
    }

    pub(crate) fn take_property<T: Clone + 'static>(&self) -> Option<Rc<RefCell<PropertyTween<T>>>> {
        let inner = self.inner.upgrade()?;
        let taken = inner.pool.borrow_mut().take_property::<T>();
        taken
    }

    pub(crate) fn put_property<T: Clone + 'static>(&self, tween: Rc<RefCell<PropertyTween<T>>>) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let capacity = inner.config.max_property_pool;
        let pooled = inner.pool.borrow_mut().put_property(tween, capacity);
        pooled
    }

    pub(crate) fn take_timeline(&self) -> Option<Rc<RefCell<Timeline>>> {
        let inner = self.inner.upgrade()?;
        let taken = inner.pool.borrow_mut().take_timeline();
        taken
    }

    pub(crate) fn put_timeline(&self, timeline: Rc<RefCell<Timeline>>) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let capacity = inner.config.max_timeline_pool;
        let pooled = inner.pool.borrow_mut().put_timeline(timeline, capacity);
        pooled
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    pub fn tick(&self, phase: UpdatePhase, scaled_dt: f32, unscaled_dt: f32) -> Result<()> {
        self.upgrade()?.tick(phase, scaled_dt, unscaled_dt);
        Ok(())
    }

    pub fn to<T, G, S>(
        &self,
        target: Option<TargetRef>,
        getter: G,
        setter: S,
        end: T,
        duration: f32,
    ) -> Result<PropertyHandle<T>>
    where
        T: Tweenable,
        G: FnMut() -> T + 'static,
        S: FnMut(T) + 'static,
    {
        let inner = self.upgrade()?;
        Ok(rent_property(&inner, T::value_ops(), target, getter, setter, end, duration))
    }

    pub fn to_with<T, G, S>(
        &self,
        ops: ValueOps<T>,
        target: Option<TargetRef>,
        getter: G,
        setter: S,
        end: T,
        duration: f32,
    ) -> Result<PropertyHandle<T>>
    where
        T: Clone + 'static,
        G: FnMut() -> T + 'static,
        S: FnMut(T) + 'static,
    {
        let inner = self.upgrade()?;
        Ok(rent_property(&inner, ops, target, getter, setter, end, duration))
    }

    pub fn tween(&self, target: Option<TargetRef>) -> Result<ActionHandle> {
        let inner = self.upgrade()?;
        Ok(create_action(&inner, target))
    }

    pub fn timeline(&self) -> Result<TimelineHandle> {
        let inner = self.upgrade()?;
        Ok(rent_timeline(&inner))
    }

    /// Returns 0 once the scheduler is gone
    pub fn kill_all(&self, complete: bool) -> usize {
        self.inner
            .upgrade()
            .map_or(0, |inner| inner.kill_matching(complete, |_| true))
    }

    pub fn kill_target(&self, target: &TargetRef, complete: bool) -> usize {
        self.inner.upgrade().map_or(0, |inner| {
            inner.kill_matching(complete, |core| core.target().is_some_and(|t| t.same_as(target)))
        })
    }

    pub fn kill_id(&self, id: &TweenId, complete: bool) -> usize {
        self.inner
            .upgrade()
            .map_or(0, |inner| inner.kill_matching(complete, |core| core.id() == Some(id)))
    }

    pub fn is_tweening_target(&self, target: &TargetRef) -> bool {
        self.inner.upgrade().is_some_and(|inner| {
            inner.any_active(|core| core.target().is_some_and(|t| t.same_as(target)))
        })
    }

    pub fn is_tweening_id(&self, id: &TweenId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.any_active(|core| core.id() == Some(id)))
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use crate::tween::LoopType;
    use std::cell::Cell;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn float_cell(initial: f32) -> (Rc<Cell<f32>>, impl FnMut() -> f32, impl FnMut(f32)) {
        let value = Rc::new(Cell::new(initial));
        let read = value.clone();
        let write = value.clone();
        (value, move || read.get(), move |v| write.set(v))
    }

    #[test]
    fn test_bucket_indices_are_distinct() {
        let mut seen: Vec<usize> = BucketKey::all().map(BucketKey::index).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_autoplay_registers_and_finish_evicts() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(0.0);
        let _tween = scheduler.to(None, get, set, 1.0, 0.5);

        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(scheduler.bucket_len(UpdatePhase::Normal, false), 1);

        scheduler.tick(UpdatePhase::Normal, 0.25, 0.25);
        assert!(approx(value.get(), 0.5));
        scheduler.tick(UpdatePhase::Normal, 0.25, 0.25);
        assert!(approx(value.get(), 1.0));
        scheduler.tick(UpdatePhase::Normal, 0.25, 0.25);

        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.pooled_properties::<f32>(), 1);
    }

    #[test]
    fn test_tick_only_touches_its_phase() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(0.0);
        let tween = scheduler.to(None, get, set, 1.0, 1.0);
        tween.set_update(UpdatePhase::Late, false);

        assert_eq!(scheduler.bucket_len(UpdatePhase::Normal, false), 0);
        assert_eq!(scheduler.bucket_len(UpdatePhase::Late, false), 1);

        scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
        assert_eq!(value.get(), 0.0);
        scheduler.tick(UpdatePhase::Late, 0.5, 0.5);
        assert!(approx(value.get(), 0.5));
    }

    #[test]
    fn test_unscaled_bucket_uses_unscaled_delta() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(0.0);
        let tween = scheduler.to(None, get, set, 1.0, 1.0);
        tween.set_update(UpdatePhase::Normal, true);

        scheduler.tick(UpdatePhase::Normal, 0.0, 0.25);
        assert!(approx(value.get(), 0.25));
    }

    #[test]
    fn test_reverse_registration_order() {
        let scheduler = TweenScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            scheduler
                .tween(None)
                .add_step(Step::new(1.0, move |_| order.borrow_mut().push(i)));
        }

        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let scheduler = TweenScheduler::new();
        let tween = scheduler.tween(None);
        tween.add_interval(1.0).add_interval(1.0).play().resume();

        assert_eq!(scheduler.active_count(), 1);
    }

    #[test]
    fn test_kill_by_target_and_id() {
        let scheduler = TweenScheduler::new();
        let owner = Rc::new(());
        let target = TargetRef::from_rc(&owner);

        scheduler.tween(Some(target.clone())).add_interval(1.0);
        scheduler.tween(None).add_interval(1.0).set_id("fade");
        scheduler.tween(None).add_interval(1.0).set_id(7u64);

        assert!(scheduler.is_tweening_target(&target));
        assert!(scheduler.is_tweening_id(&TweenId::from("fade")));

        assert_eq!(scheduler.kill_target(&target, false), 1);
        assert!(!scheduler.is_tweening_target(&target));

        assert_eq!(scheduler.kill_id(&TweenId::from(7u64), false), 1);
        assert_eq!(scheduler.active_count(), 1);
        assert!(scheduler.is_tweening_id(&TweenId::from("fade")));
    }

    #[test]
    fn test_kill_all_with_complete_jumps_to_end() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(0.0);
        let completed = Rc::new(Cell::new(0));
        let counter = completed.clone();
        scheduler
            .to(None, get, set, 4.0, 1.0)
            .on_complete(move || counter.set(counter.get() + 1));

        assert_eq!(scheduler.kill_all(true), 1);
        assert!(approx(value.get(), 4.0));
        assert_eq!(completed.get(), 1);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.pooled_properties::<f32>(), 1);
    }

    #[test]
    fn test_dead_target_is_evicted() {
        let scheduler = TweenScheduler::new();
        let owner = Rc::new(());
        let (_value, get, set) = float_cell(0.0);
        scheduler.to(Some(TargetRef::from_rc(&owner)), get, set, 1.0, 1.0);

        drop(owner);
        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_kill_is_observed_on_next_tick() {
        let scheduler = TweenScheduler::new();
        let tween = scheduler.tween(None);
        tween.add_interval(1.0).kill();

        assert_eq!(scheduler.active_count(), 1);
        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_callbacks_may_create_tweens_during_tick() {
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();
        let spawned = Rc::new(Cell::new(false));
        let flag = spawned.clone();

        scheduler.tween(None).add_interval(0.1).on_complete(move || {
            if let Ok(tween) = handle.tween(None) {
                tween.add_interval(1.0);
                flag.set(true);
            }
        });

        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        assert!(spawned.get());
        assert_eq!(scheduler.active_count(), 1);
    }

    #[test]
    fn test_not_auto_killing_tween_survives_eviction() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(0.0);
        let tween = scheduler.to(None, get, set, 1.0, 0.5);
        tween.set_auto_kill(false);

        for _ in 0..3 {
            scheduler.tick(UpdatePhase::Normal, 0.25, 0.25);
        }
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.pooled_properties::<f32>(), 0);
        assert!(tween.is_valid());

        tween.restart(true);
        assert_eq!(scheduler.active_count(), 1);
        assert!(approx(value.get(), 0.0));
        scheduler.tick(UpdatePhase::Normal, 0.25, 0.25);
        assert!(approx(value.get(), 0.5));
    }

    #[test]
    fn test_handle_outlives_scheduler() {
        let scheduler = TweenScheduler::new();
        let handle = scheduler.handle();
        drop(scheduler);

        assert!(!handle.is_alive());
        assert_eq!(handle.tween(None).err(), Some(TweenError::SchedulerDropped));
        assert_eq!(handle.kill_all(false), 0);
    }

    #[test]
    fn test_unpooled_config_drops_released_tweens() {
        let scheduler = TweenScheduler::with_config(TweenerConfig::unpooled());
        let (_value, get, set) = float_cell(0.0);
        scheduler.to(None, get, set, 1.0, 0.1);

        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        scheduler.tick(UpdatePhase::Normal, 0.1, 0.1);
        assert_eq!(scheduler.pooled_properties::<f32>(), 0);
    }

    #[test]
    fn test_yoyo_through_scheduler() {
        let scheduler = TweenScheduler::new();
        let (value, get, set) = float_cell(0.0);
        scheduler
            .to(None, get, set, 1.0, 1.0)
            .set_loops(2, LoopType::Yoyo);

        scheduler.tick(UpdatePhase::Normal, 1.0, 1.0);
        scheduler.tick(UpdatePhase::Normal, 0.0, 0.0);
        scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
        assert!(approx(value.get(), 0.5));
    }

    #[test]
    fn test_animatable_trait_object_roundtrip() {
        let scheduler = TweenScheduler::new();
        let tween = scheduler.tween(None);
        tween.add_interval(2.0);
        let shared = tween.shared();
        assert!(approx(shared.borrow().duration(), 2.0));
    }
}
