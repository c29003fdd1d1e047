//! Free lists of released property drivers and timelines

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::property::PropertyTween;
use crate::timeline::Timeline;

type PropertyList<T> = Vec<Rc<RefCell<PropertyTween<T>>>>;

/// Per-scheduler pools, keyed by value type for property drivers
#[derive(Default)]
pub struct TweenPool {
    properties: FxHashMap<TypeId, Box<dyn Any>>,
    timelines: Vec<Rc<RefCell<Timeline>>>,
}

impl TweenPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn take_property<T: Clone + 'static>(&mut self) -> Option<Rc<RefCell<PropertyTween<T>>>> {
        self.properties
            .get_mut(&TypeId::of::<T>())
            .and_then(|list| list.downcast_mut::<PropertyList<T>>())
            .and_then(|list| list.pop())
    }

    /// Returns `false` when the list is full and the instance was dropped
    pub(crate) fn put_property<T: Clone + 'static>(
        &mut self,
        tween: Rc<RefCell<PropertyTween<T>>>,
        capacity: usize,
    ) -> bool {
        let list = self
            .properties
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(PropertyList::<T>::new()));

        match list.downcast_mut::<PropertyList<T>>() {
            Some(list) if list.len() < capacity => {
                list.push(tween);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_timeline(&mut self) -> Option<Rc<RefCell<Timeline>>> {
        self.timelines.pop()
    }

    pub(crate) fn put_timeline(&mut self, timeline: Rc<RefCell<Timeline>>, capacity: usize) -> bool {
        if self.timelines.len() < capacity {
            self.timelines.push(timeline);
            true
        } else {
            false
        }
    }

    /// Pooled property drivers for value type `T`
    pub fn property_len<T: 'static>(&self) -> usize {
        self.properties
            .get(&TypeId::of::<T>())
            .and_then(|list| list.downcast_ref::<PropertyList<T>>())
            .map_or(0, Vec::len)
    }

    pub fn timeline_len(&self) -> usize {
        self.timelines.len()
    }

    /// Drop every pooled instance
    pub fn clear(&mut self) {
        self.properties.clear();
        self.timelines.clear();
    }
}

impl std::fmt::Debug for TweenPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenPool")
            .field("property_types", &self.properties.len())
            .field("timelines", &self.timelines.len())
            .finish()
    }
}
