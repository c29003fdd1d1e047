//! Target identity and user ids
//!
//! An animatable never owns what it animates. It keeps a [`TargetRef`] that
//! answers two questions: is the target still alive, and is it the same
//! target as another reference. Nothing else ever dereferences it.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

/// Liveness predicate for opaque host handles
pub type LivenessFn = Rc<dyn Fn(u64) -> bool>;

/// Weak, non-owning reference to the object being animated
#[derive(Clone)]
pub enum TargetRef {
    /// An `Rc`-managed host object; alive while it has strong owners
    Object(Weak<dyn Any>),
    /// An opaque key whose liveness the host decides
    Handle { key: u64, is_alive: LivenessFn },
}

impl TargetRef {
    /// Reference an `Rc`-owned object without extending its lifetime
    pub fn from_rc<T: Any>(object: &Rc<T>) -> Self {
        let weak: Weak<T> = Rc::downgrade(object);
        TargetRef::Object(weak)
    }

    /// Reference a host-managed handle with a caller-supplied liveness check
    pub fn handle<F>(key: u64, is_alive: F) -> Self
    where
        F: Fn(u64) -> bool + 'static,
    {
        TargetRef::Handle {
            key,
            is_alive: Rc::new(is_alive),
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            TargetRef::Object(weak) => weak.strong_count() > 0,
            TargetRef::Handle { key, is_alive } => is_alive(*key),
        }
    }

    /// Identity comparison (pointer identity for objects, key equality for handles)
    pub fn same_as(&self, other: &TargetRef) -> bool {
        match (self, other) {
            (TargetRef::Object(a), TargetRef::Object(b)) => {
                std::ptr::eq(a.as_ptr() as *const (), b.as_ptr() as *const ())
            }
            (TargetRef::Handle { key: a, .. }, TargetRef::Handle { key: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Object(weak) => f
                .debug_struct("Object")
                .field("ptr", &(weak.as_ptr() as *const ()))
                .field("alive", &(weak.strong_count() > 0))
                .finish(),
            TargetRef::Handle { key, .. } => f.debug_struct("Handle").field("key", key).finish(),
        }
    }
}

impl<T: Any> From<&Rc<T>> for TargetRef {
    fn from(object: &Rc<T>) -> Self {
        TargetRef::from_rc(object)
    }
}

/// Opaque user id, matched by value equality
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TweenId {
    Num(u64),
    Name(String),
}

impl From<u64> for TweenId {
    fn from(id: u64) -> Self {
        TweenId::Num(id)
    }
}

impl From<&str> for TweenId {
    fn from(name: &str) -> Self {
        TweenId::Name(name.to_owned())
    }
}

impl From<String> for TweenId {
    fn from(name: String) -> Self {
        TweenId::Name(name)
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TweenId::Num(n) => write!(f, "#{}", n),
            TweenId::Name(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_object_liveness_follows_rc() {
        let object = Rc::new(5_u32);
        let target = TargetRef::from_rc(&object);
        assert!(target.is_alive());

        drop(object);
        assert!(!target.is_alive());
    }

    #[test]
    fn test_object_identity() {
        let a = Rc::new(1_u8);
        let b = Rc::new(1_u8);

        assert!(TargetRef::from_rc(&a).same_as(&TargetRef::from_rc(&a)));
        assert!(!TargetRef::from_rc(&a).same_as(&TargetRef::from_rc(&b)));
    }

    #[test]
    fn test_handle_liveness_is_host_defined() {
        let alive = Rc::new(Cell::new(true));
        let flag = alive.clone();
        let target = TargetRef::handle(7, move |_| flag.get());

        assert!(target.is_alive());
        alive.set(false);
        assert!(!target.is_alive());

        assert!(target.same_as(&TargetRef::handle(7, |_| true)));
        assert!(!target.same_as(&TargetRef::handle(8, |_| true)));
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(TweenId::from("fade"), TweenId::Name("fade".into()));
        assert_ne!(TweenId::from(1u64), TweenId::from("1"));
    }
}
