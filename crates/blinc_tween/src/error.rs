//! Tween error types

use thiserror::Error;

/// Errors surfaced by tween handles and scheduler factories
///
/// Playback edge cases (dead targets, zero steps, loop exhaustion) are never
/// errors; they evict silently on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TweenError {
    /// The pooled instance behind this handle was recycled
    #[error("stale tween handle (held generation {held}, current {current})")]
    Stale { held: u64, current: u64 },

    /// The instance was released back to the pool and not yet rented again
    #[error("tween handle refers to a released instance")]
    Released,

    /// The animatable is already borrowed, usually from inside its own callback
    #[error("tween is busy (accessed from its own callback)")]
    Busy,

    /// The scheduler behind a `SchedulerHandle` has been dropped
    #[error("tween scheduler has been dropped")]
    SchedulerDropped,
}

/// Result type for tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
