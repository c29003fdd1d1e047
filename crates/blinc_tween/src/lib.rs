//! Blinc Tween Engine
//!
//! Step sequencing, property drivers, timelines and phase-bucketed
//! scheduling for values that move over time.
//!
//! # Features
//!
//! - **Step Sequencing**: Ordered eased steps with delay, speed and looping
//! - **Property Drivers**: Pooled interpolation of any value through a getter/setter pair
//! - **Timelines**: Place animatables and callback markers on one seekable clock
//! - **Scheduling**: Six buckets by update phase and time scale, ticked by the host
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use blinc_tween::{Easing, TweenScheduler, UpdatePhase};
//!
//! let scheduler = TweenScheduler::new();
//! let opacity = Rc::new(Cell::new(0.0_f32));
//! let (read, write) = (opacity.clone(), opacity.clone());
//!
//! scheduler
//!     .to(None, move || read.get(), move |v| write.set(v), 1.0, 0.5)
//!     .set_ease(Easing::EaseOutCubic);
//!
//! scheduler.tick(UpdatePhase::Normal, 0.5, 0.5);
//! assert!((opacity.get() - 1.0).abs() < 1e-4);
//! ```

pub mod config;
pub mod driver;
pub mod easing;
pub mod error;
pub mod handle;
pub mod pool;
pub mod property;
pub mod scheduler;
pub mod step;
pub mod target;
pub mod timeline;
pub mod tween;
pub mod values;

pub use config::TweenerConfig;
pub use driver::FrameDriver;
pub use easing::Easing;
pub use error::{Result, TweenError};
pub use handle::{ActionHandle, PropertyHandle, TimelineHandle, TweenHandle};
pub use pool::TweenPool;
pub use property::PropertyTween;
pub use scheduler::{BucketKey, SchedulerHandle, TweenScheduler};
pub use step::{FromInstruction, Step, StepContext, MIN_STEP_DURATION};
pub use target::{TargetRef, TweenId};
pub use timeline::{Timeline, TimelineEntryId};
pub use tween::{ActionTween, Animatable, Direction, LoopType, SharedAnimatable, TweenCore, UpdatePhase};
pub use values::{Color, Tweenable, ValueOps, Vec2, Vec3};
