//! Tuning knobs for a tween scheduler

use crate::easing::Easing;

/// Configuration shared by everything a scheduler creates
#[derive(Clone, Copy, Debug)]
pub struct TweenerConfig {
    /// Free-list capacity per property value type
    pub max_property_pool: usize,
    /// Free-list capacity for timelines
    pub max_timeline_pool: usize,
    /// Durations below this are raised to it
    pub min_step_duration: f32,
    /// Ease given to steps created without one
    pub default_ease: Easing,
    /// Initial `auto_kill` flag for new animatables
    pub auto_kill: bool,
}

impl TweenerConfig {
    pub fn new() -> Self {
        Self {
            max_property_pool: 256,
            max_timeline_pool: 64,
            min_step_duration: crate::step::MIN_STEP_DURATION,
            default_ease: Easing::Linear,
            auto_kill: true,
        }
    }

    /// No pooling at all; released instances are dropped
    pub fn unpooled() -> Self {
        Self {
            max_property_pool: 0,
            max_timeline_pool: 0,
            ..Self::new()
        }
    }

    pub fn with_max_property_pool(mut self, capacity: usize) -> Self {
        self.max_property_pool = capacity;
        self
    }

    pub fn with_max_timeline_pool(mut self, capacity: usize) -> Self {
        self.max_timeline_pool = capacity;
        self
    }

    pub fn with_min_step_duration(mut self, epsilon: f32) -> Self {
        self.min_step_duration = if epsilon > 0.0 {
            epsilon
        } else {
            crate::step::MIN_STEP_DURATION
        };
        self
    }

    pub fn with_default_ease(mut self, ease: Easing) -> Self {
        self.default_ease = ease;
        self
    }

    pub fn with_auto_kill(mut self, auto_kill: bool) -> Self {
        self.auto_kill = auto_kill;
        self
    }
}

impl Default for TweenerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TweenerConfig::default();
        assert_eq!(config.max_property_pool, 256);
        assert_eq!(config.max_timeline_pool, 64);
        assert!(config.auto_kill);
    }

    #[test]
    fn test_unpooled_keeps_other_fields() {
        let config = TweenerConfig::unpooled().with_auto_kill(false);
        assert_eq!(config.max_property_pool, 0);
        assert_eq!(config.max_timeline_pool, 0);
        assert!(!config.auto_kill);
        assert!((config.min_step_duration - 1e-4).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_epsilon_is_ignored() {
        let config = TweenerConfig::new().with_min_step_duration(-1.0);
        assert!(config.min_step_duration > 0.0);
    }
}
