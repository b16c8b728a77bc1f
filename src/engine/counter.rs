//! Progress counter - count-up number and bar fill for skill bars.
//!
//! Pure sampling: nothing is scheduled. The host records when the bar came
//! into view and asks for the frame at the elapsed time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::millis;
use crate::state::context::MotionContext;
use crate::state::reduced_motion::ReducedMotion;

use super::easing::{Easing, EXPO_OUT};
use super::split::stagger_offset;

/// Delay added per bar position.
pub const INDEX_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub from: f32,
    pub to: f32,
    #[serde(with = "millis")]
    pub duration: Duration,
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: 100.0,
            duration: Duration::from_secs(1),
            delay: Duration::ZERO,
        }
    }
}

impl CounterConfig {
    /// A `0..=level` percentage bar at position `index` in a list.
    pub fn for_level(level: f32, index: usize) -> Self {
        Self {
            to: level,
            delay: stagger_offset(INDEX_DELAY, index),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterFrame {
    /// Rounded display value.
    pub value: i64,
    /// Bar width as a fraction of `to / 100`.
    pub fill: f32,
}

#[derive(Debug, Clone)]
pub struct ProgressCounter {
    config: CounterConfig,
    reduced_motion: ReducedMotion,
}

impl ProgressCounter {
    pub fn new(ctx: &MotionContext, config: CounterConfig) -> Self {
        Self {
            config,
            reduced_motion: ctx.reduced_motion.clone(),
        }
    }

    fn progress(&self, elapsed: Duration) -> f32 {
        if self.reduced_motion.current_value() {
            return 1.0;
        }
        let Some(local) = elapsed.checked_sub(self.config.delay) else {
            return 0.0;
        };
        let duration = self.config.duration.as_secs_f32();
        if duration <= 0.0 {
            return 1.0;
        }
        (local.as_secs_f32() / duration).min(1.0)
    }

    /// Count-up value at `elapsed` after the bar came into view.
    pub fn value_at(&self, elapsed: Duration) -> i64 {
        let eased = Easing::EaseOutCubic.transform(self.progress(elapsed));
        let CounterConfig { from, to, .. } = self.config;
        (from + (to - from) * eased).round() as i64
    }

    /// Bar fill in `[0, to / 100]`.
    pub fn fill_at(&self, elapsed: Duration) -> f32 {
        EXPO_OUT.transform(self.progress(elapsed)) * self.config.to / 100.0
    }

    pub fn frame_at(&self, elapsed: Duration) -> CounterFrame {
        CounterFrame {
            value: self.value_at(elapsed),
            fill: self.fill_at(elapsed),
        }
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.progress(elapsed) >= 1.0
    }
}
