//! Spring smoothing for pointer-driven values.
//!
//! A damped harmonic oscillator integrated with semi-implicit Euler in fixed
//! 1ms substeps, so the result does not depend on the host's frame rate.
//! Engines feed raw pointer samples in as targets and render `value()`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, MotionError};

const SUBSTEP_NANOS: u128 = 1_000_000;

/// Longer gaps (a suspended host, a stalled frame) snap to the target.
pub const MAX_FRAME: Duration = Duration::from_secs(1);

/// Physical parameters of a spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Settled once `|target - value|` is below this...
    pub rest_delta: f32,
    /// ...and `|velocity|` is below this.
    pub rest_speed: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(100.0, 10.0, 1.0)
    }
}

impl SpringConfig {
    pub const fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            rest_delta: 0.001,
            rest_speed: 0.001,
        }
    }

    pub fn validate(&self, section: &'static str) -> Result<(), MotionError> {
        for value in [self.stiffness, self.damping, self.mass] {
            ensure_finite(section, value)?;
        }
        for value in [self.stiffness, self.mass] {
            if value <= 0.0 {
                return Err(MotionError::NotPositive {
                    field: section,
                    value,
                });
            }
        }
        if self.damping < 0.0 {
            return Err(MotionError::NotPositive {
                field: section,
                value: self.damping,
            });
        }
        Ok(())
    }
}

/// One smoothed scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    /// A spring at rest at `value`.
    pub fn new(value: f32, config: SpringConfig) -> Self {
        Self {
            config,
            value,
            velocity: 0.0,
            target: value,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Non-finite targets are ignored.
    pub fn set_target(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Jump to `value` and stop.
    pub fn snap_to(&mut self, value: f32) {
        if value.is_finite() {
            self.value = value;
            self.target = value;
            self.velocity = 0.0;
        }
    }

    pub fn is_settled(&self) -> bool {
        (self.target - self.value).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
    }

    /// Integrate forward by `dt`. Snaps to the target once settled, or when
    /// `dt` exceeds [`MAX_FRAME`].
    pub fn advance(&mut self, dt: Duration) {
        if self.is_settled() || dt > MAX_FRAME {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let SpringConfig {
            stiffness,
            damping,
            mass,
            ..
        } = self.config;

        let steps = (dt.as_nanos() / SUBSTEP_NANOS).max(1) as u32;
        let h = dt.as_secs_f32() / steps as f32;
        for _ in 0..steps {
            let force = -stiffness * (self.value - self.target) - damping * self.velocity;
            self.velocity += force / mass * h;
            self.value += self.velocity * h;
        }

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }
}

/// Advance `spring` in frames of `frame` until settled or `limit` elapses.
/// Returns the simulated time.
pub fn settle(spring: &mut Spring, frame: Duration, limit: Duration) -> Duration {
    let mut elapsed = Duration::ZERO;
    while !spring.is_settled() && elapsed < limit {
        spring.advance(frame);
        elapsed += frame;
    }
    elapsed
}
