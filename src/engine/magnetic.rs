//! Magnetic pointer engine.
//!
//! Pulls an element toward the pointer: the target offset is the pointer's
//! distance from the element center times `strength`, with no clamping.
//! The rendered offset follows the target through a light spring on both
//! approach and release. It is a pure visual translation and never feeds
//! back into layout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, MotionError};
use crate::state::context::MotionContext;
use crate::state::pointer::PointerResponder;
use crate::state::reduced_motion::ReducedMotion;
use crate::types::Bounds;

use super::spring::{Spring, SpringConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    /// Fraction of the pointer-to-center distance applied as offset.
    pub strength: f32,
    pub spring: SpringConfig,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            strength: 0.3,
            spring: SpringConfig::new(150.0, 15.0, 0.1),
        }
    }
}

impl MagneticConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        ensure_finite("magnetic.strength", self.strength)?;
        self.spring.validate("magnetic.spring")
    }
}

/// Target offset for a pointer at `(x, y)`. Degenerate bounds or non-finite
/// input give `(0, 0)`.
pub fn magnetic_offset(bounds: Bounds, x: f32, y: f32, strength: f32) -> (f32, f32) {
    if bounds.is_degenerate() || !x.is_finite() || !y.is_finite() || !strength.is_finite() {
        return (0.0, 0.0);
    }
    let (cx, cy) = bounds.center();
    ((x - cx) * strength, (y - cy) * strength)
}

pub struct MagneticPointer {
    strength: f32,
    reduced_motion: ReducedMotion,
    x: Spring,
    y: Spring,
}

impl MagneticPointer {
    pub fn new(ctx: &MotionContext, config: MagneticConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(%err, "magnetic pointer disabled");
                MagneticConfig {
                    strength: 0.0,
                    spring: SpringConfig::default(),
                }
            }
        };
        Self {
            strength: config.strength,
            reduced_motion: ctx.reduced_motion.clone(),
            x: Spring::new(0.0, config.spring),
            y: Spring::new(0.0, config.spring),
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Change the pull for subsequent moves. Non-finite values are ignored.
    pub fn set_strength(&mut self, strength: f32) {
        if strength.is_finite() {
            self.strength = strength;
        }
    }

    /// Record a pointer sample. Returns the target offset.
    pub fn on_pointer_move(&mut self, bounds: Bounds, x: f32, y: f32) -> (f32, f32) {
        let target = magnetic_offset(bounds, x, y, self.strength);
        self.x.set_target(target.0);
        self.y.set_target(target.1);
        target
    }

    pub fn on_pointer_leave(&mut self) {
        self.x.set_target(0.0);
        self.y.set_target(0.0);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }

    pub fn target(&self) -> (f32, f32) {
        (self.x.target(), self.y.target())
    }

    /// Smoothed translation to render. `(0, 0)` under reduced motion.
    pub fn offset(&self) -> (f32, f32) {
        if self.reduced_motion.current_value() {
            return (0.0, 0.0);
        }
        (self.x.value(), self.y.value())
    }
}

impl PointerResponder for MagneticPointer {
    fn on_pointer_move(&mut self, bounds: Bounds, x: f32, y: f32) {
        MagneticPointer::on_pointer_move(self, bounds, x, y);
    }

    fn on_pointer_leave(&mut self) {
        MagneticPointer::on_pointer_leave(self);
    }

    fn advance(&mut self, dt: Duration) {
        MagneticPointer::advance(self, dt);
    }

    fn is_settled(&self) -> bool {
        MagneticPointer::is_settled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::timeline::Timeline;

    const FRAME: Duration = Duration::from_millis(16);
    const BUTTON: Bounds = Bounds::new(0.0, 0.0, 100.0, 40.0);

    fn setup(reduced: bool) -> MotionContext {
        MotionContext::new(Timeline::new(), ReducedMotion::fixed(reduced))
    }

    fn run_until_settled(magnet: &mut MagneticPointer) {
        for _ in 0..600 {
            if magnet.is_settled() {
                return;
            }
            magnet.advance(FRAME);
        }
        panic!("magnet did not settle");
    }

    #[test]
    fn test_offset_scales_distance_from_center() {
        assert_eq!(magnetic_offset(BUTTON, 50.0, 20.0, 0.3), (0.0, 0.0));
        let (dx, dy) = magnetic_offset(BUTTON, 100.0, 0.0, 0.5);
        assert_eq!((dx, dy), (25.0, -10.0));
    }

    #[test]
    fn test_offset_is_not_clamped() {
        let huge = Bounds::new(0.0, 0.0, 2000.0, 2000.0);
        let (dx, _) = magnetic_offset(huge, 2000.0, 1000.0, 1.0);
        assert_eq!(dx, 1000.0);
    }

    #[test]
    fn test_zero_size_bounds_give_zero() {
        for bounds in [
            Bounds::new(10.0, 10.0, 0.0, 0.0),
            Bounds::new(10.0, 10.0, 0.0, 20.0),
            Bounds::new(f32::NAN, 0.0, 10.0, 10.0),
        ] {
            let (dx, dy) = magnetic_offset(bounds, 15.0, 15.0, 0.3);
            assert_eq!((dx, dy), (0.0, 0.0));
        }

        let ctx = setup(false);
        let mut magnet = MagneticPointer::new(&ctx, MagneticConfig::default());
        magnet.on_pointer_move(Bounds::default(), 5.0, 5.0);
        magnet.advance(FRAME);
        let (x, y) = magnet.offset();
        assert!(!x.is_nan() && !y.is_nan());
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_springs_toward_target_and_back() {
        let ctx = setup(false);
        let config = MagneticConfig {
            strength: 0.25,
            ..Default::default()
        };
        let mut magnet = MagneticPointer::new(&ctx, config);
        let target = magnet.on_pointer_move(BUTTON, 100.0, 40.0);
        assert_eq!(target, (12.5, 5.0));

        magnet.advance(FRAME);
        let (x, _) = magnet.offset();
        assert!(x > 0.0 && x < 12.5);

        run_until_settled(&mut magnet);
        assert_eq!(magnet.offset(), (12.5, 5.0));

        magnet.on_pointer_leave();
        assert_eq!(magnet.target(), (0.0, 0.0));
        run_until_settled(&mut magnet);
        assert_eq!(magnet.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_reduced_motion_does_not_move() {
        let ctx = setup(true);
        let mut magnet = MagneticPointer::new(&ctx, MagneticConfig::default());
        magnet.on_pointer_move(BUTTON, 100.0, 40.0);
        run_until_settled(&mut magnet);
        assert_eq!(magnet.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_invalid_strength_disables() {
        let ctx = setup(false);
        let config = MagneticConfig {
            strength: f32::INFINITY,
            ..Default::default()
        };
        let mut magnet = MagneticPointer::new(&ctx, config);
        assert_eq!(magnet.on_pointer_move(BUTTON, 100.0, 40.0), (0.0, 0.0));

        magnet.set_strength(0.25);
        assert_eq!(magnet.on_pointer_move(BUTTON, 100.0, 40.0), (12.5, 5.0));
    }
}
