//! Pointer Tilt Engine - 3D card tilt toward the pointer
//!
//! The pointer position inside the element is normalized to `[-0.5, 0.5]` on
//! each axis, measured from the element's center. Those raw samples are fed
//! through springs, and rotation and glare are derived from the smoothed
//! values:
//!
//! - `rotate_x` goes from `+intensity` at the top edge to `-intensity` at the
//!   bottom edge
//! - `rotate_y` goes from `-intensity` at the left edge to `+intensity` at the
//!   right edge
//! - glare position goes from 0% to 100% on each axis
//!
//! While hovered the card scales to `hover_scale` and the glare fades in.
//! On leave everything returns to rest. Under reduced motion the output is
//! the identity transform.
//!
//! # Example
//!
//! ```ignore
//! let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
//! let mut region = PointerRegion::new(card_bounds);
//!
//! region.dispatch(&mut tilt, PointerEvent::move_to(x, y));
//! tilt.advance(frame_dt);
//! let frame = tilt.frame();
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::millis;
use crate::error::{ensure_finite, MotionError};
use crate::state::context::MotionContext;
use crate::state::pointer::PointerResponder;
use crate::state::reduced_motion::ReducedMotion;
use crate::types::Bounds;

use super::easing::Easing;
use super::spring::{Spring, SpringConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Maximum rotation in degrees at the element's edge.
    pub intensity: f32,
    pub hover_scale: f32,
    pub glare: bool,
    /// Time for the hover scale and glare fade.
    #[serde(with = "millis")]
    pub hover_duration: Duration,
    pub spring: SpringConfig,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            intensity: 10.0,
            hover_scale: 1.02,
            glare: true,
            hover_duration: Duration::from_millis(200),
            spring: SpringConfig::new(150.0, 20.0, 1.0),
        }
    }
}

impl TiltConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        ensure_finite("tilt.intensity", self.intensity)?;
        ensure_finite("tilt.hover_scale", self.hover_scale)?;
        self.spring.validate("tilt.spring")
    }
}

/// Normalized pointer position relative to the element center.
///
/// Degenerate bounds or non-finite input give `(0, 0)`; points outside the
/// element are clamped to the edge.
pub fn normalize(bounds: Bounds, x: f32, y: f32) -> (f32, f32) {
    if bounds.is_degenerate() || !x.is_finite() || !y.is_finite() {
        return (0.0, 0.0);
    }
    let nx = (x - bounds.left) / bounds.width - 0.5;
    let ny = (y - bounds.top) / bounds.height - 0.5;
    (nx.clamp(-0.5, 0.5), ny.clamp(-0.5, 0.5))
}

/// Map `value` from `[-0.5, 0.5]` onto `[from, to]`.
fn map_range(value: f32, from: f32, to: f32) -> f32 {
    from + (value + 0.5) * (to - from)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glare {
    /// Highlight center, percent of width.
    pub x: f32,
    /// Highlight center, percent of height.
    pub y: f32,
    pub opacity: f32,
}

/// Transform handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltFrame {
    /// Degrees.
    pub rotate_x: f32,
    /// Degrees.
    pub rotate_y: f32,
    pub scale: f32,
    /// `None` when glare is disabled.
    pub glare: Option<Glare>,
}

impl TiltFrame {
    pub const IDENTITY: TiltFrame = TiltFrame {
        rotate_x: 0.0,
        rotate_y: 0.0,
        scale: 1.0,
        glare: None,
    };
}

pub struct PointerTilt {
    config: TiltConfig,
    reduced_motion: ReducedMotion,
    raw: (f32, f32),
    x: Spring,
    y: Spring,
    hovered: bool,
    /// 0 at rest, 1 fully hovered.
    hover_progress: f32,
    inert: bool,
}

impl PointerTilt {
    pub fn new(ctx: &MotionContext, config: TiltConfig) -> Self {
        let inert = match config.validate() {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!(%err, "pointer tilt disabled");
                true
            }
        };
        let spring = if inert {
            SpringConfig::default()
        } else {
            config.spring
        };
        Self {
            config,
            reduced_motion: ctx.reduced_motion.clone(),
            raw: (0.0, 0.0),
            x: Spring::new(0.0, spring),
            y: Spring::new(0.0, spring),
            hovered: false,
            hover_progress: 0.0,
            inert,
        }
    }

    /// Record a pointer sample. Returns the raw normalized position.
    pub fn on_pointer_move(&mut self, bounds: Bounds, x: f32, y: f32) -> (f32, f32) {
        self.hovered = true;
        self.raw = normalize(bounds, x, y);
        self.x.set_target(self.raw.0);
        self.y.set_target(self.raw.1);
        self.raw
    }

    /// Pointer left: everything eases back to rest.
    pub fn on_pointer_leave(&mut self) {
        self.hovered = false;
        self.raw = (0.0, 0.0);
        self.x.set_target(0.0);
        self.y.set_target(0.0);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);

        let span = self.config.hover_duration.as_secs_f32();
        let step = if span > 0.0 { dt.as_secs_f32() / span } else { 1.0 };
        self.hover_progress = if self.hovered {
            (self.hover_progress + step).min(1.0)
        } else {
            (self.hover_progress - step).max(0.0)
        };
    }

    pub fn is_settled(&self) -> bool {
        let hover_target = if self.hovered { 1.0 } else { 0.0 };
        self.x.is_settled() && self.y.is_settled() && self.hover_progress == hover_target
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Last raw normalized sample.
    pub fn normalized(&self) -> (f32, f32) {
        self.raw
    }

    /// Smoothed `(rotate_x, rotate_y)` in degrees.
    pub fn rotation(&self) -> (f32, f32) {
        let i = self.config.intensity;
        (
            map_range(self.y.value(), i, -i),
            map_range(self.x.value(), -i, i),
        )
    }

    pub fn frame(&self) -> TiltFrame {
        if self.inert || self.reduced_motion.current_value() {
            return TiltFrame::IDENTITY;
        }
        let (rotate_x, rotate_y) = self.rotation();
        let eased = Easing::EaseOut.transform(self.hover_progress);
        let glare = self.config.glare.then(|| Glare {
            x: map_range(self.x.value(), 0.0, 100.0),
            y: map_range(self.y.value(), 0.0, 100.0),
            opacity: eased,
        });
        TiltFrame {
            rotate_x,
            rotate_y,
            scale: 1.0 + (self.config.hover_scale - 1.0) * eased,
            glare,
        }
    }
}

impl PointerResponder for PointerTilt {
    fn on_pointer_move(&mut self, bounds: Bounds, x: f32, y: f32) {
        PointerTilt::on_pointer_move(self, bounds, x, y);
    }

    fn on_pointer_leave(&mut self) {
        PointerTilt::on_pointer_leave(self);
    }

    fn advance(&mut self, dt: Duration) {
        PointerTilt::advance(self, dt);
    }

    fn is_settled(&self) -> bool {
        PointerTilt::is_settled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pointer::{PointerEvent, PointerRegion};
    use crate::state::reduced_motion::ManualPreference;
    use crate::state::timeline::Timeline;

    const FRAME: Duration = Duration::from_millis(16);
    const CARD: Bounds = Bounds::new(100.0, 50.0, 200.0, 100.0);

    fn setup(reduced: bool) -> (MotionContext, ManualPreference) {
        let pref = ManualPreference::new(reduced);
        let ctx = MotionContext::new(Timeline::new(), ReducedMotion::new(pref.clone()));
        (ctx, pref)
    }

    fn settle(tilt: &mut PointerTilt) {
        for _ in 0..600 {
            if tilt.is_settled() {
                return;
            }
            tilt.advance(FRAME);
        }
        panic!("tilt did not settle");
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(CARD, 200.0, 100.0), (0.0, 0.0));
        assert_eq!(normalize(CARD, 100.0, 50.0), (-0.5, -0.5));
        assert_eq!(normalize(CARD, 250.0, 75.0), (0.25, -0.25));
    }

    #[test]
    fn test_normalize_guards() {
        let flat = Bounds::new(0.0, 0.0, 0.0, 10.0);
        assert_eq!(normalize(flat, 5.0, 5.0), (0.0, 0.0));
        assert_eq!(normalize(CARD, f32::NAN, 60.0), (0.0, 0.0));
        assert_eq!(normalize(CARD, 10_000.0, -10_000.0), (0.5, -0.5));
    }

    #[test]
    fn test_center_is_flat() {
        let (ctx, _) = setup(false);
        let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
        tilt.on_pointer_move(CARD, 200.0, 100.0);
        settle(&mut tilt);
        let frame = tilt.frame();
        assert!(approx(frame.rotate_x, 0.0));
        assert!(approx(frame.rotate_y, 0.0));
    }

    #[test]
    fn test_top_left_corner_reaches_intensity() {
        let (ctx, _) = setup(false);
        let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
        let raw = tilt.on_pointer_move(CARD, 100.0, 50.0);
        assert_eq!(raw, (-0.5, -0.5));

        tilt.advance(FRAME);
        let (early_x, _) = tilt.rotation();
        assert!(early_x > 0.0 && early_x < 10.0);

        settle(&mut tilt);
        let frame = tilt.frame();
        assert!(approx(frame.rotate_x, 10.0));
        assert!(approx(frame.rotate_y, -10.0));
        assert!(approx(frame.scale, 1.02));
        let glare = frame.glare.expect("glare enabled");
        assert!(approx(glare.x, 0.0) && approx(glare.y, 0.0));
        assert!(approx(glare.opacity, 1.0));
    }

    #[test]
    fn test_leave_settles_to_rest() {
        let (ctx, _) = setup(false);
        let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
        tilt.on_pointer_move(CARD, 300.0, 150.0);
        settle(&mut tilt);

        tilt.on_pointer_leave();
        assert_eq!(tilt.normalized(), (0.0, 0.0));
        settle(&mut tilt);
        let frame = tilt.frame();
        assert!(approx(frame.rotate_x, 0.0) && approx(frame.rotate_y, 0.0));
        assert_eq!(frame.scale, 1.0);
    }

    #[test]
    fn test_region_dispatch() {
        let (ctx, _) = setup(false);
        let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
        let mut region = PointerRegion::new(CARD);

        assert!(region.dispatch(&mut tilt, PointerEvent::move_to(120.0, 60.0)));
        assert!(tilt.is_hovered());
        assert!(region.dispatch(&mut tilt, PointerEvent::move_to(10.0, 10.0)));
        assert!(!tilt.is_hovered());
    }

    #[test]
    fn test_reduced_motion_is_identity() {
        let (ctx, pref) = setup(false);
        let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
        tilt.on_pointer_move(CARD, 100.0, 50.0);
        settle(&mut tilt);
        assert!(tilt.frame().rotate_x > 5.0);

        pref.set(true);
        assert_eq!(tilt.frame(), TiltFrame::IDENTITY);
    }

    #[test]
    fn test_glare_disabled() {
        let (ctx, _) = setup(false);
        let config = TiltConfig {
            glare: false,
            ..Default::default()
        };
        let tilt = PointerTilt::new(&ctx, config);
        assert!(tilt.frame().glare.is_none());
    }

    #[test]
    fn test_invalid_config_is_inert() {
        let (ctx, _) = setup(false);
        let config = TiltConfig {
            intensity: f32::NAN,
            ..Default::default()
        };
        let mut tilt = PointerTilt::new(&ctx, config);
        tilt.on_pointer_move(CARD, 100.0, 50.0);
        tilt.advance(FRAME);
        assert_eq!(tilt.frame(), TiltFrame::IDENTITY);
    }
}
