//! Cursor follower - custom pointer with a trailing ring.
//!
//! The dot sits exactly on the pointer. The ring chases it through a stiff
//! spring and grows while an interactive element is hovered, as the dot
//! shrinks away. Both are hidden until the first move and after the pointer
//! leaves the window. Under reduced motion the ring snaps instead of chasing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::context::MotionContext;
use crate::state::pointer::PointerResponder;
use crate::state::reduced_motion::ReducedMotion;
use crate::types::Bounds;

use super::spring::{Spring, SpringConfig};

/// Off-screen start position on both axes.
pub const OFFSCREEN: f32 = -100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Ring position spring.
    pub spring: SpringConfig,
    /// Ring size and dot scale spring.
    pub ring_spring: SpringConfig,
    pub ring_size: f32,
    pub ring_hover_size: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::new(400.0, 25.0, 1.0),
            ring_spring: SpringConfig::new(300.0, 20.0, 1.0),
            ring_size: 24.0,
            ring_hover_size: 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorFrame {
    pub visible: bool,
    /// Ring center.
    pub ring: (f32, f32),
    /// Ring diameter.
    pub ring_size: f32,
    /// Dot center.
    pub dot: (f32, f32),
    pub dot_scale: f32,
}

pub struct CursorFollower {
    config: CursorConfig,
    reduced_motion: ReducedMotion,
    pointer: (f32, f32),
    ring_x: Spring,
    ring_y: Spring,
    ring_size: Spring,
    dot_scale: Spring,
    visible: bool,
    hovering: bool,
}

impl CursorFollower {
    pub fn new(ctx: &MotionContext, config: CursorConfig) -> Self {
        let config = match config
            .spring
            .validate("cursor.spring")
            .and_then(|()| config.ring_spring.validate("cursor.ring_spring"))
        {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(%err, "cursor follower using default springs");
                CursorConfig {
                    ring_size: config.ring_size,
                    ring_hover_size: config.ring_hover_size,
                    ..Default::default()
                }
            }
        };
        Self {
            reduced_motion: ctx.reduced_motion.clone(),
            pointer: (OFFSCREEN, OFFSCREEN),
            ring_x: Spring::new(OFFSCREEN, config.spring),
            ring_y: Spring::new(OFFSCREEN, config.spring),
            ring_size: Spring::new(config.ring_size, config.ring_spring),
            dot_scale: Spring::new(1.0, config.ring_spring),
            visible: false,
            hovering: false,
            config,
        }
    }

    /// Pointer moved anywhere in the window.
    pub fn on_window_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.pointer = (x, y);
        self.ring_x.set_target(x);
        self.ring_y.set_target(y);
        self.visible = true;
    }

    /// Pointer left the window.
    pub fn on_window_leave(&mut self) {
        self.visible = false;
    }

    /// Whether the pointer is over something interactive.
    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
        let (size, scale) = if hovering {
            (self.config.ring_hover_size, 0.0)
        } else {
            (self.config.ring_size, 1.0)
        };
        self.ring_size.set_target(size);
        self.dot_scale.set_target(scale);
    }

    /// Hover follows whichever of `targets` contains the pointer.
    pub fn hover_over(&mut self, targets: &[Bounds]) {
        let (x, y) = self.pointer;
        let hovering = targets.iter().any(|b| b.contains(x, y));
        if hovering != self.hovering {
            self.set_hovering(hovering);
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.reduced_motion.current_value() {
            for spring in [
                &mut self.ring_x,
                &mut self.ring_y,
                &mut self.ring_size,
                &mut self.dot_scale,
            ] {
                let target = spring.target();
                spring.snap_to(target);
            }
            return;
        }
        self.ring_x.advance(dt);
        self.ring_y.advance(dt);
        self.ring_size.advance(dt);
        self.dot_scale.advance(dt);
    }

    pub fn is_settled(&self) -> bool {
        self.ring_x.is_settled()
            && self.ring_y.is_settled()
            && self.ring_size.is_settled()
            && self.dot_scale.is_settled()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn frame(&self) -> CursorFrame {
        CursorFrame {
            visible: self.visible,
            ring: (self.ring_x.value(), self.ring_y.value()),
            ring_size: self.ring_size.value(),
            dot: self.pointer,
            dot_scale: self.dot_scale.value(),
        }
    }
}

impl PointerResponder for CursorFollower {
    fn on_pointer_move(&mut self, _bounds: Bounds, x: f32, y: f32) {
        self.on_window_move(x, y);
    }

    fn on_pointer_leave(&mut self) {
        self.on_window_leave();
    }

    fn advance(&mut self, dt: Duration) {
        CursorFollower::advance(self, dt);
    }

    fn is_settled(&self) -> bool {
        CursorFollower::is_settled(self)
    }
}
