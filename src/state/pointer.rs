//! Pointer Module - Pointer events and hover tracking
//!
//! Pointer engines (tilt, magnetic, cursor follower) are purely reactive: they
//! compute synchronously on each move/leave and leave smoothing to their
//! springs. This module turns raw pointer samples into those move/leave calls.
//!
//! # API
//!
//! - [`PointerEvent`] - a pointer sample (`Move`) or window exit (`Leave`)
//! - [`PointerResponder`] - implemented by every pointer engine
//! - [`PointerRegion`] - per-element hover tracking; moves inside the element
//!   reach the responder, the first sample outside becomes a single leave
//!
//! # Example
//!
//! ```ignore
//! let mut region = PointerRegion::new(bounds);
//! let mut tilt = PointerTilt::new(&ctx, TiltConfig::default());
//!
//! region.dispatch(&mut tilt, PointerEvent::move_to(12.0, 4.0));
//! tilt.advance(frame_time);
//! ```

use std::time::Duration;

use crossterm::event::{MouseEvent as TermMouseEvent, MouseEventKind};
use spark_signals::{signal, Signal};

use crate::types::Bounds;

// =============================================================================
// TYPES
// =============================================================================

/// Pointer action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Move,
    /// Pointer left the window or surface entirely.
    Leave,
}

/// Pointer event in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    /// Create a pointer move event
    pub fn move_to(x: f32, y: f32) -> Self {
        Self {
            action: PointerAction::Move,
            x,
            y,
        }
    }

    /// Create a leave event
    pub fn leave() -> Self {
        Self {
            action: PointerAction::Leave,
            x: f32::NAN,
            y: f32::NAN,
        }
    }

    /// Convert a terminal mouse event. Moves and drags become `Move` at the
    /// center of the cell; clicks and scrolls carry no pointer motion.
    pub fn from_terminal(event: &TermMouseEvent) -> Option<Self> {
        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(Self::move_to(
                event.column as f32 + 0.5,
                event.row as f32 + 0.5,
            )),
            _ => None,
        }
    }
}

// =============================================================================
// RESPONDER
// =============================================================================

/// An engine that reacts to the pointer over one element.
pub trait PointerResponder {
    /// Pointer moved to `(x, y)` inside `bounds`.
    fn on_pointer_move(&mut self, bounds: Bounds, x: f32, y: f32);

    /// Pointer left the element.
    fn on_pointer_leave(&mut self);

    /// Step smoothing by one frame of `dt`.
    fn advance(&mut self, dt: Duration);

    /// True once smoothed outputs have reached their targets.
    fn is_settled(&self) -> bool;
}

// =============================================================================
// HOVER REGION
// =============================================================================

/// Hover state for one element.
pub struct PointerRegion {
    bounds: Bounds,
    hovered: Signal<bool>,
}

impl PointerRegion {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            hovered: signal(false),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Update the element's box after a layout pass.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Whether the pointer is currently over the element.
    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    /// Hover state as a signal, for reactive hosts.
    pub fn hovered_signal(&self) -> Signal<bool> {
        self.hovered.clone()
    }

    /// Route an event to `responder`.
    ///
    /// Returns true if the responder was called.
    pub fn dispatch(&mut self, responder: &mut dyn PointerResponder, event: PointerEvent) -> bool {
        let inside = event.action == PointerAction::Move && self.bounds.contains(event.x, event.y);

        if inside {
            if !self.hovered.get() {
                self.hovered.set(true);
            }
            responder.on_pointer_move(self.bounds, event.x, event.y);
            return true;
        }

        if self.hovered.get() {
            self.hovered.set(false);
            responder.on_pointer_leave();
            return true;
        }
        false
    }
}

// =============================================================================
// TESTS
// =============================================================================
