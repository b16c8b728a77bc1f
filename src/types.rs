//! Core types for spark-motion.
//!
//! Value types shared by every engine: element bounds, rolling-text items,
//! and the bitfield describing which visual properties an entrance animates.

use serde::{Deserialize, Serialize};

// =============================================================================
// Bounds
// =============================================================================

/// An element's bounding box in the host's coordinate space.
///
/// Units are whatever the host measures in (pixels for a browser-like host,
/// cells for a terminal). Pointer coordinates handed to the engines must use
/// the same space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Center point `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True if the point lies inside the box (right and bottom edges exclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }

    /// True when the box cannot be used as a divisor: zero, negative or
    /// non-finite extent (element not laid out yet).
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || !(self.left.is_finite() && self.top.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

impl From<&taffy::Layout> for Bounds {
    fn from(layout: &taffy::Layout) -> Self {
        Self {
            left: layout.location.x,
            top: layout.location.y,
            width: layout.size.width,
            height: layout.size.height,
        }
    }
}

// =============================================================================
// Rolling text items
// =============================================================================

/// Opaque icon reference rendered before a rolling-text item.
///
/// The engines never interpret it; the renderer maps it to a glyph or image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconToken(pub String);

impl IconToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One entry of a rolling-text sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconToken>,
}

impl RoleItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: IconToken) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl From<&str> for RoleItem {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

// =============================================================================
// Animated properties (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Visual properties an entrance animation drives.
    ///
    /// Combine with bitwise OR: `AnimatedProps::OPACITY | AnimatedProps::TRANSLATE_Y`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnimatedProps: u8 {
        const NONE = 0;
        const OPACITY = 1 << 0;
        const TRANSLATE_Y = 1 << 1;
        const ROTATE_X = 1 << 2;
    }
}
