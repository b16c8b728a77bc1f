//! Motion Engines - Text animation and pointer response.
//!
//! Every engine is independent. They share only the collaborators in
//! [`MotionContext`](crate::state::MotionContext) and a handful of helpers:
//!
//! - `phase` - Pure type / pause / delete transition function
//! - `graphemes` - Grapheme-indexed text
//! - `easing` / `spring` - Curves and smoothing
//!
//! # Engines
//!
//! | Engine            | Drives                                   | Timing          |
//! |-------------------|------------------------------------------|-----------------|
//! | `Typewriter`      | One string typed in, optionally looped   | Timeline timers |
//! | `RollingText`     | A list of strings, typed in turn         | Timeline timers |
//! | `SplitReveal`     | Staggered per-token entrance             | Sampled         |
//! | `LineReveal`      | Whole line sliding up into its slot      | Sampled         |
//! | `PointerTilt`     | 3D rotation toward the pointer           | Springs         |
//! | `MagneticPointer` | Translation toward the pointer           | Springs         |
//! | `GlitchText`      | Scramble-then-resolve on hover           | Timeline timers |
//! | `ProgressCounter` | Count-up number and bar fill             | Sampled         |
//! | `CursorFollower`  | Custom cursor dot and trailing ring      | Springs         |
//!
//! Timer-driven engines own their timers and cancel them on drop. Spring
//! engines are stepped by the host with `advance(dt)` once per frame.

pub mod counter;
pub mod cursor_follower;
pub mod easing;
pub mod glitch;
mod graphemes;
pub mod magnetic;
pub mod phase;
pub mod rolling;
pub mod split;
pub mod spring;
pub mod tilt;
pub mod typewriter;

pub use counter::{CounterConfig, CounterFrame, ProgressCounter};
pub use cursor_follower::{CursorConfig, CursorFollower, CursorFrame};
pub use easing::{Easing, EXPO_OUT};
pub use glitch::{GlitchConfig, GlitchText, GLITCH_GLYPHS};
pub use graphemes::GraphemeText;
pub use magnetic::{magnetic_offset, MagneticConfig, MagneticPointer};
pub use phase::{transition, CycleEvent, CycleState, CycleTiming, Phase, Step};
pub use rolling::{RollingConfig, RollingFrame, RollingText};
pub use split::{
    reveal, tokenize, LineReveal, PresetSpec, RevealPreset, RevealToken, SplitConfig, SplitMode,
    SplitReveal, TokenFrame, LINE_REVEAL_DURATION,
};
pub use spring::{Spring, SpringConfig};
pub use tilt::{normalize, Glare, PointerTilt, TiltConfig, TiltFrame};
pub use typewriter::{CompletionCallback, Typewriter, TypewriterConfig, TypewriterFrame};
