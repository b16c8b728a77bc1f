//! # spark-motion
//!
//! Animated-text and pointer-interaction engines for Rust UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity: every observable output is a `Signal` a host can
//! read inside an effect.
//!
//! ## Architecture
//!
//! Engines are small state machines owned by the view that created them. They
//! never reach for globals; everything they share arrives through a
//! [`MotionContext`]:
//!
//! ```text
//! MotionContext { Timeline, ReducedMotion }
//!        │
//!        ├── Typewriter / RollingText / GlitchText   (timers on the Timeline)
//!        ├── SplitReveal / LineReveal / ProgressCounter  (sampled at timeline time)
//!        └── PointerTilt / MagneticPointer / CursorFollower
//!                                                     (springs, stepped per frame)
//! ```
//!
//! The host drives time with [`Timeline::advance`] (or
//! [`Timeline::sync_to_wall_clock`]) and pointer input with
//! [`PointerRegion::dispatch`], then renders each engine's `frame()`.
//!
//! ## Modules
//!
//! - [`types`] - Shared value types (Bounds, RoleItem, AnimatedProps)
//! - [`state`] - Timeline, reduced-motion provider, blink clocks, pointer regions
//! - [`engine`] - The engines
//! - [`config`] - TOML configuration
//! - [`error`] - Error types
//! - [`logging`] - Tracing setup

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{MotionConfig, ReducedMotionMode};
pub use error::{ConfigError, MotionError};
pub use logging::init_tracing;

pub use engine::{
    // Text
    reveal, tokenize, CompletionCallback, GlitchConfig, GlitchText, LineReveal, Phase,
    RevealPreset, RevealToken, RollingConfig, RollingFrame, RollingText, SplitConfig, SplitMode,
    SplitReveal, TokenFrame, Typewriter, TypewriterConfig, TypewriterFrame,
    // Pointer
    magnetic_offset, normalize, CursorConfig, CursorFollower, CursorFrame, MagneticConfig,
    MagneticPointer, PointerTilt, TiltConfig, TiltFrame,
    // Progress
    CounterConfig, CounterFrame, ProgressCounter,
    // Shared
    Easing, Spring, SpringConfig,
};

pub use state::{
    // Context
    MotionContext,
    // Timeline
    Timeline, TimerHandle,
    // Reduced motion
    EnvPreference, ManualPreference, MotionPreferenceSource, ReducedMotion, REDUCED_MOTION_ENV,
    // Pointer
    PointerAction, PointerEvent, PointerRegion, PointerResponder,
    // Blink
    get_blink_phase, subscribe_to_blink, CARET_BLINK_FPS,
};
