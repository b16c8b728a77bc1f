//! State Module - Runtime state systems
//!
//! The collaborators the engines run on:
//!
//! - **Timeline** - Cooperative timer queue with cancel-on-drop handles
//! - **Reduced motion** - Platform preference provider, single listener
//! - **Animate** - Shared caret blink clocks
//! - **Pointer** - Pointer events, hover regions, responder trait
//! - **Context** - Timeline + reduced-motion bundle handed to engines

pub mod animate;
pub mod context;
pub mod pointer;
pub mod reduced_motion;
pub mod timeline;

pub use animate::{
    get_blink_phase, get_blink_phase_signal, get_subscriber_count, is_blink_running,
    reset_blink_registries, subscribe_to_blink, CARET_BLINK_FPS,
};
pub use context::MotionContext;
pub use pointer::{PointerAction, PointerEvent, PointerRegion, PointerResponder};
pub use reduced_motion::{
    EnvPreference, ManualPreference, MotionPreferenceSource, ReducedMotion, REDUCED_MOTION_ENV,
};
pub use timeline::{Timeline, TimerHandle};
