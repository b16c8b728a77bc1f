//! Blink Animation System - Shared clocks per FPS
//!
//! Provides caret blink animation using shared timers.
//! All carets blinking at the same FPS on the same timeline share a single
//! repeating timer, so they stay visually in sync.
//!
//! # Pattern
//!
//! - Multiple carets blinking at 1 FPS share one timer
//! - Timer starts with the first subscriber, stops with the last
//! - Phase signal toggles true/false for blink visibility
//!
//! # Example
//!
//! ```ignore
//! use spark_motion::state::animate::{subscribe_to_blink, get_blink_phase, CARET_BLINK_FPS};
//!
//! let unsubscribe = subscribe_to_blink(&timeline, CARET_BLINK_FPS);
//! let visible = get_blink_phase(&timeline, CARET_BLINK_FPS);
//! unsubscribe();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use spark_signals::{signal, Signal};

use super::timeline::{Timeline, TimerHandle};

/// Caret blink rate: one full on/off cycle per second, 500ms per half-period.
pub const CARET_BLINK_FPS: u8 = 1;

// =============================================================================
// BLINK REGISTRY
// =============================================================================

/// Per-(timeline, FPS) registry containing shared timer state
struct BlinkRegistry {
    /// Phase signal, true = visible
    phase: Signal<bool>,
    /// Repeating toggle timer (cancelled on drop)
    timer: TimerHandle,
    /// Number of active subscribers
    subscribers: usize,
}

type BlinkKey = (u64, u8);

thread_local! {
    static BLINK_REGISTRIES: RefCell<HashMap<BlinkKey, BlinkRegistry>> = RefCell::new(HashMap::new());
}

/// Toggle interval: half of one on/off cycle.
/// 1 FPS = 1000/1/2 = 500ms per toggle.
pub fn blink_half_period(fps: u8) -> Duration {
    Duration::from_millis(1000 / fps.max(1) as u64 / 2)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to blink animation at the given FPS on `timeline`.
///
/// Returns an unsubscribe function that must be called when done.
/// If `fps` is 0, returns a no-op unsubscribe (blink disabled).
pub fn subscribe_to_blink(timeline: &Timeline, fps: u8) -> Box<dyn FnOnce()> {
    if fps == 0 {
        return Box::new(|| {});
    }

    let key = (timeline.id(), fps);

    BLINK_REGISTRIES.with(|registries| {
        let mut registries = registries.borrow_mut();

        if let Some(registry) = registries.get_mut(&key) {
            registry.subscribers += 1;
            return;
        }

        let phase = signal(true);
        let toggled = phase.clone();
        let timer = timeline.schedule_repeating(blink_half_period(fps), move || {
            toggled.set(!toggled.get());
        });
        registries.insert(
            key,
            BlinkRegistry {
                phase,
                timer,
                subscribers: 1,
            },
        );
        tracing::trace!(fps, timeline = key.0, "blink clock started");
    });

    Box::new(move || {
        // Remove under the borrow, drop (and so cancel) outside it.
        let stopped = BLINK_REGISTRIES.with(|registries| {
            let mut registries = registries.borrow_mut();
            let registry = registries.get_mut(&key)?;
            registry.subscribers = registry.subscribers.saturating_sub(1);
            if registry.subscribers == 0 {
                registries.remove(&key)
            } else {
                None
            }
        });
        if let Some(registry) = stopped {
            registry.phase.set(true);
            drop(registry.timer);
            tracing::trace!(fps = key.1, timeline = key.0, "blink clock stopped");
        }
    })
}

/// Current blink phase for the given FPS: true = visible.
///
/// Returns true if no clock is running.
pub fn get_blink_phase(timeline: &Timeline, fps: u8) -> bool {
    let key = (timeline.id(), fps);
    BLINK_REGISTRIES.with(|registries| {
        registries
            .borrow()
            .get(&key)
            .map(|r| r.phase.get())
            .unwrap_or(true)
    })
}

/// Phase signal for reactive tracking, if a clock is running.
pub fn get_blink_phase_signal(timeline: &Timeline, fps: u8) -> Option<Signal<bool>> {
    let key = (timeline.id(), fps);
    BLINK_REGISTRIES.with(|registries| registries.borrow().get(&key).map(|r| r.phase.clone()))
}

/// True if a clock with subscribers is running.
pub fn is_blink_running(timeline: &Timeline, fps: u8) -> bool {
    let key = (timeline.id(), fps);
    BLINK_REGISTRIES.with(|registries| {
        registries
            .borrow()
            .get(&key)
            .map(|r| r.subscribers > 0 && r.timer.is_active())
            .unwrap_or(false)
    })
}

/// Number of subscribers for a given FPS (0 if no clock).
pub fn get_subscriber_count(timeline: &Timeline, fps: u8) -> usize {
    let key = (timeline.id(), fps);
    BLINK_REGISTRIES.with(|registries| {
        registries
            .borrow()
            .get(&key)
            .map(|r| r.subscribers)
            .unwrap_or(0)
    })
}

/// Reset all blink registries (for testing).
///
/// Stops all timers and clears all registries.
pub fn reset_blink_registries() {
    let drained: Vec<BlinkRegistry> = BLINK_REGISTRIES.with(|registries| {
        registries.borrow_mut().drain().map(|(_, r)| r).collect()
    });
    drop(drained);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Timeline {
        reset_blink_registries();
        Timeline::new()
    }

    #[test]
    fn test_subscribe_returns_unsubscribe() {
        let timeline = setup();

        let unsubscribe = subscribe_to_blink(&timeline, 2);
        assert_eq!(get_subscriber_count(&timeline, 2), 1);

        unsubscribe();
        assert_eq!(get_subscriber_count(&timeline, 2), 0);
    }

    #[test]
    fn test_shared_clock_same_fps() {
        let timeline = setup();

        let unsub1 = subscribe_to_blink(&timeline, CARET_BLINK_FPS);
        let unsub2 = subscribe_to_blink(&timeline, CARET_BLINK_FPS);
        assert_eq!(get_subscriber_count(&timeline, CARET_BLINK_FPS), 2);
        assert_eq!(timeline.pending_count(), 1);

        unsub1();
        assert!(is_blink_running(&timeline, CARET_BLINK_FPS));

        unsub2();
        assert!(!is_blink_running(&timeline, CARET_BLINK_FPS));
        assert_eq!(timeline.pending_count(), 0);
    }

    #[test]
    fn test_different_timelines_separate_clocks() {
        let a = setup();
        let b = Timeline::new();

        let _ua = subscribe_to_blink(&a, CARET_BLINK_FPS);
        let _ub = subscribe_to_blink(&b, CARET_BLINK_FPS);

        a.advance(Duration::from_millis(500));
        assert!(!get_blink_phase(&a, CARET_BLINK_FPS));
        assert!(get_blink_phase(&b, CARET_BLINK_FPS));
    }

    #[test]
    fn test_phase_toggles_every_half_period() {
        let timeline = setup();
        let _unsub = subscribe_to_blink(&timeline, CARET_BLINK_FPS);

        assert!(get_blink_phase(&timeline, CARET_BLINK_FPS));
        timeline.advance(Duration::from_millis(499));
        assert!(get_blink_phase(&timeline, CARET_BLINK_FPS));
        timeline.advance(Duration::from_millis(1));
        assert!(!get_blink_phase(&timeline, CARET_BLINK_FPS));
        timeline.advance(Duration::from_millis(500));
        assert!(get_blink_phase(&timeline, CARET_BLINK_FPS));
    }

    #[test]
    fn test_unsubscribe_resets_phase_signal() {
        let timeline = setup();
        let unsub = subscribe_to_blink(&timeline, CARET_BLINK_FPS);
        let phase = get_blink_phase_signal(&timeline, CARET_BLINK_FPS).unwrap();

        timeline.advance(Duration::from_millis(500));
        assert!(!phase.get());

        unsub();
        assert!(phase.get());
        assert!(get_blink_phase(&timeline, CARET_BLINK_FPS));
    }

    #[test]
    fn test_resubscribe_restarts_timer() {
        let timeline = setup();

        let unsub1 = subscribe_to_blink(&timeline, 2);
        assert!(is_blink_running(&timeline, 2));
        unsub1();
        assert!(!is_blink_running(&timeline, 2));

        let _unsub2 = subscribe_to_blink(&timeline, 2);
        assert!(is_blink_running(&timeline, 2));
    }

    #[test]
    fn test_zero_fps_noop() {
        let timeline = setup();

        let unsub = subscribe_to_blink(&timeline, 0);
        assert_eq!(timeline.pending_count(), 0);
        assert!(get_blink_phase(&timeline, 0));
        unsub();
    }

    #[test]
    fn test_half_period() {
        assert_eq!(blink_half_period(1), Duration::from_millis(500));
        assert_eq!(blink_half_period(2), Duration::from_millis(250));
    }
}
