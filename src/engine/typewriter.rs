//! Typewriter Engine - One string typed in, optionally deleted and retyped
//!
//! A session owns its phase state, a single cancellable timer, and the
//! signals the renderer reads. Each timer firing is one call into the pure
//! [`transition`](super::phase::transition) function.
//!
//! # Lifecycle
//!
//! - `configure` creates the session in `Idle` and schedules the start after
//!   `delay`.
//! - `Typing` adds one grapheme per `type_speed`. At the end the completion
//!   callback fires (first time only); without `looping` the session is
//!   `Done`, with it the session pauses, deletes at twice the typing speed,
//!   and types the same text again.
//! - `reconfigure` cancels the pending timer and restarts from `Idle`.
//! - Dropping the session cancels its timer and releases its caret blink and
//!   reduced-motion subscriptions.
//!
//! # Reduced motion
//!
//! When the provider reports reduced motion the full text is shown on the very
//! first observable state, the caret is hidden and the completion callback
//! fires immediately. Switching it on mid-session snaps to that state;
//! switching it off restarts from `Idle` without firing the callback again.
//!
//! # Example
//!
//! ```ignore
//! let typewriter = Typewriter::configure(
//!     &ctx,
//!     TypewriterConfig::new("Hello, world"),
//!     Some(Box::new(|| println!("typed"))),
//! );
//! ctx.timeline.advance(Duration::from_millis(500));
//! println!("{}", typewriter.displayed_text());
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::config::millis;
use crate::error::MotionError;
use crate::state::animate::{get_blink_phase, subscribe_to_blink, CARET_BLINK_FPS};
use crate::state::context::MotionContext;
use crate::state::timeline::TimerHandle;

use super::graphemes::GraphemeText;
use super::phase::{transition, CycleEvent, CycleState, CycleTiming, Phase};

/// Called once, the first time the text is fully displayed.
pub type CompletionCallback = Box<dyn FnOnce()>;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration for a typewriter session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub text: String,
    /// Wait before typing starts (default: 0)
    #[serde(with = "millis")]
    pub delay: Duration,
    /// Time per typed grapheme (default: 100ms). Deleting takes half.
    #[serde(with = "millis")]
    pub type_speed: Duration,
    /// Delete and retype forever after the first type-in (default: false)
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Hold time between typing and deleting (default: 2000ms)
    #[serde(with = "millis")]
    pub pause: Duration,
    /// Render a blinking caret (default: true)
    pub show_caret: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            delay: Duration::ZERO,
            type_speed: Duration::from_millis(100),
            looping: false,
            pause: Duration::from_millis(2000),
            show_caret: true,
        }
    }
}

impl TypewriterConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if self.type_speed.is_zero() {
            return Err(MotionError::ZeroDuration {
                field: "typewriter.type_speed",
            });
        }
        Ok(())
    }

    fn timing(&self) -> CycleTiming {
        CycleTiming {
            type_speed: self.type_speed,
            pause: self.pause,
            looping: self.looping,
        }
    }
}

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterFrame {
    pub text: String,
    pub caret_visible: bool,
}

// =============================================================================
// SESSION
// =============================================================================

struct TypewriterInner {
    ctx: MotionContext,
    config: TypewriterConfig,
    text: GraphemeText,
    state: CycleState,
    has_completed_once: bool,
    on_complete: Option<CompletionCallback>,
    timer: Option<TimerHandle>,
    displayed: Signal<String>,
    caret_enabled: bool,
    unsubscribe_blink: Option<Box<dyn FnOnce()>>,
    unsubscribe_motion: Option<Box<dyn FnOnce()>>,
}

impl Drop for TypewriterInner {
    fn drop(&mut self) {
        self.timer = None;
        if let Some(unsub) = self.unsubscribe_blink.take() {
            unsub();
        }
        if let Some(unsub) = self.unsubscribe_motion.take() {
            unsub();
        }
    }
}

/// A typewriter session. Exclusively owned by the view that created it.
pub struct Typewriter {
    inner: Rc<RefCell<TypewriterInner>>,
}

impl Typewriter {
    /// Create a session and start its cycle.
    pub fn configure(
        ctx: &MotionContext,
        config: TypewriterConfig,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let inner = Rc::new(RefCell::new(TypewriterInner {
            ctx: ctx.clone(),
            text: GraphemeText::new(config.text.clone()),
            config,
            state: CycleState::idle(0),
            has_completed_once: false,
            on_complete,
            timer: None,
            displayed: signal(String::new()),
            caret_enabled: false,
            unsubscribe_blink: None,
            unsubscribe_motion: None,
        }));

        let weak = Rc::downgrade(&inner);
        let unsubscribe = ctx.reduced_motion.subscribe(move |reduced| {
            if let Some(strong) = weak.upgrade() {
                Self::apply_reduced_motion(&strong, reduced);
            }
        });
        inner.borrow_mut().unsubscribe_motion = Some(unsubscribe);

        Self::start(&inner);
        Self { inner }
    }

    /// Replace the configuration. Cancels the pending timer and restarts from
    /// `Idle`; the completion callback still fires at most once.
    pub fn reconfigure(&self, config: TypewriterConfig) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.timer = None;
            inner.text = GraphemeText::new(config.text.clone());
            inner.config = config;
        }
        Self::start(&self.inner);
    }

    /// Currently displayed prefix of the text.
    pub fn displayed_text(&self) -> String {
        self.inner.borrow().displayed.get()
    }

    /// Displayed text as a signal, for reactive hosts.
    pub fn text_signal(&self) -> Signal<String> {
        self.inner.borrow().displayed.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.borrow().state.phase
    }

    pub fn has_completed_once(&self) -> bool {
        self.inner.borrow().has_completed_once
    }

    /// Caret enabled, motion allowed, and the shared blink clock in its on phase.
    pub fn caret_visible(&self) -> bool {
        let inner = self.inner.borrow();
        inner.caret_enabled && get_blink_phase(&inner.ctx.timeline, CARET_BLINK_FPS)
    }

    pub fn frame(&self) -> TypewriterFrame {
        TypewriterFrame {
            text: self.displayed_text(),
            caret_visible: self.caret_visible(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn start(this: &Rc<RefCell<TypewriterInner>>) {
        let reduced = this.borrow().ctx.reduced_motion.current_value();
        let invalid = match this.borrow().config.validate() {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!(%err, "typewriter shows its text statically");
                true
            }
        };
        if reduced || invalid || this.borrow().text.is_empty() {
            Self::finish_static(this, !reduced && !invalid);
            return;
        }

        let (displayed, delay) = {
            let mut inner = this.borrow_mut();
            inner.timer = None;
            inner.state = CycleState::idle(inner.text.len());
            inner.caret_enabled = inner.config.show_caret;
            if inner.caret_enabled && inner.unsubscribe_blink.is_none() {
                let unsub = subscribe_to_blink(&inner.ctx.timeline, CARET_BLINK_FPS);
                inner.unsubscribe_blink = Some(unsub);
            }
            tracing::debug!(
                graphemes = inner.text.len(),
                looping = inner.config.looping,
                "typewriter session started"
            );
            (inner.displayed.clone(), inner.config.delay)
        };
        displayed.set(String::new());
        Self::schedule(this, delay, CycleEvent::Start);
    }

    /// Jump to the fully displayed terminal state. The caret stays only when
    /// the static state comes from an empty text rather than reduced motion.
    fn finish_static(this: &Rc<RefCell<TypewriterInner>>, keep_caret: bool) {
        let (displayed, full, callback) = {
            let mut inner = this.borrow_mut();
            inner.timer = None;
            inner.state = CycleState::done(inner.text.len());
            inner.caret_enabled = keep_caret && inner.config.show_caret;
            if !inner.caret_enabled {
                if let Some(unsub) = inner.unsubscribe_blink.take() {
                    unsub();
                }
            } else if inner.unsubscribe_blink.is_none() {
                let unsub = subscribe_to_blink(&inner.ctx.timeline, CARET_BLINK_FPS);
                inner.unsubscribe_blink = Some(unsub);
            }
            let callback = Self::take_completion(&mut inner);
            (
                inner.displayed.clone(),
                inner.text.as_str().to_string(),
                callback,
            )
        };
        displayed.set(full);
        if let Some(callback) = callback {
            callback();
        }
    }

    fn take_completion(inner: &mut TypewriterInner) -> Option<CompletionCallback> {
        if inner.has_completed_once {
            return None;
        }
        inner.has_completed_once = true;
        inner.on_complete.take()
    }

    fn schedule(this: &Rc<RefCell<TypewriterInner>>, after: Duration, event: CycleEvent) {
        let weak: Weak<RefCell<TypewriterInner>> = Rc::downgrade(this);
        let timeline = this.borrow().ctx.timeline.clone();
        let handle = timeline.schedule(after, move || {
            if let Some(strong) = weak.upgrade() {
                Self::on_event(&strong, event);
            }
        });
        this.borrow_mut().timer = Some(handle);
    }

    fn on_event(this: &Rc<RefCell<TypewriterInner>>, event: CycleEvent) {
        let (step, displayed, text, callback) = {
            let mut inner = this.borrow_mut();
            let before = inner.state.phase;
            let step = transition(inner.state, event, &inner.config.timing());
            inner.state = step.state;
            if before != step.state.phase {
                tracing::debug!(from = ?before, to = ?step.state.phase, "typewriter phase");
            } else {
                tracing::trace!(revealed = step.state.revealed, "typewriter tick");
            }
            let callback = if step.reached_end {
                Self::take_completion(&mut inner)
            } else {
                None
            };
            let text = inner.text.prefix(step.state.revealed).to_string();
            (step, inner.displayed.clone(), text, callback)
        };

        displayed.set(text);
        match step.next {
            Some((after, next)) => Self::schedule(this, after, next),
            None => this.borrow_mut().timer = None,
        }
        if let Some(callback) = callback {
            callback();
        }
    }

    fn apply_reduced_motion(this: &Rc<RefCell<TypewriterInner>>, reduced: bool) {
        if reduced {
            Self::finish_static(this, false);
        } else {
            Self::start(this);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::state::animate::reset_blink_registries;
    use crate::state::reduced_motion::{ManualPreference, ReducedMotion};
    use crate::state::timeline::Timeline;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup(reduced: bool) -> (MotionContext, ManualPreference) {
        reset_blink_registries();
        let pref = ManualPreference::new(reduced);
        let ctx = MotionContext::new(Timeline::new(), ReducedMotion::new(pref.clone()));
        (ctx, pref)
    }

    fn counter() -> (Rc<Cell<usize>>, CompletionCallback) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Box::new(move || c.set(c.get() + 1)))
    }

    fn config(text: &str) -> TypewriterConfig {
        TypewriterConfig {
            text: text.to_string(),
            delay: ms(300),
            type_speed: ms(100),
            ..Default::default()
        }
    }

    #[test]
    fn test_waits_for_delay_then_types_one_per_tick() {
        let (ctx, _) = setup(false);
        let tw = Typewriter::configure(&ctx, config("abc"), None);

        assert_eq!(tw.phase(), Phase::Idle);
        ctx.timeline.advance(ms(299));
        assert_eq!(tw.phase(), Phase::Idle);
        ctx.timeline.advance(ms(1));
        assert_eq!(tw.phase(), Phase::Typing);
        assert_eq!(tw.displayed_text(), "");

        let mut seen = Vec::new();
        for _ in 0..3 {
            ctx.timeline.advance(ms(100));
            seen.push(tw.displayed_text());
        }
        assert_eq!(seen, vec!["a", "ab", "abc"]);
        assert_eq!(tw.phase(), Phase::Done);
    }

    #[test]
    fn test_length_never_shrinks_while_typing() {
        let (ctx, _) = setup(false);
        let tw = Typewriter::configure(&ctx, config("monotonic"), None);

        let mut last = 0;
        for _ in 0..200 {
            ctx.timeline.advance(ms(10));
            let len = tw.displayed_text().len();
            assert!(len >= last);
            assert!(len - last <= 1);
            last = len;
        }
        assert_eq!(tw.displayed_text(), "monotonic");
    }

    #[test]
    fn test_completion_fires_once_without_loop() {
        let (ctx, _) = setup(false);
        let (count, callback) = counter();
        let tw = Typewriter::configure(&ctx, config("hi"), Some(callback));

        ctx.timeline.advance(ms(10_000));
        assert_eq!(count.get(), 1);
        assert!(tw.has_completed_once());
        assert_eq!(tw.phase(), Phase::Done);
    }

    #[test]
    fn test_completion_fires_once_across_loops() {
        let (ctx, _) = setup(false);
        let (count, callback) = counter();
        let cfg = TypewriterConfig {
            looping: true,
            ..config("loop")
        };
        let tw = Typewriter::configure(&ctx, cfg, Some(callback));

        let mut saw_deleting = 0;
        for _ in 0..3_000 {
            ctx.timeline.advance(ms(10));
            if tw.phase() == Phase::Deleting {
                saw_deleting += 1;
            }
        }
        assert!(saw_deleting > 0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_deletes_at_half_the_typing_period() {
        let (ctx, _) = setup(false);
        let cfg = TypewriterConfig {
            looping: true,
            delay: Duration::ZERO,
            pause: ms(1000),
            ..config("abcd")
        };
        let tw = Typewriter::configure(&ctx, cfg, None);

        ctx.timeline.advance(ms(400));
        assert_eq!(tw.displayed_text(), "abcd");
        assert_eq!(tw.phase(), Phase::PausedAfterType);

        ctx.timeline.advance(ms(1000));
        assert_eq!(tw.phase(), Phase::Deleting);
        assert_eq!(tw.displayed_text(), "abcd");

        ctx.timeline.advance(ms(49));
        assert_eq!(tw.displayed_text(), "abcd");
        ctx.timeline.advance(ms(1));
        assert_eq!(tw.displayed_text(), "abc");
        ctx.timeline.advance(ms(50));
        assert_eq!(tw.displayed_text(), "ab");

        // Emptied, then the same text is typed again at full period.
        ctx.timeline.advance(ms(100));
        assert_eq!(tw.displayed_text(), "");
        assert_eq!(tw.phase(), Phase::Typing);
        ctx.timeline.advance(ms(100));
        assert_eq!(tw.displayed_text(), "a");
    }

    #[test]
    fn test_reduced_motion_first_state_is_full_text() {
        let (ctx, _) = setup(true);
        let (count, callback) = counter();
        let tw = Typewriter::configure(&ctx, config("static"), Some(callback));

        assert_eq!(tw.displayed_text(), "static");
        assert_eq!(tw.phase(), Phase::Done);
        assert!(!tw.caret_visible());
        assert_eq!(count.get(), 1);
        assert_eq!(ctx.timeline.pending_count(), 0);
    }

    #[test]
    fn test_empty_text_is_done_without_ticks() {
        let (ctx, _) = setup(false);
        let (count, callback) = counter();
        let cfg = TypewriterConfig {
            show_caret: false,
            ..config("")
        };
        let tw = Typewriter::configure(&ctx, cfg, Some(callback));

        assert_eq!(tw.phase(), Phase::Done);
        assert_eq!(tw.displayed_text(), "");
        assert_eq!(count.get(), 1);
        assert_eq!(ctx.timeline.pending_count(), 0);
    }

    #[test]
    fn test_drop_cancels_all_timers() {
        let (ctx, _) = setup(false);
        let tw = Typewriter::configure(&ctx, config("gone"), None);
        assert!(ctx.timeline.pending_count() >= 2); // start + caret blink

        drop(tw);
        assert_eq!(ctx.timeline.pending_count(), 0);
        ctx.timeline.advance(ms(10_000));
    }

    #[test]
    fn test_reconfigure_restarts_from_idle() {
        let (ctx, _) = setup(false);
        let tw = Typewriter::configure(&ctx, config("first"), None);
        ctx.timeline.advance(ms(500));
        assert_eq!(tw.displayed_text(), "fi");

        tw.reconfigure(config("second"));
        assert_eq!(tw.phase(), Phase::Idle);
        assert_eq!(tw.displayed_text(), "");

        ctx.timeline.advance(ms(300 + 100));
        assert_eq!(tw.displayed_text(), "s");
    }

    #[test]
    fn test_reduced_motion_toggle_mid_session() {
        let (ctx, pref) = setup(false);
        let (count, callback) = counter();
        let cfg = TypewriterConfig {
            looping: true,
            ..config("toggle")
        };
        let tw = Typewriter::configure(&ctx, cfg, Some(callback));
        ctx.timeline.advance(ms(500));
        assert_eq!(tw.displayed_text(), "to");

        pref.set(true);
        assert_eq!(tw.displayed_text(), "toggle");
        assert_eq!(tw.phase(), Phase::Done);
        assert_eq!(count.get(), 1);

        pref.set(false);
        assert_eq!(tw.phase(), Phase::Idle);
        ctx.timeline.advance(ms(10_000));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_caret_blinks() {
        let (ctx, _) = setup(false);
        let tw = Typewriter::configure(&ctx, config("caret"), None);

        assert!(tw.caret_visible());
        ctx.timeline.advance(ms(500));
        assert!(!tw.caret_visible());
        ctx.timeline.advance(ms(500));
        assert!(tw.frame().caret_visible);
    }

    #[test]
    fn test_zero_type_speed_shows_text_statically() {
        let (ctx, _) = setup(false);
        let cfg = TypewriterConfig {
            type_speed: Duration::ZERO,
            ..config("fast")
        };
        let tw = Typewriter::configure(&ctx, cfg, None);
        assert_eq!(tw.displayed_text(), "fast");
        assert_eq!(tw.phase(), Phase::Done);
    }
}
