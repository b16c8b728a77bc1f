//! Glitch Text - Scramble-then-resolve text effect
//!
//! While glitching, a repeating timer redraws the text every `speed`. Graphemes
//! before the reveal cursor show the real text, spaces stay spaces, and the
//! rest show a random glyph. The cursor advances a third of a grapheme per
//! tick. Once it passes the end, continuous mode starts over and otherwise
//! the timer stops with the real text shown.
//!
//! Hover drives it through [`PointerResponder`]: entering starts the effect
//! when `on_hover` is set, leaving stops it unless `continuous`. Under reduced
//! motion the real text is always shown.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::config::millis;
use crate::state::context::MotionContext;
use crate::state::pointer::PointerResponder;
use crate::state::timeline::TimerHandle;
use crate::types::Bounds;

use super::graphemes::GraphemeText;

/// Glyphs drawn in place of unrevealed characters.
pub const GLITCH_GLYPHS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '-', '=', '[', ']', '{', '}', '|',
    ';', ':', ',', '.', '<', '>', '?', '/', '~', '`',
];

/// Reveal cursor steps per grapheme.
const STEPS_PER_GRAPHEME: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub text: String,
    /// Start on hover enter, stop on hover leave (default: true)
    pub on_hover: bool,
    /// Loop forever, starting at configure (default: false)
    pub continuous: bool,
    /// Redraw period (default: 50ms)
    #[serde(with = "millis")]
    pub speed: Duration,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            on_hover: true,
            continuous: false,
            speed: Duration::from_millis(50),
        }
    }
}

impl GlitchConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

struct GlitchInner {
    ctx: MotionContext,
    config: GlitchConfig,
    text: GraphemeText,
    rng: StdRng,
    /// Reveal cursor in thirds of a grapheme.
    steps: usize,
    timer: Option<TimerHandle>,
    displayed: Signal<String>,
    unsubscribe_motion: Option<Box<dyn FnOnce()>>,
}

impl Drop for GlitchInner {
    fn drop(&mut self) {
        self.timer = None;
        if let Some(unsub) = self.unsubscribe_motion.take() {
            unsub();
        }
    }
}

impl GlitchInner {
    fn scramble(&mut self) -> String {
        let revealed = self.steps;
        let mut out = String::with_capacity(self.text.as_str().len());
        let graphemes: Vec<String> = self.text.graphemes().map(str::to_string).collect();
        for (index, g) in graphemes.iter().enumerate() {
            if index * STEPS_PER_GRAPHEME < revealed {
                out.push_str(g);
            } else if g == " " {
                out.push(' ');
            } else {
                out.push(GLITCH_GLYPHS[self.rng.gen_range(0..GLITCH_GLYPHS.len())]);
            }
        }
        out
    }
}

pub struct GlitchText {
    inner: Rc<RefCell<GlitchInner>>,
}

impl GlitchText {
    pub fn configure(ctx: &MotionContext, config: GlitchConfig) -> Self {
        Self::with_rng(ctx, config, StdRng::from_entropy())
    }

    /// Same as `configure`, with a caller-supplied random source.
    pub fn with_rng(ctx: &MotionContext, config: GlitchConfig, rng: StdRng) -> Self {
        let text = GraphemeText::new(config.text.clone());
        let continuous = config.continuous;
        let inner = Rc::new(RefCell::new(GlitchInner {
            ctx: ctx.clone(),
            displayed: signal(text.as_str().to_string()),
            text,
            config,
            rng,
            steps: 0,
            timer: None,
            unsubscribe_motion: None,
        }));

        let weak = Rc::downgrade(&inner);
        let unsubscribe = ctx.reduced_motion.subscribe(move |reduced| {
            let Some(strong) = weak.upgrade() else {
                return;
            };
            if reduced {
                Self::resolve(&strong);
            } else if continuous {
                Self::begin(&strong);
            }
        });
        inner.borrow_mut().unsubscribe_motion = Some(unsubscribe);

        if continuous {
            Self::begin(&inner);
        }
        Self { inner }
    }

    pub fn displayed_text(&self) -> String {
        self.inner.borrow().displayed.get()
    }

    pub fn text_signal(&self) -> Signal<String> {
        self.inner.borrow().displayed.clone()
    }

    pub fn is_glitching(&self) -> bool {
        self.inner.borrow().timer.is_some()
    }

    /// Begin a scramble pass. No-op under reduced motion or while running.
    pub fn start(&self) {
        Self::begin(&self.inner);
    }

    /// Stop and show the real text.
    pub fn stop(&self) {
        Self::resolve(&self.inner);
    }

    fn begin(this: &Rc<RefCell<GlitchInner>>) {
        let (timeline, speed) = {
            let mut inner = this.borrow_mut();
            if inner.timer.is_some() || inner.ctx.is_reduced() || inner.text.is_empty() {
                return;
            }
            inner.steps = 0;
            (inner.ctx.timeline.clone(), inner.config.speed)
        };
        tracing::debug!("glitch started");

        let weak = Rc::downgrade(this);
        let handle = timeline.schedule_repeating(speed, move || {
            if let Some(strong) = weak.upgrade() {
                Self::tick(&strong);
            }
        });
        this.borrow_mut().timer = Some(handle);
    }

    fn resolve(this: &Rc<RefCell<GlitchInner>>) {
        let (handle, displayed, text) = {
            let mut inner = this.borrow_mut();
            (
                inner.timer.take(),
                inner.displayed.clone(),
                inner.text.as_str().to_string(),
            )
        };
        drop(handle);
        displayed.set(text);
    }

    fn tick(this: &Rc<RefCell<GlitchInner>>) {
        if this.borrow().ctx.is_reduced() {
            Self::resolve(this);
            return;
        }
        let (frame, finished, displayed) = {
            let mut inner = this.borrow_mut();
            let frame = inner.scramble();
            let end = inner.text.len() * STEPS_PER_GRAPHEME;
            let mut finished = false;
            if inner.steps >= end {
                if inner.config.continuous {
                    inner.steps = 0;
                } else {
                    finished = true;
                }
            }
            inner.steps += 1;
            (frame, finished, inner.displayed.clone())
        };

        if finished {
            let (handle, text) = {
                let mut inner = this.borrow_mut();
                (inner.timer.take(), inner.text.as_str().to_string())
            };
            drop(handle);
            displayed.set(text);
            tracing::debug!("glitch resolved");
        } else {
            displayed.set(frame);
        }
    }
}

impl PointerResponder for GlitchText {
    fn on_pointer_move(&mut self, _bounds: Bounds, _x: f32, _y: f32) {
        if self.inner.borrow().config.on_hover {
            self.start();
        }
    }

    fn on_pointer_leave(&mut self) {
        let (on_hover, continuous) = {
            let inner = self.inner.borrow();
            (inner.config.on_hover, inner.config.continuous)
        };
        if on_hover && !continuous {
            self.stop();
        }
    }

    fn advance(&mut self, _dt: Duration) {}

    fn is_settled(&self) -> bool {
        !self.is_glitching()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pointer::{PointerEvent, PointerRegion};
    use crate::state::reduced_motion::{ManualPreference, ReducedMotion};
    use crate::state::timeline::Timeline;

    const SPEED: Duration = Duration::from_millis(50);

    fn setup(reduced: bool) -> MotionContext {
        MotionContext::new(Timeline::new(), ReducedMotion::fixed(reduced))
    }

    fn glitch(ctx: &MotionContext, config: GlitchConfig) -> GlitchText {
        GlitchText::with_rng(ctx, config, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_shows_real_text_at_rest() {
        let ctx = setup(false);
        let g = glitch(&ctx, GlitchConfig::new("hello"));
        assert_eq!(g.displayed_text(), "hello");
        assert!(!g.is_glitching());
        assert_eq!(ctx.timeline.pending_count(), 0);
    }

    #[test]
    fn test_scrambles_then_resolves() {
        let ctx = setup(false);
        let g = glitch(&ctx, GlitchConfig::new("ab c"));
        g.start();

        ctx.timeline.advance(SPEED);
        let first = g.displayed_text();
        assert_eq!(first.chars().count(), 4);
        assert_eq!(first.chars().nth(2), Some(' '));
        assert!(first
            .chars()
            .enumerate()
            .filter(|(i, _)| *i != 2)
            .all(|(_, c)| GLITCH_GLYPHS.contains(&c)));

        // 4 graphemes * 3 steps, plus the tick that notices the end.
        ctx.timeline.advance(SPEED * 13);
        assert_eq!(g.displayed_text(), "ab c");
        assert!(!g.is_glitching());
        assert_eq!(ctx.timeline.pending_count(), 0);
    }

    #[test]
    fn test_reveal_cursor_moves_a_third_per_tick() {
        let ctx = setup(false);
        let g = glitch(&ctx, GlitchConfig::new("xyz"));
        g.start();

        // Tick n draws with the cursor at n - 1 thirds.
        ctx.timeline.advance(SPEED * 2);
        assert!(g.displayed_text().starts_with('x'));
        ctx.timeline.advance(SPEED * 3);
        assert!(g.displayed_text().starts_with("xy"));
    }

    #[test]
    fn test_continuous_keeps_running() {
        let ctx = setup(false);
        let config = GlitchConfig {
            continuous: true,
            ..GlitchConfig::new("ab")
        };
        let mut g = glitch(&ctx, config);
        assert!(g.is_glitching());

        ctx.timeline.advance(SPEED * 40);
        assert!(g.is_glitching());

        PointerResponder::on_pointer_leave(&mut g);
        assert!(g.is_glitching());
    }

    #[test]
    fn test_hover_starts_and_leave_stops() {
        let ctx = setup(false);
        let mut g = glitch(&ctx, GlitchConfig::new("hover me"));
        let mut region = PointerRegion::new(Bounds::new(0.0, 0.0, 8.0, 1.0));

        region.dispatch(&mut g, PointerEvent::move_to(2.0, 0.5));
        assert!(g.is_glitching());
        ctx.timeline.advance(SPEED);
        assert_ne!(g.displayed_text(), "hover me");

        region.dispatch(&mut g, PointerEvent::leave());
        assert!(!g.is_glitching());
        assert_eq!(g.displayed_text(), "hover me");
    }

    #[test]
    fn test_hover_disabled() {
        let ctx = setup(false);
        let config = GlitchConfig {
            on_hover: false,
            ..GlitchConfig::new("still")
        };
        let mut g = glitch(&ctx, config);
        PointerResponder::on_pointer_move(&mut g, Bounds::default(), 0.0, 0.0);
        assert!(!g.is_glitching());
    }

    #[test]
    fn test_reduced_motion_never_scrambles() {
        let ctx = setup(true);
        let config = GlitchConfig {
            continuous: true,
            ..GlitchConfig::new("calm")
        };
        let g = glitch(&ctx, config);
        g.start();
        ctx.timeline.advance(SPEED * 10);
        assert_eq!(g.displayed_text(), "calm");
        assert!(!g.is_glitching());
    }

    #[test]
    fn test_reduced_motion_mid_pass_resolves_at_once() {
        let preference = ManualPreference::new(false);
        let ctx = MotionContext::new(Timeline::new(), ReducedMotion::new(preference.clone()));
        let g = glitch(&ctx, GlitchConfig::new("settle down"));
        g.start();
        ctx.timeline.advance(SPEED);
        assert_ne!(g.displayed_text(), "settle down");

        preference.set(true);
        assert_eq!(g.displayed_text(), "settle down");
        assert!(!g.is_glitching());
        assert_eq!(ctx.timeline.pending_count(), 0);

        ctx.timeline.advance(SPEED * 10);
        assert_eq!(g.displayed_text(), "settle down");
    }

    #[test]
    fn test_continuous_resumes_when_motion_allowed() {
        let preference = ManualPreference::new(true);
        let ctx = MotionContext::new(Timeline::new(), ReducedMotion::new(preference.clone()));
        let config = GlitchConfig {
            continuous: true,
            ..GlitchConfig::new("loop")
        };
        let g = glitch(&ctx, config);
        assert!(!g.is_glitching());

        preference.set(false);
        assert!(g.is_glitching());
    }

    #[test]
    fn test_drop_cancels_timer() {
        let ctx = setup(false);
        let g = glitch(&ctx, GlitchConfig::new("bye"));
        g.start();
        assert_eq!(ctx.timeline.pending_count(), 1);
        drop(g);
        assert_eq!(ctx.timeline.pending_count(), 0);
    }
}
