//! Rolling Text Engine - Type, pause, delete, advance through a list
//!
//! Generalizes the typewriter to an ordered list of [`RoleItem`]s. Uses the
//! same phase machine with looping always on; when deleting empties the text,
//! the session moves to `(index + 1) % len` instead of retyping.
//!
//! The session is invisible until `delay` has elapsed. The caret blinks on the
//! shared clock whenever the session is visible and motion is allowed.
//!
//! Under reduced motion the first item is shown in full at once. With
//! `cycle_when_reduced` the full text is swapped for the next item every
//! `pause + 1000ms`, with no caret and no per-character animation.
//!
//! An empty item list is refused: the session stays `Idle` and invisible and
//! schedules nothing.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::config::millis;
use crate::error::MotionError;
use crate::state::animate::{get_blink_phase, subscribe_to_blink, CARET_BLINK_FPS};
use crate::state::context::MotionContext;
use crate::state::timeline::TimerHandle;
use crate::types::{IconToken, RoleItem};

use super::graphemes::GraphemeText;
use super::phase::{transition, CycleEvent, CycleState, CycleTiming, Phase};

/// Extra hold added to `pause` between swaps under reduced motion.
pub const REDUCED_CYCLE_EXTRA: Duration = Duration::from_millis(1000);

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    pub items: Vec<RoleItem>,
    #[serde(with = "millis")]
    pub delay: Duration,
    /// Time per typed grapheme (default: 80ms). Deleting takes half.
    #[serde(with = "millis")]
    pub type_speed: Duration,
    #[serde(with = "millis")]
    pub pause: Duration,
    /// Keep swapping items under reduced motion (default: true)
    pub cycle_when_reduced: bool,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            delay: Duration::ZERO,
            type_speed: Duration::from_millis(80),
            pause: Duration::from_millis(2000),
            cycle_when_reduced: true,
        }
    }
}

impl RollingConfig {
    pub fn new<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RoleItem>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if self.items.is_empty() {
            return Err(MotionError::EmptyItems);
        }
        if self.type_speed.is_zero() {
            return Err(MotionError::ZeroDuration {
                field: "rolling.type_speed",
            });
        }
        Ok(())
    }

    fn timing(&self) -> CycleTiming {
        CycleTiming {
            type_speed: self.type_speed,
            pause: self.pause,
            looping: true,
        }
    }
}

/// Snapshot handed to the renderer. Nothing is drawn while `visible` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingFrame {
    pub visible: bool,
    /// Drawn before the text when present.
    pub icon: Option<IconToken>,
    pub text: String,
    pub caret_visible: bool,
}

// =============================================================================
// SESSION
// =============================================================================

struct RollingInner {
    ctx: MotionContext,
    config: RollingConfig,
    texts: Vec<GraphemeText>,
    index: usize,
    state: CycleState,
    timer: Option<TimerHandle>,
    visible: Signal<bool>,
    displayed: Signal<String>,
    current_index: Signal<usize>,
    caret_enabled: bool,
    unsubscribe_blink: Option<Box<dyn FnOnce()>>,
    unsubscribe_motion: Option<Box<dyn FnOnce()>>,
}

impl RollingInner {
    fn current_total(&self) -> usize {
        self.texts.get(self.index).map_or(0, GraphemeText::len)
    }

    fn current_prefix(&self, count: usize) -> String {
        self.texts
            .get(self.index)
            .map_or_else(String::new, |t| t.prefix(count).to_string())
    }

    fn set_caret(&mut self, enabled: bool) {
        self.caret_enabled = enabled;
        if enabled && self.unsubscribe_blink.is_none() {
            self.unsubscribe_blink = Some(subscribe_to_blink(&self.ctx.timeline, CARET_BLINK_FPS));
        } else if !enabled {
            if let Some(unsub) = self.unsubscribe_blink.take() {
                unsub();
            }
        }
    }
}

impl Drop for RollingInner {
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

/// A rolling-text session.
pub struct RollingText {
    inner: Rc<RefCell<RollingInner>>,
}

impl RollingText {
    pub fn configure(ctx: &MotionContext, config: RollingConfig) -> Self {
        let inner = Rc::new(RefCell::new(RollingInner {
            ctx: ctx.clone(),
            texts: Vec::new(),
            config,
            index: 0,
            state: CycleState::idle(0),
            timer: None,
            visible: signal(false),
            displayed: signal(String::new()),
            current_index: signal(0),
            caret_enabled: false,
            unsubscribe_blink: None,
            unsubscribe_motion: None,
        }));

        let weak = Rc::downgrade(&inner);
        let unsubscribe = ctx.reduced_motion.subscribe(move |_| {
            if let Some(strong) = weak.upgrade() {
                Self::start(&strong);
            }
        });
        inner.borrow_mut().unsubscribe_motion = Some(unsubscribe);

        Self::start(&inner);
        Self { inner }
    }

    /// Replace the item list and timing. Restarts from the first item.
    pub fn reconfigure(&self, config: RollingConfig) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.timer = None;
            inner.config = config;
        }
        Self::start(&self.inner);
    }

    pub fn current_index(&self) -> usize {
        self.inner.borrow().index
    }

    pub fn index_signal(&self) -> Signal<usize> {
        self.inner.borrow().current_index.clone()
    }

    pub fn displayed_text(&self) -> String {
        self.inner.borrow().displayed.get()
    }

    pub fn text_signal(&self) -> Signal<String> {
        self.inner.borrow().displayed.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible.get()
    }

    pub fn phase(&self) -> Phase {
        self.inner.borrow().state.phase
    }

    pub fn current_item(&self) -> Option<RoleItem> {
        let inner = self.inner.borrow();
        inner.config.items.get(inner.index).cloned()
    }

    pub fn caret_visible(&self) -> bool {
        let inner = self.inner.borrow();
        inner.caret_enabled
            && inner.visible.get()
            && get_blink_phase(&inner.ctx.timeline, CARET_BLINK_FPS)
    }

    pub fn frame(&self) -> RollingFrame {
        let visible = self.is_visible();
        RollingFrame {
            visible,
            icon: self.current_item().and_then(|item| item.icon),
            text: self.displayed_text(),
            caret_visible: self.caret_visible(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// (Re)start from the first item, honouring the current motion preference.
    fn start(this: &Rc<RefCell<RollingInner>>) {
        let reduced = this.borrow().ctx.reduced_motion.current_value();

        let signals = {
            let mut inner = this.borrow_mut();
            inner.timer = None;
            inner.index = 0;
            inner.texts = inner
                .config
                .items
                .iter()
                .map(|item| GraphemeText::new(item.text.clone()))
                .collect();
            (
                inner.visible.clone(),
                inner.displayed.clone(),
                inner.current_index.clone(),
            )
        };
        let (visible, displayed, current_index) = signals;
        current_index.set(0);

        let validation = this.borrow().config.validate();
        if let Err(err) = validation {
            tracing::warn!(%err, "rolling text refused to start");
            {
                let mut inner = this.borrow_mut();
                inner.state = CycleState::idle(0);
                inner.set_caret(false);
            }
            visible.set(false);
            displayed.set(String::new());
            return;
        }

        if reduced {
            let (first, cycle) = {
                let mut inner = this.borrow_mut();
                inner.set_caret(false);
                let total = inner.current_total();
                inner.state = CycleState::done(total);
                (
                    inner.current_prefix(total),
                    inner.config.cycle_when_reduced,
                )
            };
            visible.set(true);
            displayed.set(first);
            if cycle {
                Self::schedule_reduced_cycle(this);
            }
            tracing::debug!("rolling text shown statically");
            return;
        }

        let delay = {
            let mut inner = this.borrow_mut();
            let total = inner.current_total();
            inner.state = CycleState::idle(total);
            inner.set_caret(false);
            tracing::debug!(items = inner.texts.len(), "rolling text session started");
            inner.config.delay
        };
        visible.set(false);
        displayed.set(String::new());
        Self::schedule(this, delay, CycleEvent::Start);
    }

    fn schedule(this: &Rc<RefCell<RollingInner>>, after: Duration, event: CycleEvent) {
        let weak = Rc::downgrade(this);
        let timeline = this.borrow().ctx.timeline.clone();
        let handle = timeline.schedule(after, move || {
            if let Some(strong) = weak.upgrade() {
                Self::on_event(&strong, event);
            }
        });
        this.borrow_mut().timer = Some(handle);
    }

    fn schedule_reduced_cycle(this: &Rc<RefCell<RollingInner>>) {
        let weak = Rc::downgrade(this);
        let (timeline, period) = {
            let inner = this.borrow();
            (
                inner.ctx.timeline.clone(),
                inner.config.pause + REDUCED_CYCLE_EXTRA,
            )
        };
        let handle = timeline.schedule_repeating(period, move || {
            if let Some(strong) = weak.upgrade() {
                Self::swap_reduced(&strong);
            }
        });
        this.borrow_mut().timer = Some(handle);
    }

    fn swap_reduced(this: &Rc<RefCell<RollingInner>>) {
        let (displayed, current_index, index, text) = {
            let mut inner = this.borrow_mut();
            inner.index = (inner.index + 1) % inner.texts.len().max(1);
            let total = inner.current_total();
            inner.state = CycleState::done(total);
            (
                inner.displayed.clone(),
                inner.current_index.clone(),
                inner.index,
                inner.current_prefix(total),
            )
        };
        tracing::trace!(index, "rolling text swapped");
        current_index.set(index);
        displayed.set(text);
    }

    fn on_event(this: &Rc<RefCell<RollingInner>>, event: CycleEvent) {
        let (step, text, index, became_visible, signals) = {
            let mut inner = this.borrow_mut();
            let before = inner.state.phase;
            let mut step = transition(inner.state, event, &inner.config.timing());
            if step.wrapped {
                inner.index = (inner.index + 1) % inner.texts.len().max(1);
                step.state.total = inner.current_total();
                tracing::debug!(index = inner.index, "rolling text advanced");
            }
            if before != step.state.phase {
                tracing::debug!(from = ?before, to = ?step.state.phase, "rolling text phase");
            } else {
                tracing::trace!(revealed = step.state.revealed, "rolling text tick");
            }
            inner.state = step.state;

            let became_visible = before == Phase::Idle && step.state.phase == Phase::Typing;
            if became_visible {
                inner.set_caret(true);
            }
            let text = inner.current_prefix(step.state.revealed);
            (
                step,
                text,
                inner.index,
                became_visible,
                (
                    inner.visible.clone(),
                    inner.displayed.clone(),
                    inner.current_index.clone(),
                ),
            )
        };

        let (visible, displayed, current_index) = signals;
        if became_visible {
            visible.set(true);
        }
        if current_index.get() != index {
            current_index.set(index);
        }
        displayed.set(text);

        match step.next {
            Some((after, next)) => Self::schedule(this, after, next),
            None => this.borrow_mut().timer = None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
