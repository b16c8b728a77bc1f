//! Reduced Motion - Process-wide accessibility preference
//!
//! Every engine consults a [`ReducedMotion`] provider and short-circuits into
//! its static, fully revealed state when the flag is on.
//!
//! # Pattern
//!
//! - The provider wraps a [`MotionPreferenceSource`] (the platform query).
//! - The platform listener is registered on first use (`current_value` or
//!   `subscribe`) and never more than once for the provider's lifetime.
//! - Consumers read the flag or subscribe to changes; only the platform
//!   listener writes it.
//! - The provider is passed by reference to engines (via `MotionContext`),
//!   so tests substitute a [`ManualPreference`] instead of touching globals.
//!
//! # Example
//!
//! ```ignore
//! use spark_motion::state::reduced_motion::{ManualPreference, ReducedMotion};
//!
//! let pref = ManualPreference::new(false);
//! let reduced = ReducedMotion::new(pref.clone());
//!
//! let unsubscribe = reduced.subscribe(|on| println!("reduced motion: {on}"));
//! pref.set(true); // prints "reduced motion: true"
//! unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{signal, Signal};

/// Environment variable read by [`EnvPreference`].
pub const REDUCED_MOTION_ENV: &str = "SPARK_MOTION_REDUCED";

// =============================================================================
// PLATFORM SOURCE
// =============================================================================

/// Platform accessibility preference.
pub trait MotionPreferenceSource {
    /// Current platform preference.
    fn prefers_reduced_motion(&self) -> bool;

    /// Register a change listener. Returns a function that unregisters it.
    fn watch(&self, on_change: Box<dyn Fn(bool)>) -> Box<dyn FnOnce()>;
}

/// Preference read from [`REDUCED_MOTION_ENV`].
///
/// `1`, `true`, `yes`, `on` and `reduce` (case-insensitive) mean reduced
/// motion. The environment is read once; it has no change events.
#[derive(Debug, Clone)]
pub struct EnvPreference {
    var: String,
}

impl EnvPreference {
    pub fn new() -> Self {
        Self::with_var(REDUCED_MOTION_ENV)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvPreference {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionPreferenceSource for EnvPreference {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(&self.var)
            .map(|v| parse_preference(&v))
            .unwrap_or(false)
    }

    fn watch(&self, _on_change: Box<dyn Fn(bool)>) -> Box<dyn FnOnce()> {
        Box::new(|| {})
    }
}

fn parse_preference(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "reduce"
    )
}

/// Host-controlled preference. Clones share state, so the host keeps one
/// clone to flip the value while the provider owns another.
#[derive(Clone)]
pub struct ManualPreference {
    value: Rc<Cell<bool>>,
    watchers: Rc<RefCell<Vec<(u64, Rc<dyn Fn(bool)>)>>>,
    next_watcher: Rc<Cell<u64>>,
}

impl ManualPreference {
    pub fn new(initial: bool) -> Self {
        Self {
            value: Rc::new(Cell::new(initial)),
            watchers: Rc::new(RefCell::new(Vec::new())),
            next_watcher: Rc::new(Cell::new(0)),
        }
    }

    /// Change the preference and notify watchers if it differs.
    pub fn set(&self, reduced: bool) {
        if self.value.replace(reduced) == reduced {
            return;
        }
        let watchers: Vec<Rc<dyn Fn(bool)>> =
            self.watchers.borrow().iter().map(|(_, w)| w.clone()).collect();
        for watcher in watchers {
            watcher(reduced);
        }
    }

    /// Number of registered change listeners.
    pub fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }
}

impl MotionPreferenceSource for ManualPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.value.get()
    }

    fn watch(&self, on_change: Box<dyn Fn(bool)>) -> Box<dyn FnOnce()> {
        let id = self.next_watcher.get();
        self.next_watcher.set(id + 1);
        self.watchers.borrow_mut().push((id, Rc::from(on_change)));

        let watchers = self.watchers.clone();
        Box::new(move || {
            watchers.borrow_mut().retain(|(wid, _)| *wid != id);
        })
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

type Subscribers = Rc<RefCell<Vec<(u64, Rc<dyn Fn(bool)>)>>>;

struct ReducedMotionInner {
    value: Signal<bool>,
    source: Box<dyn MotionPreferenceSource>,
    subscribers: Subscribers,
    next_subscriber: Cell<u64>,
    /// Unregister function of the platform listener, once registered.
    platform_listener: RefCell<Option<Box<dyn FnOnce()>>>,
    listening: Cell<bool>,
}

impl Drop for ReducedMotionInner {
    fn drop(&mut self) {
        if let Some(unregister) = self.platform_listener.get_mut().take() {
            unregister();
        }
    }
}

/// Shared reduced-motion flag. Cloning shares the provider.
#[derive(Clone)]
pub struct ReducedMotion {
    inner: Rc<ReducedMotionInner>,
}

impl std::fmt::Debug for ReducedMotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducedMotion")
            .field("value", &self.inner.value.get())
            .field("listening", &self.inner.listening.get())
            .finish()
    }
}

impl ReducedMotion {
    /// Create a provider over a platform source. Nothing is registered yet.
    pub fn new(source: impl MotionPreferenceSource + 'static) -> Self {
        let initial = source.prefers_reduced_motion();
        Self {
            inner: Rc::new(ReducedMotionInner {
                value: signal(initial),
                source: Box::new(source),
                subscribers: Rc::new(RefCell::new(Vec::new())),
                next_subscriber: Cell::new(0),
                platform_listener: RefCell::new(None),
                listening: Cell::new(false),
            }),
        }
    }

    /// Provider backed by the process environment.
    pub fn from_env() -> Self {
        Self::new(EnvPreference::new())
    }

    /// Provider pinned to a value.
    pub fn fixed(reduced: bool) -> Self {
        Self::new(ManualPreference::new(reduced))
    }

    /// Current flag.
    pub fn current_value(&self) -> bool {
        self.ensure_listening();
        self.inner.value.get()
    }

    /// The flag as a signal, for reading inside reactive effects.
    pub fn signal(&self) -> Signal<bool> {
        self.ensure_listening();
        self.inner.value.clone()
    }

    /// Call `on_change` whenever the flag changes. Returns an unsubscribe function.
    pub fn subscribe(&self, on_change: impl Fn(bool) + 'static) -> Box<dyn FnOnce()> {
        self.ensure_listening();

        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(on_change)));

        let subscribers = self.inner.subscribers.clone();
        Box::new(move || {
            subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
        })
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// True once the platform listener has been registered.
    pub fn is_listening(&self) -> bool {
        self.inner.listening.get()
    }

    /// Unregister the platform listener. The flag keeps its last value.
    pub fn teardown(&self) {
        if let Some(unregister) = self.inner.platform_listener.borrow_mut().take() {
            unregister();
            tracing::debug!("reduced-motion platform listener removed");
        }
    }

    fn ensure_listening(&self) {
        if self.inner.listening.replace(true) {
            return;
        }

        // Value may have changed between construction and first use.
        let value = self.inner.value.clone();
        let subscribers = self.inner.subscribers.clone();
        let current = self.inner.source.prefers_reduced_motion();
        if value.get() != current {
            value.set(current);
        }

        let unregister = self.inner.source.watch(Box::new(move |reduced| {
            if value.get() == reduced {
                return;
            }
            value.set(reduced);
            tracing::debug!(reduced, "reduced-motion preference changed");
            notify(&subscribers, reduced);
        }));
        *self.inner.platform_listener.borrow_mut() = Some(unregister);
        tracing::debug!(reduced = current, "reduced-motion platform listener registered");
    }
}

/// Notify from a snapshot so subscribers may unsubscribe while being called.
fn notify(subscribers: &Subscribers, reduced: bool) {
    let snapshot: Vec<Rc<dyn Fn(bool)>> =
        subscribers.borrow().iter().map(|(_, s)| s.clone()).collect();
    for subscriber in snapshot {
        subscriber(reduced);
    }
}

// =============================================================================
// TESTS
// =============================================================================
