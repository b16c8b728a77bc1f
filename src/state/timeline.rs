//! Timeline - Cooperative timer queue
//!
//! Every timed behavior in spark-motion (typing ticks, pauses, caret blink,
//! glitch frames) is a timer on a `Timeline`. The timeline is a virtual clock:
//! it only moves when the host calls [`Timeline::advance`] or
//! [`Timeline::advance_to`], which makes every engine deterministic under test
//! and lets a real host drive it from a wall clock.
//!
//! # Guarantees
//!
//! - Timers fire in deadline order, ties in scheduling order.
//! - Exactly one callback runs at a time and no internal borrow is held while
//!   it runs, so callbacks may schedule or cancel other timers.
//! - A [`TimerHandle`] cancels its timer when dropped. Owners store the handle
//!   and cancellation on teardown is synchronous.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use spark_motion::state::timeline::Timeline;
//!
//! let timeline = Timeline::new();
//! let handle = timeline.schedule(Duration::from_millis(100), || println!("tick"));
//! timeline.advance(Duration::from_millis(100)); // prints "tick"
//! drop(handle);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_TIMELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Shortest period a repeating timer may have.
const MIN_REPEAT_PERIOD: Duration = Duration::from_millis(1);

type TimerId = u64;

// =============================================================================
// INTERNAL STATE
// =============================================================================

enum TimerTask {
    Once(Box<dyn FnOnce()>),
    Repeating {
        period: Duration,
        callback: Box<dyn FnMut()>,
    },
}

struct TimelineInner {
    id: u64,
    now: Duration,
    next_timer: TimerId,
    queue: BTreeMap<(Duration, TimerId), TimerTask>,
    /// Deadline of every timer that has not been cancelled or finished.
    /// A repeating timer stays here while its callback runs.
    live: HashMap<TimerId, Duration>,
}

impl TimelineInner {
    fn insert(&mut self, deadline: Duration, task: TimerTask) -> TimerId {
        let id = self.next_timer;
        self.next_timer += 1;
        self.queue.insert((deadline, id), task);
        self.live.insert(id, deadline);
        id
    }
}

/// Remove a timer. The removed task is dropped after the borrow is released,
/// since its captures may own other handles.
fn cancel_timer(inner: &Rc<RefCell<TimelineInner>>, id: TimerId) {
    let removed = {
        let mut inner = inner.borrow_mut();
        match inner.live.remove(&id) {
            Some(deadline) => inner.queue.remove(&(deadline, id)),
            None => None,
        }
    };
    drop(removed);
}

// =============================================================================
// TIMELINE
// =============================================================================

/// Shared handle to a cooperative timer queue. Cloning shares the queue.
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timeline")
            .field("id", &inner.id)
            .field("now", &inner.now)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimelineInner {
                id: NEXT_TIMELINE_ID.fetch_add(1, Ordering::Relaxed),
                now: Duration::ZERO,
                next_timer: 0,
                queue: BTreeMap::new(),
                live: HashMap::new(),
            })),
        }
    }

    /// Process-unique identifier, used to key shared clocks per timeline.
    pub fn id(&self) -> u64 {
        self.inner.borrow().id
    }

    /// Current virtual time since the timeline was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of timers waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.borrow().queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Run `callback` once, `after` from now.
    pub fn schedule(&self, after: Duration, callback: impl FnOnce() + 'static) -> TimerHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let deadline = inner.now.saturating_add(after);
            inner.insert(deadline, TimerTask::Once(Box::new(callback)))
        };
        TimerHandle {
            timeline: Rc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Run `callback` every `period`, first after one period.
    ///
    /// Deadlines advance by exactly `period` each time, so a late host does not
    /// accumulate drift. Periods shorter than 1ms are raised to 1ms.
    pub fn schedule_repeating(
        &self,
        period: Duration,
        callback: impl FnMut() + 'static,
    ) -> TimerHandle {
        let period = if period < MIN_REPEAT_PERIOD {
            tracing::warn!(?period, "repeating timer period raised to 1ms");
            MIN_REPEAT_PERIOD
        } else {
            period
        };
        let id = {
            let mut inner = self.inner.borrow_mut();
            let deadline = inner.now.saturating_add(period);
            inner.insert(
                deadline,
                TimerTask::Repeating {
                    period,
                    callback: Box::new(callback),
                },
            )
        };
        TimerHandle {
            timeline: Rc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Move the clock forward by `by`, firing every timer that falls due.
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.advance_to(target)
    }

    /// Move the clock to `target` (no-op if already past it), firing every
    /// timer that falls due on the way. Returns the number of callbacks run.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            let (deadline, id, task) = {
                let mut inner = self.inner.borrow_mut();
                let key = match inner.queue.keys().next() {
                    Some(&key) if key.0 <= target => key,
                    _ => break,
                };
                let Some(task) = inner.queue.remove(&key) else {
                    break;
                };
                if inner.now < key.0 {
                    inner.now = key.0;
                }
                if matches!(task, TimerTask::Once(_)) {
                    inner.live.remove(&key.1);
                }
                (key.0, key.1, task)
            };

            fired += 1;
            match task {
                TimerTask::Once(callback) => callback(),
                TimerTask::Repeating {
                    period,
                    mut callback,
                } => {
                    callback();
                    let next = deadline.saturating_add(period);
                    let mut inner = self.inner.borrow_mut();
                    if !inner.live.contains_key(&id) {
                        continue;
                    }
                    // Saturated at the end of time: retire rather than spin.
                    if next == deadline {
                        inner.live.remove(&id);
                        drop(inner);
                        drop(callback);
                        continue;
                    }
                    inner.live.insert(id, next);
                    inner
                        .queue
                        .insert((next, id), TimerTask::Repeating { period, callback });
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        if inner.now < target {
            inner.now = target;
        }
        fired
    }

    /// Advance to the wall-clock time elapsed since `origin`.
    ///
    /// Hosts call this once per frame with the instant their loop started.
    pub fn sync_to_wall_clock(&self, origin: Instant) -> usize {
        self.advance_to(origin.elapsed())
    }
}

// =============================================================================
// TIMER HANDLE
// =============================================================================

/// Owner of a scheduled timer. Dropping it cancels the timer.
#[must_use = "dropping a TimerHandle cancels the timer"]
pub struct TimerHandle {
    timeline: Weak<RefCell<TimelineInner>>,
    id: Option<TimerId>,
}

impl TimerHandle {
    /// Cancel the timer now.
    pub fn cancel(mut self) {
        self.release();
    }

    /// True while the timer is still scheduled (or a repeating timer is live).
    pub fn is_active(&self) -> bool {
        match (self.id, self.timeline.upgrade()) {
            (Some(id), Some(inner)) => inner.borrow().live.contains_key(&id),
            _ => false,
        }
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(inner) = self.timeline.upgrade() {
                cancel_timer(&inner, id);
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
