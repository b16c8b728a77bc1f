//! Motion context - the shared collaborators every engine is given.
//!
//! One context per host surface. Engines hold clones; nothing in spark-motion
//! reaches for an ambient global timeline or preference.

use super::reduced_motion::ReducedMotion;
use super::timeline::Timeline;

/// Timeline plus reduced-motion provider.
#[derive(Clone, Debug)]
pub struct MotionContext {
    pub timeline: Timeline,
    pub reduced_motion: ReducedMotion,
}

impl MotionContext {
    pub fn new(timeline: Timeline, reduced_motion: ReducedMotion) -> Self {
        Self {
            timeline,
            reduced_motion,
        }
    }

    /// Fresh timeline, preference read from the environment.
    pub fn from_env() -> Self {
        Self::new(Timeline::new(), ReducedMotion::from_env())
    }

    /// Shorthand for `self.reduced_motion.current_value()`.
    pub fn is_reduced(&self) -> bool {
        self.reduced_motion.current_value()
    }
}
