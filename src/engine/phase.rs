//! Type / pause / delete phase machine.
//!
//! The typewriter and rolling-text engines share this transition function.
//! It is pure: a session feeds it the current state and the event its timer
//! fired, then applies the returned state and schedules the returned event.
//! Sessions never mutate `revealed` or `phase` any other way.
//!
//! ```text
//! Idle --Start--> Typing --Tick (full, loop)--> PausedAfterType --PauseElapsed--> Deleting
//!                   ^  \--Tick (full, no loop)--> Done                              |
//!                   +-------------------------Tick (empty)------------------------+
//! ```

use std::time::Duration;

/// Deletion runs this many times faster than typing.
pub const DELETE_SPEED_DIVISOR: u32 = 2;

/// Current member of the phase enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the initial delay.
    Idle,
    Typing,
    PausedAfterType,
    Deleting,
    /// Terminal: fully typed and not looping, or reduced motion.
    Done,
}

/// What a session's timer fired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// Initial delay elapsed.
    Start,
    /// One typing or deleting step.
    Tick,
    /// Pause after a full type-in elapsed.
    PauseElapsed,
}

/// Timing parameters of one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTiming {
    pub type_speed: Duration,
    pub pause: Duration,
    pub looping: bool,
}

impl CycleTiming {
    /// Tick period while deleting: always `type_speed / 2`.
    pub fn delete_period(&self) -> Duration {
        self.type_speed / DELETE_SPEED_DIVISOR
    }
}

/// Position in the cycle. `revealed` counts displayed graphemes of a text
/// `total` graphemes long; `0 <= revealed <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    pub phase: Phase,
    pub revealed: usize,
    pub total: usize,
}

impl CycleState {
    pub fn idle(total: usize) -> Self {
        Self {
            phase: Phase::Idle,
            revealed: 0,
            total,
        }
    }

    /// Fully revealed, nothing left to do.
    pub fn done(total: usize) -> Self {
        Self {
            phase: Phase::Done,
            revealed: total,
            total,
        }
    }

    pub fn is_fully_typed(&self) -> bool {
        self.revealed == self.total
    }
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: CycleState,
    /// Timer to schedule next, if any.
    pub next: Option<(Duration, CycleEvent)>,
    /// Typing just reached the end of the text.
    pub reached_end: bool,
    /// Deleting just emptied the text and typing restarts.
    pub wrapped: bool,
}

impl Step {
    fn stay(state: CycleState) -> Self {
        Self {
            state,
            next: None,
            reached_end: false,
            wrapped: false,
        }
    }
}

/// Apply `event` to `state`.
///
/// Events that do not belong to the current phase leave the state unchanged
/// and schedule nothing.
pub fn transition(state: CycleState, event: CycleEvent, timing: &CycleTiming) -> Step {
    match (state.phase, event) {
        (Phase::Idle, CycleEvent::Start) => Step {
            state: CycleState {
                phase: Phase::Typing,
                revealed: 0,
                ..state
            },
            next: Some((timing.type_speed, CycleEvent::Tick)),
            reached_end: false,
            wrapped: false,
        },

        (Phase::Typing, CycleEvent::Tick) => {
            let revealed = (state.revealed + 1).min(state.total);
            if revealed < state.total {
                return Step {
                    state: CycleState { revealed, ..state },
                    next: Some((timing.type_speed, CycleEvent::Tick)),
                    reached_end: false,
                    wrapped: false,
                };
            }

            if timing.looping {
                Step {
                    state: CycleState {
                        phase: Phase::PausedAfterType,
                        revealed,
                        ..state
                    },
                    next: Some((timing.pause, CycleEvent::PauseElapsed)),
                    reached_end: true,
                    wrapped: false,
                }
            } else {
                Step {
                    state: CycleState {
                        phase: Phase::Done,
                        revealed,
                        ..state
                    },
                    next: None,
                    reached_end: true,
                    wrapped: false,
                }
            }
        }

        (Phase::PausedAfterType, CycleEvent::PauseElapsed) => {
            if state.revealed == 0 {
                // Nothing to delete.
                return restart_typing(state, timing);
            }
            Step {
                state: CycleState {
                    phase: Phase::Deleting,
                    ..state
                },
                next: Some((timing.delete_period(), CycleEvent::Tick)),
                reached_end: false,
                wrapped: false,
            }
        }

        (Phase::Deleting, CycleEvent::Tick) => {
            let revealed = state.revealed.saturating_sub(1);
            if revealed == 0 {
                return restart_typing(CycleState { revealed, ..state }, timing);
            }
            Step {
                state: CycleState { revealed, ..state },
                next: Some((timing.delete_period(), CycleEvent::Tick)),
                reached_end: false,
                wrapped: false,
            }
        }

        _ => Step::stay(state),
    }
}

fn restart_typing(state: CycleState, timing: &CycleTiming) -> Step {
    Step {
        state: CycleState {
            phase: Phase::Typing,
            revealed: 0,
            ..state
        },
        next: Some((timing.type_speed, CycleEvent::Tick)),
        reached_end: false,
        wrapped: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(looping: bool) -> CycleTiming {
        CycleTiming {
            type_speed: Duration::from_millis(100),
            pause: Duration::from_millis(2000),
            looping,
        }
    }

    /// Run events until no timer is scheduled or `limit` steps pass.
    fn drive(mut state: CycleState, timing: &CycleTiming, limit: usize) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut event = CycleEvent::Start;
        for _ in 0..limit {
            let step = transition(state, event, timing);
            steps.push(step);
            state = step.state;
            match step.next {
                Some((_, e)) => event = e,
                None => break,
            }
        }
        steps
    }

    #[test]
    fn test_typing_grows_by_one_per_tick() {
        let steps = drive(CycleState::idle(5), &timing(false), 100);
        let typed: Vec<usize> = steps
            .iter()
            .filter(|s| s.state.phase == Phase::Typing || s.reached_end)
            .map(|s| s.state.revealed)
            .collect();
        assert_eq!(typed, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(steps.last().unwrap().state, CycleState::done(5));
        assert_eq!(steps.iter().filter(|s| s.reached_end).count(), 1);
    }

    #[test]
    fn test_loop_pauses_then_deletes_at_half_period() {
        let t = timing(true);
        let mut state = CycleState {
            phase: Phase::Typing,
            revealed: 2,
            total: 3,
        };

        let step = transition(state, CycleEvent::Tick, &t);
        assert!(step.reached_end);
        assert_eq!(step.state.phase, Phase::PausedAfterType);
        assert_eq!(step.next, Some((t.pause, CycleEvent::PauseElapsed)));
        state = step.state;

        let step = transition(state, CycleEvent::PauseElapsed, &t);
        assert_eq!(step.state.phase, Phase::Deleting);
        assert_eq!(step.next, Some((Duration::from_millis(50), CycleEvent::Tick)));
        state = step.state;

        let step = transition(state, CycleEvent::Tick, &t);
        assert_eq!(step.state.revealed, 2);
        state = step.state;
        let step = transition(state, CycleEvent::Tick, &t);
        state = step.state;
        let step = transition(state, CycleEvent::Tick, &t);
        assert!(step.wrapped);
        assert_eq!(step.state.phase, Phase::Typing);
        assert_eq!(step.state.revealed, 0);
        assert_eq!(step.next, Some((t.type_speed, CycleEvent::Tick)));
    }

    #[test]
    fn test_empty_text_completes_on_first_tick() {
        let t = timing(true);
        let step = transition(CycleState::idle(0), CycleEvent::Start, &t);
        let step = transition(step.state, CycleEvent::Tick, &t);
        assert!(step.reached_end);
        assert_eq!(step.state.phase, Phase::PausedAfterType);

        let step = transition(step.state, CycleEvent::PauseElapsed, &t);
        assert!(step.wrapped);
        assert_eq!(step.state.phase, Phase::Typing);
    }

    #[test]
    fn test_out_of_phase_events_are_ignored() {
        let t = timing(true);
        let typing = CycleState {
            phase: Phase::Typing,
            revealed: 1,
            total: 4,
        };
        assert_eq!(transition(typing, CycleEvent::PauseElapsed, &t), Step::stay(typing));
        assert_eq!(transition(typing, CycleEvent::Start, &t), Step::stay(typing));

        let done = CycleState::done(4);
        assert_eq!(transition(done, CycleEvent::Tick, &t), Step::stay(done));
    }

    #[test]
    fn test_delete_period_is_half_type_speed() {
        let t = CycleTiming {
            type_speed: Duration::from_millis(81),
            pause: Duration::ZERO,
            looping: true,
        };
        assert_eq!(t.delete_period() * 2, t.type_speed);
    }
}
