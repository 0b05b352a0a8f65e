//! Stack and duration bookkeeping for buffs.

use serde::{Deserialize, Serialize};

/// One application of an independent-style buff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Turns left before this application lapses.
    pub duration: i32,
    /// Stack carried by this application.
    pub stack: i32,
}

/// How a buff counts down, merges and is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// One (stack, duration) pair shared by every application.
    Refresh {
        /// Remaining uses.
        stack: i32,
        /// Remaining turns.
        duration: i32,
        /// Whether re-application adds stacks or resets to one.
        stackable: bool,
    },
    /// One timer per application.
    Independent {
        /// Live applications.
        timers: Vec<Timer>,
    },
}

impl Lifecycle {
    /// A stackable refresh-style lifecycle.
    #[must_use]
    pub const fn refresh(stack: i32, duration: i32) -> Self {
        Lifecycle::Refresh {
            stack,
            duration,
            stackable: true,
        }
    }

    /// A non-stackable marker lifecycle.
    #[must_use]
    pub const fn marker(duration: i32) -> Self {
        Lifecycle::Refresh {
            stack: 1,
            duration,
            stackable: false,
        }
    }

    /// An independent lifecycle holding one application.
    #[must_use]
    pub fn independent(stack: i32, duration: i32) -> Self {
        Lifecycle::Independent {
            timers: vec![Timer { duration, stack }],
        }
    }

    /// Total stack: the shared stack, or the sum over timers.
    #[must_use]
    pub fn stack(&self) -> i32 {
        match self {
            Lifecycle::Refresh { stack, .. } => *stack,
            Lifecycle::Independent { timers } => timers.iter().map(|t| t.stack).sum(),
        }
    }

    /// Longest remaining duration.
    #[must_use]
    pub fn duration(&self) -> i32 {
        match self {
            Lifecycle::Refresh { duration, .. } => *duration,
            Lifecycle::Independent { timers } => {
                timers.iter().map(|t| t.duration).max().unwrap_or(0)
            }
        }
    }

    /// Folds a new application of the same buff into this one.
    pub fn merge(&mut self, incoming: Lifecycle) {
        match (self, incoming) {
            (
                Lifecycle::Refresh {
                    stack,
                    duration,
                    stackable,
                },
                Lifecycle::Refresh {
                    stack: new_stack,
                    duration: new_duration,
                    ..
                },
            ) => {
                if *stackable {
                    *stack += new_stack;
                    *duration = (*duration).max(new_duration);
                } else {
                    *stack = 1;
                    *duration = new_duration;
                }
            }
            (Lifecycle::Independent { timers }, Lifecycle::Independent { timers: new }) => {
                timers.extend(new);
            }
            (current, incoming) => *current = incoming,
        }
    }

    /// Spends one use after the buff fired.
    ///
    /// Refresh-style loses one stack; independent-style drops the timer
    /// closest to lapsing (the earliest one on ties).
    pub fn consume(&mut self) {
        match self {
            Lifecycle::Refresh { stack, .. } => *stack -= 1,
            Lifecycle::Independent { timers } => {
                let shortest = timers
                    .iter()
                    .enumerate()
                    .min_by_key(|(index, timer)| (timer.duration, *index))
                    .map(|(index, _)| index);
                if let Some(index) = shortest {
                    timers.remove(index);
                }
            }
        }
    }

    /// Counts every timer down by one turn.
    pub fn tick(&mut self) {
        match self {
            Lifecycle::Refresh { duration, .. } => *duration -= 1,
            Lifecycle::Independent { timers } => {
                for timer in timers.iter_mut() {
                    timer.duration -= 1;
                }
                timers.retain(|t| t.duration > 0 && t.stack > 0);
            }
        }
    }

    /// True once nothing is left of the buff.
    #[must_use]
    pub fn expired(&self) -> bool {
        match self {
            Lifecycle::Refresh {
                stack, duration, ..
            } => *stack <= 0 || *duration <= 0,
            Lifecycle::Independent { timers } => timers.is_empty(),
        }
    }
}
