//! The attack value factors mutate while it is being resolved.

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// Damage multiplier applied on a critical hit.
pub const CRIT_MULTIPLIER: f64 = 1.5;

/// One attack in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    /// Inclusive damage range.
    pub amount: (i64, i64),
    /// Damage multiplier.
    pub magnitude: f64,
    /// Chance to land, compared against a uniform draw.
    pub accuracy: f64,
    /// Chance to crit.
    pub crit: f64,
    /// Miss outcome; `None` until rolled.
    pub missed: Option<bool>,
    /// Crit outcome; `None` until rolled.
    pub critted: Option<bool>,
    miss_forced: bool,
}

impl Attack {
    /// A plain attack: magnitude 1, accuracy 1, no crit chance.
    #[must_use]
    pub const fn new(amount: (i64, i64)) -> Self {
        Self {
            amount,
            magnitude: 1.0,
            accuracy: 1.0,
            crit: 0.0,
            missed: None,
            critted: None,
            miss_forced: false,
        }
    }

    /// Seeds the outcomes from forced values. A forced miss is never re-rolled.
    #[must_use]
    pub fn with_forced(mut self, missed: Option<bool>, critted: Option<bool>) -> Self {
        self.missed = missed;
        self.miss_forced = missed.is_some();
        self.critted = critted;
        self
    }

    /// Seeds a still-unknown miss outcome from an earlier attack in the same
    /// action. Unlike a forced outcome, a defend factor may reopen it.
    #[must_use]
    pub fn with_carried_miss(mut self, missed: Option<bool>) -> Self {
        if self.missed.is_none() {
            self.missed = missed;
        }
        self
    }

    /// Sets the crit chance.
    #[must_use]
    pub fn with_crit(mut self, crit: f64) -> Self {
        self.crit = crit;
        self
    }

    /// Clears a rolled miss so it is drawn again. Forced outcomes stay.
    pub fn reopen_miss(&mut self) {
        if !self.miss_forced {
            self.missed = None;
        }
    }

    /// True when the miss outcome came from the baton, not a roll.
    #[must_use]
    pub const fn is_miss_forced(&self) -> bool {
        self.miss_forced
    }

    /// Rolls the miss outcome if it is still unknown.
    pub fn resolve_miss(&mut self, rng: &mut dyn RandomSource) -> bool {
        let missed = match self.missed {
            Some(missed) => missed,
            None => roll_miss(rng, self.accuracy),
        };
        self.missed = Some(missed);
        missed
    }

    /// Rolls the crit outcome if it is still unknown.
    pub fn resolve_crit(&mut self, rng: &mut dyn RandomSource) -> bool {
        let critted = match self.critted {
            Some(critted) => critted,
            None => roll_crit(rng, self.crit),
        };
        self.critted = Some(critted);
        critted
    }

    /// Damage dealt by a landed hit.
    ///
    /// A crit deals `floor(min * magnitude * 1.5)`; otherwise an integer is
    /// drawn from the range and scaled by magnitude, rounding down.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn damage(&self, critted: bool, rng: &mut dyn RandomSource) -> i64 {
        let (low, high) = self.amount;
        if critted {
            (low as f64 * self.magnitude * CRIT_MULTIPLIER).floor() as i64
        } else {
            (rng.integer(low, high) as f64 * self.magnitude).floor() as i64
        }
    }
}

/// The miss convention: an attack misses when the draw exceeds its accuracy.
///
/// Accuracy 1.0 never misses because draws lie in `[0, 1)`.
pub fn roll_miss(rng: &mut dyn RandomSource, accuracy: f64) -> bool {
    rng.uniform() > accuracy
}

/// An attack crits when the draw falls below its crit chance.
pub fn roll_crit(rng: &mut dyn RandomSource, crit: f64) -> bool {
    rng.uniform() < crit
}
