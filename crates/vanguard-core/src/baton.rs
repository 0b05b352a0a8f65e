//! The per-action context threaded through checks, dispatch and effects.
//!
//! A [`Baton`] is created fresh for every executed action (and for every
//! standalone dispatch such as a stat query or a displacement notice) and
//! discarded afterwards. Factors read and write its typed fields; effects use
//! it to stage data for later effects in the same action.

use serde::{Deserialize, Serialize};

use crate::combat::{Attack, AttackOutcome};
use crate::combatant::CombatantId;

/// Staged value of a stat query.
///
/// `base` is the unmodified stat; factors add their contribution to `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatAccumulator {
    /// The combatant's base stat.
    pub base: i64,
    /// The running total factors add to.
    pub value: i64,
}

impl StatAccumulator {
    /// Starts a query from `base`.
    #[must_use]
    pub const fn new(base: i64) -> Self {
        Self { base, value: base }
    }
}

/// Baton fields an action may preset before any effect runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatonPreset {
    /// Evasion buffs do not fire.
    pub ignore_evade: bool,
    /// Force the miss outcome instead of rolling it.
    pub forced_miss: Option<bool>,
    /// Force the crit outcome instead of rolling it.
    pub forced_crit: Option<bool>,
}

impl BatonPreset {
    /// Preset that bypasses evasion.
    #[must_use]
    pub const fn ignore_evade() -> Self {
        Self {
            ignore_evade: true,
            forced_miss: None,
            forced_crit: None,
        }
    }

    /// Writes the preset into `baton`. Flags are only ever raised.
    pub fn apply(&self, baton: &mut Baton) {
        baton.ignore_evade |= self.ignore_evade;
        if self.forced_miss.is_some() {
            baton.forced_miss = self.forced_miss;
        }
        if self.forced_crit.is_some() {
            baton.forced_crit = self.forced_crit;
        }
    }
}

/// Structured per-action context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baton {
    /// The attack currently being resolved.
    pub attack: Option<Attack>,
    /// Who is attacking.
    pub attacker: Option<CombatantId>,
    /// Who the current attack is aimed at.
    pub defender: Option<CombatantId>,
    /// Redirect target written by a mislead factor.
    pub mislead_target: Option<CombatantId>,
    /// Evasion factors must not fire.
    pub ignore_evade: bool,
    /// The current effect is a combo follow-up.
    pub combo: bool,
    /// Seeds each attack's miss outcome instead of rolling it.
    pub forced_miss: Option<bool>,
    /// Seeds each attack's crit outcome instead of rolling it.
    pub forced_crit: Option<bool>,
    /// Outcome of the most recent attack in this action.
    pub last_outcome: Option<AttackOutcome>,
    /// Staged stat for `GET_MAX_HP` / `GET_SPEED` queries.
    pub stat: Option<StatAccumulator>,
    /// Staged heal amount for `HEALING`.
    pub heal: Option<i64>,
    /// Destination slot for `MOVE`.
    pub moved_to: Option<usize>,
    /// Name of the buff being applied for `BUFFED`.
    pub applied_buff: Option<String>,
}

impl Baton {
    /// A fresh, empty baton.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A baton for a stat query starting at `base`.
    #[must_use]
    pub fn stat_query(base: i64) -> Self {
        Self {
            stat: Some(StatAccumulator::new(base)),
            ..Self::default()
        }
    }

    /// A baton announcing a move into `slot`.
    #[must_use]
    pub fn moved(slot: usize) -> Self {
        Self {
            moved_to: Some(slot),
            ..Self::default()
        }
    }

    /// Adds `amount` to the staged stat, if a query is in flight.
    pub fn add_stat(&mut self, amount: i64) {
        if let Some(stat) = self.stat.as_mut() {
            stat.value += amount;
        }
    }
}
