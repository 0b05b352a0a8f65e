//! The factor protocol shared by buffs and equipment.
//!
//! A factor reacts to combat events at [`Timing`] dispatch points. Dispatch
//! on a combatant runs in four phases:
//!
//! 1. collect the combatant's buffs and equipped items
//! 2. keep those whose [`Factor::may_affect`] accepts the timing and baton
//! 3. call [`Factor::affect`] on each survivor, highest priority first,
//!    otherwise in collection order (buffs, then equipment)
//! 4. call [`Factor::after_affect`] on the same set, then purge expired buffs
//!
//! Stat queries stop after phase 3, so reading a stat never consumes a buff.
//! The filtering and ordering of phases 2 and 3 live in [`schedule`]; the
//! combatant owns the collections and drives the rest.

use std::cmp::Reverse;

use crate::baton::Baton;
use crate::timing::Timing;

/// A buff or item that reacts to combat events.
pub trait Factor {
    /// Display name. Buffs merge by name.
    fn name(&self) -> &str;

    /// Whether this factor reacts at `timing` given the current baton.
    fn may_affect(&self, timing: Timing, baton: &Baton) -> bool;

    /// Applies the factor's effect to the baton.
    fn affect(&self, timing: Timing, baton: &mut Baton);

    /// Bookkeeping after every selected factor has affected the baton.
    fn after_affect(&mut self, _timing: Timing, _baton: &Baton) {}

    /// Ordering hint; higher runs first. Equal priorities keep insertion
    /// order.
    fn priority(&self, _timing: Timing) -> i32 {
        0
    }
}

/// Filters `candidates` by [`Factor::may_affect`] and orders the survivors.
///
/// Returns the keys of the selected factors in the order `affect` must run.
/// The sort is stable, so factors sharing a priority keep the order they were
/// collected in.
pub fn schedule<'a, K>(
    candidates: impl IntoIterator<Item = (K, &'a dyn Factor)>,
    timing: Timing,
    baton: &Baton,
) -> Vec<K> {
    let mut selected: Vec<(K, i32)> = candidates
        .into_iter()
        .filter(|(_, factor)| factor.may_affect(timing, baton))
        .map(|(key, factor)| (key, factor.priority(timing)))
        .collect();
    selected.sort_by_key(|(_, priority)| Reverse(*priority));
    selected.into_iter().map(|(key, _)| key).collect()
}
