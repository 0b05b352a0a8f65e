//! Dispatch points in an action's lifecycle.
//!
//! A [`Timing`] names the moment a factor is consulted. Dispatch always
//! happens at one timing at a time; factors test membership with
//! [`Timing::contains`] so a factor may declare interest in several.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Flagged points at which buffs and equipment may react.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Timing: u16 {
        /// A heal is about to land on the holder.
        const HEALING = 1 << 0;
        /// The holder is attacking.
        const ATTACK = 1 << 1;
        /// The holder is defending against an attack.
        const DEFEND = 1 << 2;
        /// The holder moved or was displaced.
        const MOVE = 1 << 3;
        /// A buff is being applied to the holder.
        const BUFFED = 1 << 4;
        /// Speed query.
        const GET_SPEED = 1 << 5;
        /// An item was equipped.
        const EQUIP = 1 << 6;
        /// An item is being unequipped.
        const UNEQUIP = 1 << 7;
        /// Max HP query.
        const GET_MAX_HP = 1 << 8;
        /// An attack aimed at the holder may be redirected.
        const MISLEAD = 1 << 9;
        /// The holder died.
        const DEATH = 1 << 10;

        /// Timings that only feed stat queries.
        const STAT_QUERY = Self::GET_SPEED.bits() | Self::GET_MAX_HP.bits();
    }
}

impl Timing {
    /// Returns true for the stat-query timings.
    #[must_use]
    pub fn is_stat_query(self) -> bool {
        Timing::STAT_QUERY.contains(self) && !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_values_are_stable() {
        assert_eq!(Timing::HEALING.bits(), 1);
        assert_eq!(Timing::ATTACK.bits(), 2);
        assert_eq!(Timing::DEFEND.bits(), 4);
        assert_eq!(Timing::MISLEAD.bits(), 512);
        assert_eq!(Timing::DEATH.bits(), 1024);
    }

    #[test]
    fn test_stat_query_membership() {
        assert!(Timing::GET_SPEED.is_stat_query());
        assert!(Timing::GET_MAX_HP.is_stat_query());
        assert!(!Timing::DEFEND.is_stat_query());
        assert!(!Timing::empty().is_stat_query());
    }

    #[test]
    fn test_serde_roundtrip() {
        let timing = Timing::ATTACK | Timing::DEFEND;
        let json = serde_json::to_string(&timing).unwrap();
        let back: Timing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, timing);
    }
}
