//! Buffs and the per-combatant buff collection.
//!
//! A [`Buff`] pairs a behaviour ([`BuffKind`]) with a [`Lifecycle`] that
//! decides how stacks and durations merge, decay and get consumed. The
//! [`Buffs`] collection only talks to buffs through that interface: it
//! merges same-named applications, ticks at end of turn and purges what has
//! expired.
//!
//! # Example
//!
//! ```
//! use vanguard_core::buff::{Buff, Buffs};
//!
//! let mut buffs = Buffs::new();
//! buffs.add(Buff::strength(1, 1));
//! buffs.add(Buff::strength(1, 1));
//!
//! let strength = buffs.get("Strength").unwrap();
//! assert_eq!(strength.stack(), 2);
//! assert_eq!(strength.duration(), 1);
//! ```

mod lifecycle;

pub use lifecycle::{Lifecycle, Timer};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::baton::Baton;
use crate::combatant::CombatantId;
use crate::factor::Factor;
use crate::timing::Timing;

// =============================================================================
// Buff
// =============================================================================

/// What a buff does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffKind {
    /// Halves incoming accuracy and forces a fresh miss roll.
    Dodge,
    /// Adds half a point of magnitude to the holder's attacks.
    Strength,
    /// Redirects attacks aimed at the holder to `protector`.
    Protected {
        /// Who takes the hits instead.
        protector: CombatantId,
    },
    /// Marks the holder as open to a combo follow-up.
    Combo,
    /// Halves the magnitude of incoming attacks.
    Block,
    /// Adds two speed per stack.
    Haste,
}

impl BuffKind {
    /// Name shared by every application of this kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            BuffKind::Dodge => "Dodge",
            BuffKind::Strength => "Strength",
            BuffKind::Protected { .. } => "Protected",
            BuffKind::Combo => "Combo",
            BuffKind::Block => "Block",
            BuffKind::Haste => "Haste",
        }
    }
}

/// A named, stackable modifier owned by one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    kind: BuffKind,
    lifecycle: Lifecycle,
}

impl Buff {
    /// Speed added per stack of Haste.
    pub const HASTE_PER_STACK: i64 = 2;

    /// Creates a buff from its parts.
    #[must_use]
    pub const fn new(kind: BuffKind, lifecycle: Lifecycle) -> Self {
        Self { kind, lifecycle }
    }

    /// Stackable Dodge.
    #[must_use]
    pub const fn dodge(stack: i32, duration: i32) -> Self {
        Self::new(BuffKind::Dodge, Lifecycle::refresh(stack, duration))
    }

    /// Stackable Strength.
    #[must_use]
    pub const fn strength(stack: i32, duration: i32) -> Self {
        Self::new(BuffKind::Strength, Lifecycle::refresh(stack, duration))
    }

    /// Stackable Protected pointing at `protector`.
    #[must_use]
    pub const fn protected(protector: CombatantId, stack: i32, duration: i32) -> Self {
        Self::new(
            BuffKind::Protected { protector },
            Lifecycle::refresh(stack, duration),
        )
    }

    /// Non-stackable Combo marker.
    #[must_use]
    pub const fn combo(duration: i32) -> Self {
        Self::new(BuffKind::Combo, Lifecycle::marker(duration))
    }

    /// Independent-style Block.
    #[must_use]
    pub fn block(stack: i32, duration: i32) -> Self {
        Self::new(BuffKind::Block, Lifecycle::independent(stack, duration))
    }

    /// Stackable Haste.
    #[must_use]
    pub const fn haste(stack: i32, duration: i32) -> Self {
        Self::new(BuffKind::Haste, Lifecycle::refresh(stack, duration))
    }

    /// The buff's behaviour.
    #[must_use]
    pub const fn kind(&self) -> &BuffKind {
        &self.kind
    }

    /// The buff's stack and duration state.
    #[must_use]
    pub const fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Display name; applications with equal names merge.
    #[must_use]
    pub const fn name_str(&self) -> &'static str {
        self.kind.name()
    }

    /// Current stack.
    #[must_use]
    pub fn stack(&self) -> i32 {
        self.lifecycle.stack()
    }

    /// Longest remaining duration.
    #[must_use]
    pub fn duration(&self) -> i32 {
        self.lifecycle.duration()
    }

    /// True once the buff should be purged.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.lifecycle.expired()
    }

    /// Folds a new application into this buff. The newer payload wins.
    pub fn absorb(&mut self, incoming: Buff) {
        self.kind = incoming.kind;
        self.lifecycle.merge(incoming.lifecycle);
    }

    /// Counts the buff down by one turn.
    pub fn tick(&mut self) {
        self.lifecycle.tick();
    }
}

impl Factor for Buff {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn may_affect(&self, timing: Timing, baton: &Baton) -> bool {
        match self.kind {
            BuffKind::Dodge => timing == Timing::DEFEND && !baton.ignore_evade,
            BuffKind::Strength => timing == Timing::ATTACK,
            BuffKind::Protected { .. } => timing == Timing::MISLEAD,
            BuffKind::Combo => timing == Timing::DEFEND && baton.combo,
            BuffKind::Block => timing == Timing::DEFEND,
            BuffKind::Haste => timing == Timing::GET_SPEED,
        }
    }

    fn affect(&self, _timing: Timing, baton: &mut Baton) {
        match self.kind {
            BuffKind::Dodge => {
                if let Some(attack) = baton.attack.as_mut() {
                    attack.accuracy /= 2.0;
                    attack.reopen_miss();
                }
            }
            BuffKind::Strength => {
                if let Some(attack) = baton.attack.as_mut() {
                    attack.magnitude += 0.5;
                }
            }
            BuffKind::Protected { protector } => {
                baton.mislead_target = Some(protector);
            }
            BuffKind::Combo => {}
            BuffKind::Block => {
                if let Some(attack) = baton.attack.as_mut() {
                    attack.magnitude /= 2.0;
                }
            }
            BuffKind::Haste => {
                baton.add_stat(i64::from(self.stack()) * Self::HASTE_PER_STACK);
            }
        }
    }

    fn after_affect(&mut self, _timing: Timing, _baton: &Baton) {
        self.lifecycle.consume();
    }
}

impl fmt::Display for Buff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind.name(), self.stack(), self.duration())
    }
}

// =============================================================================
// Buffs
// =============================================================================

/// The buffs owned by one combatant, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffs {
    buffs: Vec<Buff>,
}

impl Buffs {
    /// An empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a buff, merging it into a same-named one if present.
    pub fn add(&mut self, buff: Buff) {
        match self
            .buffs
            .iter_mut()
            .find(|held| held.name_str() == buff.name_str())
        {
            Some(held) => held.absorb(buff),
            None => self.buffs.push(buff),
        }
    }

    /// The buff named `name`, if held.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Buff> {
        self.buffs.iter().find(|buff| buff.name_str() == name)
    }

    /// True when a buff named `name` is held.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Buff at `index`, in application order.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Buff> {
        self.buffs.get(index)
    }

    /// Mutable buff at `index`.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Buff> {
        self.buffs.get_mut(index)
    }

    /// Iterates in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Buff> + '_ {
        self.buffs.iter()
    }

    /// Number of distinct buffs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    /// True when no buff is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    /// Removes the buff named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Buff> {
        let index = self.buffs.iter().position(|buff| buff.name_str() == name)?;
        Some(self.buffs.remove(index))
    }

    /// Drops every expired buff.
    pub fn purge(&mut self) {
        self.buffs.retain(|buff| !buff.expired());
    }

    /// End of turn: every buff counts down, then expired ones are purged.
    pub fn tick(&mut self) {
        for buff in &mut self.buffs {
            buff.tick();
        }
        self.purge();
    }
}

impl fmt::Display for Buffs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, buff) in self.buffs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{buff}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Attack;

    fn defend_baton() -> Baton {
        Baton {
            attack: Some(Attack::new((10, 20))),
            ..Baton::default()
        }
    }

    mod buffs_tests {
        use super::*;

        #[test]
        fn test_strength_stacks() {
            let mut buffs = Buffs::new();
            buffs.add(Buff::strength(1, 1));
            buffs.add(Buff::strength(1, 1));
            assert_eq!(buffs.len(), 1);
            let strength = buffs.get("Strength").unwrap();
            assert_eq!(strength.stack(), 2);
            assert_eq!(strength.duration(), 1);
        }

        #[test]
        fn test_combo_resets() {
            let mut buffs = Buffs::new();
            buffs.add(Buff::new(
                BuffKind::Combo,
                Lifecycle::Refresh {
                    stack: 4,
                    duration: 6,
                    stackable: false,
                },
            ));
            buffs.add(Buff::combo(2));
            let combo = buffs.get("Combo").unwrap();
            assert_eq!(combo.stack(), 1);
            assert_eq!(combo.duration(), 2);
        }

        #[test]
        fn test_block_keeps_independent_timers() {
            let mut buffs = Buffs::new();
            buffs.add(Buff::block(1, 3));
            buffs.add(Buff::block(1, 1));
            buffs.add(Buff::block(1, 2));
            let Lifecycle::Independent { timers } = buffs.get("Block").unwrap().lifecycle() else {
                panic!("block is independent");
            };
            assert_eq!(timers.len(), 3);
        }

        #[test]
        fn test_protected_newer_protector_wins() {
            let mut buffs = Buffs::new();
            buffs.add(Buff::protected(CombatantId::new(1), 1, 2));
            buffs.add(Buff::protected(CombatantId::new(2), 1, 2));
            let held = buffs.get("Protected").unwrap();
            assert_eq!(
                held.kind(),
                &BuffKind::Protected {
                    protector: CombatantId::new(2)
                }
            );
            assert_eq!(held.stack(), 2);
        }

        #[test]
        fn test_tick_purges_expired() {
            let mut buffs = Buffs::new();
            buffs.add(Buff::strength(1, 1));
            buffs.add(Buff::dodge(1, 3));
            buffs.tick();
            assert!(!buffs.contains("Strength"));
            assert_eq!(buffs.get("Dodge").unwrap().duration(), 2);
        }

        #[test]
        fn test_display() {
            let mut buffs = Buffs::new();
            buffs.add(Buff::dodge(2, 3));
            buffs.add(Buff::combo(1));
            assert_eq!(buffs.to_string(), "[Dodge(2, 3), Combo(1, 1)]");
        }
    }

    mod factor_tests {
        use super::*;

        #[test]
        fn test_dodge_halves_accuracy() {
            let dodge = Buff::dodge(1, 1);
            let mut baton = defend_baton();
            assert!(dodge.may_affect(Timing::DEFEND, &baton));
            dodge.affect(Timing::DEFEND, &mut baton);
            let attack = baton.attack.unwrap();
            assert!((attack.accuracy - 0.5).abs() < f64::EPSILON);
        }

        #[test]
        fn test_dodge_skipped_when_ignoring_evade() {
            let dodge = Buff::dodge(1, 1);
            let mut baton = defend_baton();
            baton.ignore_evade = true;
            assert!(!dodge.may_affect(Timing::DEFEND, &baton));
        }

        #[test]
        fn test_strength_only_on_attack() {
            let strength = Buff::strength(1, 1);
            let mut baton = defend_baton();
            assert!(!strength.may_affect(Timing::DEFEND, &baton));
            assert!(strength.may_affect(Timing::ATTACK, &baton));
            strength.affect(Timing::ATTACK, &mut baton);
            assert!((baton.attack.unwrap().magnitude - 1.5).abs() < f64::EPSILON);
        }

        #[test]
        fn test_combo_needs_combo_flag() {
            let combo = Buff::combo(1);
            let mut baton = defend_baton();
            assert!(!combo.may_affect(Timing::DEFEND, &baton));
            baton.combo = true;
            assert!(combo.may_affect(Timing::DEFEND, &baton));
        }

        #[test]
        fn test_haste_scales_with_stack() {
            let haste = Buff::haste(3, 2);
            let mut baton = Baton::stat_query(5);
            haste.affect(Timing::GET_SPEED, &mut baton);
            assert_eq!(baton.stat.unwrap().value, 11);
        }

        #[test]
        fn test_after_affect_consumes() {
            let mut strength = Buff::strength(1, 1);
            strength.after_affect(Timing::ATTACK, &Baton::new());
            assert!(strength.expired());
        }
    }
}
