//! Combatants and their identifiers.
//!
//! This module provides:
//! - [`CombatantId`]: stable handle assigned by the [`Arena`](crate::arena::Arena)
//! - [`Combatant`]: stats, buffs, loadout and innate actions
//!
//! # Factor Dispatch
//!
//! A combatant owns both halves of its factor set (buffs and worn items) and
//! runs the dispatch protocol described in [`crate::factor`] over them.
//! Max HP and speed are never cached: every read folds the current factors
//! into the base value through an observational query that leaves buff
//! stacks untouched.
//!
//! # Example
//!
//! ```
//! use vanguard_core::buff::Buff;
//! use vanguard_core::combatant::Combatant;
//!
//! let scout = Combatant::new("scout", 12, 20, 5).with_buff(Buff::haste(2, 3));
//! assert_eq!(scout.base_speed(), 5);
//! assert_eq!(scout.speed(), 9);
//! assert_eq!(scout.buffs().get("Haste").unwrap().stack(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::baton::Baton;
use crate::buff::{Buff, Buffs};
use crate::equipment::{Equipage, Equipment, Slot};
use crate::error::EquipError;
use crate::factor::{self, Factor};
use crate::timing::Timing;

/// Unique identifier for a combatant within one arena.
///
/// # Example
///
/// ```
/// use vanguard_core::combatant::CombatantId;
///
/// let id = CombatantId::new(3);
/// assert_eq!(id.as_u64(), 3);
/// assert_eq!(format!("{id:?}"), "CombatantId(3)");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which factor collection a dispatch key points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FactorKey {
    Buff(usize),
    Gear(usize),
}

// =============================================================================
// Combatant
// =============================================================================

/// A fighter: stats, buffs, worn items and innate actions.
#[derive(Debug, Clone)]
pub struct Combatant {
    name: String,
    cur_hp: i64,
    base_max_hp: i64,
    base_speed: i64,
    buffs: Buffs,
    equipage: Equipage,
    innate: Vec<Arc<Action>>,
}

impl Combatant {
    /// Creates a combatant with no buffs, items or actions.
    #[must_use]
    pub fn new(name: impl Into<String>, cur_hp: i64, max_hp: i64, speed: i64) -> Self {
        Self {
            name: name.into(),
            cur_hp,
            base_max_hp: max_hp,
            base_speed: speed,
            buffs: Buffs::new(),
            equipage: Equipage::new(),
            innate: Vec::new(),
        }
    }

    /// Starts with `buff` already applied.
    #[must_use]
    pub fn with_buff(mut self, buff: Buff) -> Self {
        self.buffs.add(buff);
        self
    }

    /// Adds an innate action.
    #[must_use]
    pub fn with_action(mut self, action: Arc<Action>) -> Self {
        self.innate.push(action);
        self
    }

    /// Starts wearing `item`.
    ///
    /// # Errors
    ///
    /// [`EquipError::SlotConflict`] when a needed slot is taken.
    pub fn with_equipment(mut self, item: Equipment) -> Result<Self, EquipError> {
        self.equipage.equip(item)?;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Stats
    // -------------------------------------------------------------------------

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current HP. May be negative after a heavy hit.
    #[must_use]
    pub const fn cur_hp(&self) -> i64 {
        self.cur_hp
    }

    /// Max HP before factors.
    #[must_use]
    pub const fn base_max_hp(&self) -> i64 {
        self.base_max_hp
    }

    /// Speed before factors.
    #[must_use]
    pub const fn base_speed(&self) -> i64 {
        self.base_speed
    }

    /// Max HP with every factor folded in.
    #[must_use]
    pub fn max_hp(&self) -> i64 {
        self.stat(Timing::GET_MAX_HP, self.base_max_hp)
    }

    /// Speed with every factor folded in.
    #[must_use]
    pub fn speed(&self) -> i64 {
        self.stat(Timing::GET_SPEED, self.base_speed)
    }

    /// Dead iff HP is at or below zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.cur_hp <= 0
    }

    /// Negation of [`Combatant::is_dead`].
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Loses `damage` HP.
    pub fn suffer(&mut self, damage: i64) {
        self.cur_hp -= damage;
    }

    /// Restores up to `amount` HP, never above the queried max. Returns the
    /// HP actually gained.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let max = self.max_hp();
        let before = self.cur_hp;
        if before < max {
            self.cur_hp = (before + amount.max(0)).min(max);
        }
        self.cur_hp - before
    }

    fn stat(&self, timing: Timing, base: i64) -> i64 {
        let mut baton = Baton::stat_query(base);
        self.query(timing, &mut baton);
        baton.stat.map_or(base, |stat| stat.value)
    }

    // -------------------------------------------------------------------------
    // Factors
    // -------------------------------------------------------------------------

    /// Held buffs.
    #[must_use]
    pub fn buffs(&self) -> &Buffs {
        &self.buffs
    }

    /// Worn items.
    #[must_use]
    pub fn equipage(&self) -> &Equipage {
        &self.equipage
    }

    /// True when a buff named `name` is held.
    #[must_use]
    pub fn has_buff(&self, name: &str) -> bool {
        self.buffs.contains(name)
    }

    fn factors(&self) -> impl Iterator<Item = (FactorKey, &dyn Factor)> + '_ {
        let buffs = self
            .buffs
            .iter()
            .enumerate()
            .map(|(i, buff)| (FactorKey::Buff(i), buff as &dyn Factor));
        let gear = self
            .equipage
            .iter()
            .enumerate()
            .map(|(i, item)| (FactorKey::Gear(i), item as &dyn Factor));
        buffs.chain(gear)
    }

    fn factor(&self, key: FactorKey) -> Option<&dyn Factor> {
        match key {
            FactorKey::Buff(i) => self.buffs.at(i).map(|buff| buff as &dyn Factor),
            FactorKey::Gear(i) => self.equipage.at(i).map(|item| item as &dyn Factor),
        }
    }

    /// Selects and applies the reacting factors; returns what fired.
    fn modify(&self, timing: Timing, baton: &mut Baton) -> Vec<FactorKey> {
        let fired = factor::schedule(self.factors(), timing, baton);
        for key in &fired {
            if let Some(factor) = self.factor(*key) {
                factor.affect(timing, baton);
            }
        }
        fired
    }

    /// Runs the selection and `affect` phases only. Nothing decays.
    pub fn query(&self, timing: Timing, baton: &mut Baton) {
        let fired = self.modify(timing, baton);
        if !fired.is_empty() {
            tracing::trace!(combatant = %self.name, ?timing, fired = fired.len(), "query");
        }
    }

    /// Full dispatch: affect, after-affect, then purge expired buffs.
    pub fn dispatch(&mut self, timing: Timing, baton: &mut Baton) {
        let fired = self.modify(timing, baton);
        if fired.is_empty() {
            return;
        }
        tracing::debug!(combatant = %self.name, ?timing, fired = fired.len(), "dispatch");
        for key in fired {
            match key {
                FactorKey::Buff(i) => {
                    if let Some(buff) = self.buffs.at_mut(i) {
                        buff.after_affect(timing, baton);
                    }
                }
                FactorKey::Gear(i) => {
                    if let Some(item) = self.equipage.at_mut(i) {
                        item.after_affect(timing, baton);
                    }
                }
            }
        }
        self.buffs.purge();
    }

    /// Applies `buff`, announcing it with a `BUFFED` dispatch first.
    pub fn add_buff(&mut self, buff: Buff, baton: &mut Baton) {
        baton.applied_buff = Some(buff.name_str().to_string());
        self.dispatch(Timing::BUFFED, baton);
        tracing::debug!(combatant = %self.name, buff = %buff, "buff applied");
        self.buffs.add(buff);
        baton.applied_buff = None;
    }

    /// End of the holder's turn: buffs count down and expire.
    pub fn turn_end(&mut self) {
        self.buffs.tick();
    }

    /// Wears `item` and dispatches `EQUIP`.
    ///
    /// # Errors
    ///
    /// [`EquipError::SlotConflict`] when a needed slot is taken.
    pub fn equip(&mut self, item: Equipment) -> Result<(), EquipError> {
        self.equipage.equip(item)?;
        self.dispatch(Timing::EQUIP, &mut Baton::new());
        Ok(())
    }

    /// Dispatches `UNEQUIP`, then removes the item occupying `slot`.
    ///
    /// # Errors
    ///
    /// [`EquipError::SlotEmpty`] when nothing occupies the slot.
    pub fn unequip(&mut self, slot: Slot) -> Result<Equipment, EquipError> {
        if !self.equipage.is_occupied(slot) {
            return Err(EquipError::SlotEmpty(slot));
        }
        self.dispatch(Timing::UNEQUIP, &mut Baton::new());
        self.equipage.unequip(slot)
    }

    /// Dispatches `UNEQUIP`, then removes the item called `name`.
    ///
    /// # Errors
    ///
    /// [`EquipError::NotEquipped`] when no worn item has that name.
    pub fn unequip_named(&mut self, name: &str) -> Result<Equipment, EquipError> {
        if !self.equipage.contains(name) {
            return Err(EquipError::NotEquipped(name.to_string()));
        }
        self.dispatch(Timing::UNEQUIP, &mut Baton::new());
        self.equipage.unequip_named(name)
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Every action available: item actions first, then innate ones.
    #[must_use]
    pub fn actions(&self) -> Vec<Arc<Action>> {
        self.equipage
            .iter()
            .flat_map(|item| item.actions().iter().cloned())
            .chain(self.innate.iter().cloned())
            .collect()
    }

    /// The available action called `name`.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<Arc<Action>> {
        self.actions().into_iter().find(|action| action.name() == name)
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.name, self.cur_hp, self.max_hp())?;
        if !self.buffs.is_empty() {
            write!(f, " {}", self.buffs)?;
        }
        Ok(())
    }
}
