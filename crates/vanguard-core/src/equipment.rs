//! Equipment and loadouts.
//!
//! An [`Equipment`] item occupies one or more [`Slot`]s, contributes actions
//! to its wearer and reacts to combat events through passive factor
//! behaviour. Items never expire; they leave a loadout only by explicit
//! unequip.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::baton::Baton;
use crate::error::EquipError;
use crate::factor::Factor;
use crate::timing::Timing;

/// A loadout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    /// Weapon hand.
    MainHand,
    /// Shield hand.
    OffHand,
    /// Neck.
    Amulet,
    /// Body.
    Armor,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::MainHand => "main-hand",
            Slot::OffHand => "off-hand",
            Slot::Amulet => "amulet",
            Slot::Armor => "armor",
        };
        write!(f, "{name}")
    }
}

/// Always-on behaviour of an equipped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Passive {
    /// Halves the crit chance of incoming attacks.
    CritGuard,
    /// Adds a percentage of base max HP.
    MaxHpPercent(i64),
    /// Adds flat speed.
    Speed(i64),
}

impl Passive {
    const fn timing(self) -> Timing {
        match self {
            Passive::CritGuard => Timing::DEFEND,
            Passive::MaxHpPercent(_) => Timing::GET_MAX_HP,
            Passive::Speed(_) => Timing::GET_SPEED,
        }
    }

    fn apply(self, baton: &mut Baton) {
        match self {
            Passive::CritGuard => {
                if let Some(attack) = baton.attack.as_mut() {
                    attack.crit /= 2.0;
                }
            }
            Passive::MaxHpPercent(percent) => {
                if let Some(base) = baton.stat.map(|stat| stat.base) {
                    baton.add_stat(base * percent / 100);
                }
            }
            Passive::Speed(amount) => baton.add_stat(amount),
        }
    }
}

// =============================================================================
// Equipment
// =============================================================================

/// An item that can be worn.
#[derive(Debug, Clone)]
pub struct Equipment {
    name: String,
    occupation: Vec<Slot>,
    actions: Vec<Arc<Action>>,
    passives: Vec<Passive>,
}

impl Equipment {
    /// An item occupying `occupation`, with no actions or passives yet.
    #[must_use]
    pub fn new(name: impl Into<String>, occupation: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            name: name.into(),
            occupation: occupation.into_iter().collect(),
            actions: Vec::new(),
            passives: Vec::new(),
        }
    }

    /// Adds an action granted to the wearer.
    #[must_use]
    pub fn with_action(mut self, action: Arc<Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds a passive behaviour.
    #[must_use]
    pub fn with_passive(mut self, passive: Passive) -> Self {
        self.passives.push(passive);
        self
    }

    /// Item name.
    #[must_use]
    pub fn item_name(&self) -> &str {
        &self.name
    }

    /// Slots the item occupies.
    #[must_use]
    pub fn occupation(&self) -> &[Slot] {
        &self.occupation
    }

    /// Actions granted to the wearer.
    #[must_use]
    pub fn actions(&self) -> &[Arc<Action>] {
        &self.actions
    }

    /// Passive behaviours.
    #[must_use]
    pub fn passives(&self) -> &[Passive] {
        &self.passives
    }
}

impl Factor for Equipment {
    fn name(&self) -> &str {
        &self.name
    }

    fn may_affect(&self, timing: Timing, _baton: &Baton) -> bool {
        self.passives.iter().any(|p| p.timing() == timing)
    }

    fn affect(&self, timing: Timing, baton: &mut Baton) {
        for passive in self.passives.iter().filter(|p| p.timing() == timing) {
            passive.apply(baton);
        }
    }
}

// =============================================================================
// Equipage
// =============================================================================

/// The items a combatant wears, in equip order.
#[derive(Debug, Clone, Default)]
pub struct Equipage {
    items: Vec<Equipment>,
}

impl Equipage {
    /// An empty loadout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The item occupying `slot`.
    #[must_use]
    pub fn in_slot(&self, slot: Slot) -> Option<&Equipment> {
        self.items.iter().find(|item| item.occupation.contains(&slot))
    }

    /// True when `slot` is taken.
    #[must_use]
    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.in_slot(slot).is_some()
    }

    /// Wears `item`.
    ///
    /// # Errors
    ///
    /// [`EquipError::SlotConflict`] naming the first occupied slot the item
    /// needs.
    pub fn equip(&mut self, item: Equipment) -> Result<(), EquipError> {
        if let Some(slot) = item.occupation.iter().find(|s| self.is_occupied(**s)) {
            return Err(EquipError::SlotConflict(*slot));
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes the item occupying `slot`.
    ///
    /// # Errors
    ///
    /// [`EquipError::SlotEmpty`] when nothing occupies the slot.
    pub fn unequip(&mut self, slot: Slot) -> Result<Equipment, EquipError> {
        let index = self
            .items
            .iter()
            .position(|item| item.occupation.contains(&slot))
            .ok_or(EquipError::SlotEmpty(slot))?;
        Ok(self.items.remove(index))
    }

    /// Removes the item called `name`.
    ///
    /// # Errors
    ///
    /// [`EquipError::NotEquipped`] when no worn item has that name.
    pub fn unequip_named(&mut self, name: &str) -> Result<Equipment, EquipError> {
        let index = self
            .items
            .iter()
            .position(|item| item.name == name)
            .ok_or_else(|| EquipError::NotEquipped(name.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// True when an item called `name` is worn.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    /// Item at `index`, in equip order.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Equipment> {
        self.items.get(index)
    }

    /// Mutable item at `index`.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Equipment> {
        self.items.get_mut(index)
    }

    /// Iterates in equip order.
    pub fn iter(&self) -> impl Iterator<Item = &Equipment> + '_ {
        self.items.iter()
    }

    /// Number of worn items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is worn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
