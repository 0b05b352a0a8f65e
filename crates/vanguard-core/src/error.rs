//! Error taxonomy for the combat core.
//!
//! Requirement checks that merely fail (`Action::check`, pre-requirements)
//! are plain `false` results, not errors. The enums here cover contract
//! violations that must reach the caller: an action that cannot legally
//! proceed, a slot outside the arena, a loadout conflict.

use crate::combatant::CombatantId;
use crate::equipment::Slot;
use crate::targeting::Position;

/// Failure to resolve a targeting spec into something an action may use.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetingError {
    /// Every candidate slot was filtered out.
    #[error("no valid target")]
    NoValidTarget,
    /// A single-target effect was executed without a chosen target.
    #[error("a single-target action needs a chosen target")]
    TargetRequired,
    /// An area-only action was handed a chosen target.
    #[error("area actions cannot be aimed")]
    AreaNotAimable,
    /// A single-target action was handed more than one slot.
    #[error("a single-target action takes exactly one slot, got {count}")]
    TooManyTargets {
        /// Number of slots left after validation.
        count: usize,
    },
    /// A slot index outside `[0, ARENA_WIDTH)`.
    #[error("slot {slot} is outside the arena")]
    OutOfRange {
        /// The offending slot index.
        slot: usize,
    },
    /// The caster is not placed on either side.
    #[error("combatant is not placed in the arena")]
    NotInArena,
}

/// Loadout failures raised by equip and unequip.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EquipError {
    /// The slot is already occupied by another item.
    #[error("slot {0} is already occupied")]
    SlotConflict(Slot),
    /// Nothing is equipped in the slot.
    #[error("slot {0} is empty")]
    SlotEmpty(Slot),
    /// No equipped item carries this name.
    #[error("{0} is not equipped")]
    NotEquipped(String),
}

/// Arena bookkeeping failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// Placement into a slot that already holds a combatant.
    #[error("slot {0} is already occupied")]
    SlotOccupied(Position),
    /// A slot index outside `[0, ARENA_WIDTH)`.
    #[error("slot {slot} is outside the arena")]
    OutOfRange {
        /// The offending slot index.
        slot: usize,
    },
    /// The id does not name a combatant owned by this arena.
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),
}

/// Failures surfaced by `Action::check_target` and `Action::execute`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Target resolution failed.
    #[error(transparent)]
    Targeting(#[from] TargetingError),
    /// A move further than the action allows.
    #[error("cannot move from slot {from} to slot {to} (limit {distance})")]
    MoveOutOfRange {
        /// Slot the mover started in.
        from: usize,
        /// Requested destination slot.
        to: usize,
        /// Maximum distance allowed by the action.
        distance: usize,
    },
    /// The acting combatant is not owned by the arena.
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),
    /// The arena refused a mutation requested by an effect.
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Failures surfaced by the battle scheduler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// The chosen action failed to execute.
    #[error(transparent)]
    Action(#[from] ActionError),
    /// The arena refused a scheduler request.
    #[error(transparent)]
    Arena(#[from] ArenaError),
    /// A roster could not be equipped.
    #[error(transparent)]
    Equip(#[from] EquipError),
    /// The decision named an action its actor cannot cast right now.
    #[error("{actor} cannot cast {action}")]
    NotCastable {
        /// The acting combatant.
        actor: CombatantId,
        /// Name of the rejected action.
        action: String,
    },
    /// `step` was called after the battle ended.
    #[error("battle is already over")]
    Finished,
}
