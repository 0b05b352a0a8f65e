//! Combatant templates and the demo battle.

use crate::battle::Battle;
use crate::brain::RandomBrain;
use crate::buff::Buff;
use crate::combatant::{Combatant, CombatantId};
use crate::config::BattleConfig;
use crate::error::{ActionError, BattleError, EquipError};
use crate::targeting::{Position, Side};

use super::{actions, buffs, equipment};

/// A character: Move(2) and Skip on top of whatever it wears.
#[must_use]
pub fn character(name: &str, cur_hp: i64, max_hp: i64, speed: i64) -> Combatant {
    Combatant::new(name, cur_hp, max_hp, speed)
        .with_action(actions::move_action(2).shared())
        .with_action(actions::skip().shared())
}

/// A sword-and-board character.
///
/// # Errors
///
/// Never in practice; equipping is fallible in general.
pub fn knight(name: &str) -> Result<Combatant, EquipError> {
    character(name, 20, 20, 7)
        .with_equipment(equipment::sword())?
        .with_equipment(equipment::shield())
}

/// A bow-wielding character.
///
/// # Errors
///
/// Never in practice; equipping is fallible in general.
pub fn archer(name: &str) -> Result<Combatant, EquipError> {
    character(name, 18, 18, 4).with_equipment(equipment::bow())
}

/// A wild dog: quick, evasive, bites and shuffles one slot at a time.
#[must_use]
pub fn wild_dog(name: &str) -> Combatant {
    Combatant::new(name, 24, 24, 9)
        .with_buff(buffs::dodge())
        .with_action(actions::bite().shared())
        .with_action(actions::move_action(1).shared())
}

/// Seed of the brain driving `id` in a battle seeded with `seed`.
#[must_use]
pub fn brain_seed(seed: u64, id: CombatantId) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(id.as_u64() + 1)
}

/// Four adventurers against three wild dogs, every side driven by a
/// [`RandomBrain`].
///
/// # Errors
///
/// [`BattleError::Equip`] or [`BattleError::Arena`] if the roster cannot be
/// assembled.
pub fn demo_battle(config: &BattleConfig) -> Result<Battle, BattleError> {
    let party = [
        character("a", 13, 20, 3)
            .with_buff(Buff::dodge(1, 3))
            .with_buff(Buff::strength(1, 3))
            .with_equipment(equipment::sword())?,
        character("b", 13, 20, 7)
            .with_buff(Buff::strength(1, 3))
            .with_equipment(equipment::sword())?
            .with_equipment(equipment::shield())?,
        character("c", 12, 20, 9)
            .with_equipment(equipment::sword())?
            .with_equipment(equipment::feather_charm())?,
        character("d", 18, 20, 2).with_equipment(equipment::bow())?,
    ];
    let pack = [(wild_dog("e"), 0), (wild_dog("f"), 1), (wild_dog("g"), 3)];

    let mut battle = Battle::new(*config);
    let mut placed = Vec::new();
    for (slot, member) in party.into_iter().enumerate() {
        let seat = Position::new(Side::Left, slot).map_err(ActionError::from)?;
        placed.push(battle.arena_mut().place(member, seat)?);
    }
    for (dog, slot) in pack {
        let seat = Position::new(Side::Right, slot).map_err(ActionError::from)?;
        placed.push(battle.arena_mut().place(dog, seat)?);
    }
    for id in placed {
        battle.set_brain(id, RandomBrain::new(brain_seed(config.seed, id)))?;
    }
    tracing::debug!(seed = config.seed, combatants = battle.arena().len(), "demo battle ready");
    Ok(battle)
}
