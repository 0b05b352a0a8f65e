//! Stock actions.
//!
//! Every constructor builds a fresh definition; wrap it with
//! [`Action::shared`] to hand it to several combatants.

use crate::action::{Action, Effect, PreRequirement, TargetRequirement};
use crate::baton::BatonPreset;
use crate::targeting::{Selection, Targeting};

use super::buffs;

/// Melee reach: the three front slots.
const FRONT: [usize; 3] = [0, 1, 2];
/// Ranged reach: everything but the very front.
const BACK: [usize; 3] = [1, 2, 3];
/// Every slot.
const ALL: [usize; 4] = [0, 1, 2, 3];

/// Sweeps the enemy front line and marks it for a combo.
#[must_use]
pub fn bash() -> Action {
    Action::new("Bash")
        .require(PreRequirement::SelfPosition(FRONT.to_vec()))
        .require(PreRequirement::ValidTarget(Targeting::area_enemy(&FRONT)))
        .effect(Targeting::area_enemy(&FRONT), Effect::damage(2, 4))
        .effect(
            Targeting::area_enemy(&FRONT),
            Effect::ApplyTargetBuff(buffs::combo()),
        )
        .with_preset(BatonPreset::ignore_evade())
}

/// A single cut; lighter against a comboed target, heavier otherwise.
#[must_use]
pub fn slash() -> Action {
    Action::new("Slash")
        .require(PreRequirement::SelfPosition(FRONT.to_vec()))
        .target(TargetRequirement::Position(Targeting::single_enemy(&FRONT)))
        .target(TargetRequirement::TargetAlive)
        .effect(
            Targeting::single_enemy(&FRONT),
            Effect::combo(Effect::damage(4, 6), Effect::damage(6, 9)),
        )
}

/// Monster melee attack.
#[must_use]
pub fn bite() -> Action {
    Action::new("Bite")
        .require(PreRequirement::SelfPosition(FRONT.to_vec()))
        .require(PreRequirement::ValidTarget(Targeting::single_enemy(&FRONT)))
        .target(TargetRequirement::Position(Targeting::single_enemy(&FRONT)))
        .target(TargetRequirement::TargetAlive)
        .effect(Targeting::single_enemy(&FRONT), Effect::damage(3, 7))
}

/// Braces for the next swing: one Strength on self.
#[must_use]
pub fn defend() -> Action {
    Action::new("Defend").effect(Targeting::itself(), Effect::AddSelfBuff(buffs::strength()))
}

/// Steps to another slot of the own row, at most `distance` away.
#[must_use]
pub fn move_action(distance: usize) -> Action {
    Action::new(format!("Move({distance})"))
        .target(TargetRequirement::Position(Targeting::except_itself(
            Selection::Single,
        )))
        .target(TargetRequirement::DistanceLimit(distance))
        .effect(
            Targeting::except_itself(Selection::Single),
            Effect::MoveTo { distance },
        )
}

/// Does nothing.
#[must_use]
pub fn skip() -> Action {
    Action::new("Skip")
}

/// Guards an ally (attacks on it land on the caster) and blocks.
#[must_use]
pub fn protect() -> Action {
    Action::new("Protect")
        .target(TargetRequirement::Position(Targeting::except_itself(
            Selection::Single,
        )))
        .target(TargetRequirement::TargetAlive)
        .effect(
            Targeting::except_itself(Selection::Single),
            Effect::ProtectTarget { stack: 3 },
        )
        .effect(Targeting::itself(), Effect::AddSelfBuff(buffs::block()))
}

/// Marks one enemy from the back line.
#[must_use]
pub fn aiming() -> Action {
    Action::new("Aiming")
        .require(PreRequirement::SelfPosition(BACK.to_vec()))
        .target(TargetRequirement::Position(Targeting::single_enemy(&BACK)))
        .target(TargetRequirement::TargetAlive)
        .effect(
            Targeting::single_enemy(&ALL),
            Effect::ApplyTargetBuff(buffs::combo()),
        )
        .with_preset(BatonPreset::ignore_evade())
}

/// A ranged shot; the follow-up on a marked target ignores evasion.
#[must_use]
pub fn shot() -> Action {
    Action::new("Shot")
        .require(PreRequirement::SelfPosition(BACK.to_vec()))
        .target(TargetRequirement::Position(Targeting::single_enemy(&BACK)))
        .target(TargetRequirement::TargetAlive)
        .effect(
            Targeting::single_enemy(&BACK),
            Effect::combo(
                Effect::Damage {
                    amount: (12, 16),
                    preset: Some(BatonPreset::ignore_evade()),
                },
                Effect::damage(6, 9),
            ),
        )
}

/// Restores `amount` HP to one living ally, the caster included.
#[must_use]
pub fn heal(amount: (i64, i64)) -> Action {
    Action::new("Heal")
        .target(TargetRequirement::Position(Targeting::single_ally(&ALL)))
        .target(TargetRequirement::TargetAlive)
        .effect(Targeting::single_ally(&ALL), Effect::Heal { amount })
}
