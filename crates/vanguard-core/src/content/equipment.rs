//! Stock items.

use crate::equipment::{Equipment, Passive, Slot};

use super::actions;

/// One-handed blade: Bash and Slash.
#[must_use]
pub fn sword() -> Equipment {
    Equipment::new("Sword", [Slot::MainHand])
        .with_action(actions::bash().shared())
        .with_action(actions::slash().shared())
}

/// Off-hand shield: Defend, halves incoming crit chance, +20% max HP.
#[must_use]
pub fn shield() -> Equipment {
    Equipment::new("Shield", [Slot::OffHand])
        .with_action(actions::defend().shared())
        .with_passive(Passive::CritGuard)
        .with_passive(Passive::MaxHpPercent(20))
}

/// Two-handed bow: Aiming and Shot.
#[must_use]
pub fn bow() -> Equipment {
    Equipment::new("Bow", [Slot::MainHand, Slot::OffHand])
        .with_action(actions::aiming().shared())
        .with_action(actions::shot().shared())
}

/// Light charm worn around the neck: +2 speed.
#[must_use]
pub fn feather_charm() -> Equipment {
    Equipment::new("Feather Charm", [Slot::Amulet]).with_passive(Passive::Speed(2))
}
