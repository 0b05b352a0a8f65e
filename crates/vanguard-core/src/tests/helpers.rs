//! Test helper functions for setting up arenas and battles.
//!
//! This module provides factory functions and setup utilities that make
//! writing scenario tests more ergonomic and consistent.

use crate::action::{Action, Effect, TargetRequirement};
use crate::arena::Arena;
use crate::battle::{Battle, TurnReport};
use crate::combatant::{Combatant, CombatantId};
use crate::config::BattleConfig;
use crate::content::roster;
use crate::targeting::{Position, Side, Targeting, ARENA_WIDTH};

// =============================================================================
// Positions
// =============================================================================

/// Shorthand for a position known to be valid.
pub fn at(side: Side, slot: usize) -> Position {
    Position::new(side, slot).expect("slot within the arena")
}

// =============================================================================
// Combatants
// =============================================================================

/// A single-target attack dealing exactly `amount` to any enemy slot.
pub fn fixed_strike(amount: i64) -> Action {
    let reach: Vec<usize> = (0..ARENA_WIDTH).collect();
    Action::new("Strike")
        .target(TargetRequirement::Position(Targeting::single_enemy(&reach)))
        .target(TargetRequirement::TargetAlive)
        .effect(
            Targeting::single_enemy(&reach),
            Effect::damage(amount, amount),
        )
}

/// A bare combatant carrying [`fixed_strike`].
pub fn striker(name: &str, cur_hp: i64, max_hp: i64, speed: i64, amount: i64) -> Combatant {
    Combatant::new(name, cur_hp, max_hp, speed).with_action(fixed_strike(amount).shared())
}

/// Places `combatants` left to right on `side`, returning their ids.
pub fn line_up(arena: &mut Arena, side: Side, combatants: Vec<Combatant>) -> Vec<CombatantId> {
    combatants
        .into_iter()
        .enumerate()
        .map(|(slot, c)| arena.place(c, at(side, slot)).expect("free slot"))
        .collect()
}

// =============================================================================
// Battles
// =============================================================================

/// Plays the demo battle for `seed` to the end and returns it.
pub fn played_demo(seed: u64, max_rounds: u32) -> Battle {
    let config = BattleConfig::default()
        .with_seed(seed)
        .with_max_rounds(max_rounds);
    let mut battle = roster::demo_battle(&config).expect("demo roster");
    battle.run().expect("demo battle runs");
    battle
}

/// HP of every combatant in id order.
pub fn hp_table(arena: &Arena) -> Vec<(CombatantId, i64)> {
    arena
        .combatants()
        .map(|(id, c)| (id, c.cur_hp()))
        .collect()
}

/// The turn log rendered as text.
pub fn transcript(log: &[TurnReport]) -> Vec<String> {
    log.iter().map(ToString::to_string).collect()
}
