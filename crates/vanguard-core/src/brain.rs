//! Decision-making collaborators.
//!
//! A [`Brain`] is asked once per active turn what its combatant should do.
//! It sees the arena read-only and answers with a [`Decision`], or `None`
//! to pass. The scheduler re-validates the answer, so a brain that returns
//! something illegal only wastes its own turn.
//!
//! # Stock brains
//!
//! - [`RandomBrain`]: picks a random castable action, then a random legal
//!   target for it
//! - [`ScriptedBrain`]: replays a fixed queue of decisions; for tests and
//!   demos
//!
//! # Example
//!
//! ```
//! use vanguard_core::arena::Arena;
//! use vanguard_core::brain::{Brain, ScriptedBrain};
//! use vanguard_core::combatant::Combatant;
//! use vanguard_core::content::actions;
//! use vanguard_core::targeting::{Position, Side};
//!
//! let mut arena = Arena::new();
//! let hero = arena
//!     .place(
//!         Combatant::new("hero", 10, 10, 1).with_action(actions::skip().shared()),
//!         Position::new(Side::Left, 0).unwrap(),
//!     )
//!     .unwrap();
//!
//! let mut brain = ScriptedBrain::new().then("Skip", None);
//! let decision = brain.decide(hero, &arena).unwrap();
//! assert_eq!(decision.action.name(), "Skip");
//! assert!(brain.decide(hero, &arena).is_none());
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use crate::action::{Action, Decision};
use crate::arena::Arena;
use crate::combatant::CombatantId;
use crate::rng::{RandomSource, SeededRandom};
use crate::targeting::Targeting;

/// Chooses what a combatant does on its turn.
pub trait Brain: Send {
    /// Returns the decision for `actor`, or `None` to pass the turn.
    fn decide(&mut self, actor: CombatantId, arena: &Arena) -> Option<Decision>;
}

/// Actions of `actor` whose pre-requirements currently hold, in the
/// combatant's action order.
#[must_use]
pub fn castable_actions(actor: CombatantId, arena: &Arena) -> Vec<Arc<Action>> {
    arena.get(actor).map_or_else(Vec::new, |combatant| {
        combatant
            .actions()
            .into_iter()
            .filter(|action| action.check(arena, actor))
            .collect()
    })
}

// =============================================================================
// RandomBrain
// =============================================================================

/// Uniformly random choice among castable actions and legal targets.
///
/// An action whose target resolution fails is dropped and another one is
/// drawn, until one succeeds or none is left.
#[derive(Debug, Clone)]
pub struct RandomBrain {
    rng: SeededRandom,
}

impl RandomBrain {
    /// A brain drawing from its own stream seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededRandom::new(seed),
        }
    }
}

impl Brain for RandomBrain {
    fn decide(&mut self, actor: CombatantId, arena: &Arena) -> Option<Decision> {
        let mut actions = castable_actions(actor, arena);
        while !actions.is_empty() {
            let action = actions.remove(self.rng.choice(actions.len()));
            match action.check_target(arena, actor, None) {
                Ok(legal) => {
                    let target = if action.needs_target() {
                        legal.map(|spec| spec.random_choose(&mut self.rng))
                    } else {
                        None
                    };
                    return Some(Decision::new(action, target));
                }
                Err(err) => {
                    tracing::trace!(%actor, action = action.name(), %err, "dropping action");
                }
            }
        }
        None
    }
}

// =============================================================================
// ScriptedBrain
// =============================================================================

/// Replays queued `(action name, target)` pairs, one per turn.
///
/// A step naming an action the combatant does not have yields `None` for
/// that turn. Once the queue runs dry the brain passes.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBrain {
    script: VecDeque<(String, Option<Targeting>)>,
}

impl ScriptedBrain {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    #[must_use]
    pub fn then(mut self, action: impl Into<String>, target: Option<Targeting>) -> Self {
        self.script.push_back((action.into(), target));
        self
    }

    /// Steps still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Brain for ScriptedBrain {
    fn decide(&mut self, actor: CombatantId, arena: &Arena) -> Option<Decision> {
        let (name, target) = self.script.pop_front()?;
        let action = arena.get(actor)?.action(&name)?;
        Some(Decision::new(action, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::content::{actions, roster};
    use crate::targeting::{Position, Side};

    fn at(side: Side, slot: usize) -> Position {
        Position::new(side, slot).unwrap()
    }

    fn duel() -> (Arena, CombatantId, CombatantId) {
        let mut arena = Arena::new();
        let knight = arena
            .place(roster::knight("knight").unwrap(), at(Side::Left, 0))
            .unwrap();
        let dog = arena
            .place(roster::wild_dog("dog"), at(Side::Right, 0))
            .unwrap();
        (arena, knight, dog)
    }

    mod castable_tests {
        use super::*;

        #[test]
        fn test_castable_filters_on_pre_requirements() {
            let (mut arena, knight, _) = duel();
            let names = |arena: &Arena| -> Vec<String> {
                castable_actions(knight, arena)
                    .iter()
                    .map(|a| a.name().to_string())
                    .collect()
            };
            assert!(names(&arena).contains(&"Bash".to_string()));

            arena.move_to(knight, 3).unwrap();
            let far = names(&arena);
            assert!(!far.contains(&"Bash".to_string()));
            assert!(far.contains(&"Skip".to_string()));
        }

        #[test]
        fn test_unknown_actor_has_nothing() {
            let (arena, _, _) = duel();
            assert!(castable_actions(CombatantId::new(99), &arena).is_empty());
        }
    }

    mod random_tests {
        use super::*;

        #[test]
        fn test_decisions_are_legal() {
            let (arena, knight, _) = duel();
            let mut brain = RandomBrain::new(3);
            for _ in 0..50 {
                let decision = brain.decide(knight, &arena).unwrap();
                assert!(decision.action.check(&arena, knight));
                if decision.action.needs_target() {
                    let target = decision.target.clone().unwrap();
                    assert_eq!(target.slots().len(), 1);
                    assert!(decision
                        .action
                        .check_target(&arena, knight, Some(target))
                        .is_ok());
                } else {
                    assert!(decision.target.is_none());
                }
            }
        }

        #[test]
        fn test_same_seed_same_choices() {
            let (arena, knight, _) = duel();
            let mut a = RandomBrain::new(11);
            let mut b = RandomBrain::new(11);
            for _ in 0..20 {
                let left = a.decide(knight, &arena).map(|d| d.to_string());
                let right = b.decide(knight, &arena).map(|d| d.to_string());
                assert_eq!(left, right);
            }
        }

        #[test]
        fn test_passes_without_actions() {
            let mut arena = Arena::new();
            let rock = arena
                .place(Combatant::new("rock", 5, 5, 0), at(Side::Left, 0))
                .unwrap();
            assert!(RandomBrain::new(1).decide(rock, &arena).is_none());
        }

        #[test]
        fn test_drops_actions_without_targets() {
            let mut arena = Arena::new();
            // alone in its row, Protect has nobody to guard
            let loner = arena
                .place(
                    Combatant::new("loner", 5, 5, 0).with_action(actions::protect().shared()),
                    at(Side::Left, 0),
                )
                .unwrap();
            assert!(RandomBrain::new(1).decide(loner, &arena).is_none());
        }
    }

    mod scripted_tests {
        use super::*;

        #[test]
        fn test_replays_in_order() {
            let (arena, knight, _) = duel();
            let aim = Targeting::single_enemy(&[0]);
            let mut brain = ScriptedBrain::new()
                .then("Slash", Some(aim.clone()))
                .then("Bash", None);
            assert_eq!(brain.remaining(), 2);

            let first = brain.decide(knight, &arena).unwrap();
            assert_eq!(first.action.name(), "Slash");
            assert_eq!(first.target, Some(aim));
            assert_eq!(brain.decide(knight, &arena).unwrap().action.name(), "Bash");
            assert!(brain.decide(knight, &arena).is_none());
        }

        #[test]
        fn test_unknown_action_passes() {
            let (arena, knight, _) = duel();
            let mut brain = ScriptedBrain::new().then("Fireball", None);
            assert!(brain.decide(knight, &arena).is_none());
            assert_eq!(brain.remaining(), 0);
        }
    }
}
