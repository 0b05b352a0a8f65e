//! Actions and their execution pipeline.
//!
//! An [`Action`] is a shared, stateless definition made of:
//! - ordered [`PreRequirement`]s: may the actor cast it at all?
//! - ordered [`TargetRequirement`]s: which targets are legal?
//! - ordered `(Targeting, Effect)` pairs: what happens, and to whom
//!
//! # Execution
//!
//! [`Action::execute`] validates the chosen target against the effect pairs
//! before any effect runs, so a contract violation never leaves an action
//! half-applied. It then creates one [`Baton`], applies the action's preset
//! and runs every pair in order:
//!
//! - Single pairs act on the chosen target
//! - Area pairs act on their declared spec resolved at the actor's position
//!
//! # Example
//!
//! ```
//! use vanguard_core::action::{Action, Effect, TargetRequirement};
//! use vanguard_core::targeting::Targeting;
//!
//! let jab = Action::new("Jab")
//!     .target(TargetRequirement::Position(Targeting::single_enemy(&[0, 1])))
//!     .target(TargetRequirement::TargetAlive)
//!     .effect(Targeting::single_enemy(&[0, 1]), Effect::damage(3, 5));
//!
//! assert!(jab.needs_target());
//! assert_eq!(jab.to_string(), "Jab");
//! ```

mod effect;
mod requirement;

pub use effect::{Effect, PROTECT_DURATION};
pub use requirement::{PreRequirement, TargetRequirement};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::baton::{Baton, BatonPreset};
use crate::combat::AttackReport;
use crate::combatant::CombatantId;
use crate::error::{ActionError, TargetingError};
use crate::rng::RandomSource;
use crate::targeting::{Position, Targeting, ARENA_WIDTH};

use effect::EffectContext;

// =============================================================================
// Reports
// =============================================================================

/// HP restored to one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealReport {
    /// Who was healed.
    pub target: CombatantId,
    /// HP actually gained after clamping.
    pub amount: i64,
}

/// A buff applied to one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffReport {
    /// Who received it.
    pub target: CombatantId,
    /// Buff name.
    pub buff: String,
}

/// A completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    /// Who moved.
    pub combatant: CombatantId,
    /// Starting slot.
    pub from: usize,
    /// Destination slot.
    pub to: usize,
    /// Combatants shifted one slot to make room.
    pub displaced: Vec<CombatantId>,
}

/// Everything one executed action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    /// The actor.
    pub actor: CombatantId,
    /// Action name.
    pub action: String,
    /// The chosen target, if any.
    pub target: Option<Targeting>,
    /// Attacks in resolution order.
    pub attacks: Vec<AttackReport>,
    /// Heals in resolution order.
    pub heals: Vec<HealReport>,
    /// Buffs in application order.
    pub buffs: Vec<BuffReport>,
    /// Moves in order.
    pub moves: Vec<MoveReport>,
}

impl ActionReport {
    fn new(actor: CombatantId, action: &str, target: Option<Targeting>) -> Self {
        Self {
            actor,
            action: action.to_string(),
            target,
            attacks: Vec::new(),
            heals: Vec::new(),
            buffs: Vec::new(),
            moves: Vec::new(),
        }
    }

    /// Total HP removed by this action's attacks.
    #[must_use]
    pub fn damage_dealt(&self) -> i64 {
        self.attacks.iter().map(|a| a.damage).sum()
    }
}

// =============================================================================
// Action
// =============================================================================

/// A shared action definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    name: String,
    pre: Vec<PreRequirement>,
    targets: Vec<TargetRequirement>,
    effects: Vec<(Targeting, Effect)>,
    preset: BatonPreset,
}

impl Action {
    /// An action with no requirements and no effects.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pre: Vec::new(),
            targets: Vec::new(),
            effects: Vec::new(),
            preset: BatonPreset::default(),
        }
    }

    /// Appends a pre-requirement.
    #[must_use]
    pub fn require(mut self, requirement: PreRequirement) -> Self {
        self.pre.push(requirement);
        self
    }

    /// Appends a target requirement.
    #[must_use]
    pub fn target(mut self, requirement: TargetRequirement) -> Self {
        self.targets.push(requirement);
        self
    }

    /// Appends an effect pair.
    #[must_use]
    pub fn effect(mut self, spec: Targeting, effect: Effect) -> Self {
        self.effects.push((spec, effect));
        self
    }

    /// Sets the baton preset applied before any effect runs.
    #[must_use]
    pub fn with_preset(mut self, preset: BatonPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Wraps the definition for sharing between combatants.
    #[must_use]
    pub fn shared(self) -> Arc<Action> {
        Arc::new(self)
    }

    /// Action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pre-requirements in check order.
    #[must_use]
    pub fn pre_requirements(&self) -> &[PreRequirement] {
        &self.pre
    }

    /// Target requirements in chain order.
    #[must_use]
    pub fn target_requirements(&self) -> &[TargetRequirement] {
        &self.targets
    }

    /// Effect pairs in execution order.
    #[must_use]
    pub fn effects(&self) -> &[(Targeting, Effect)] {
        &self.effects
    }

    /// True when some effect pair acts on a chosen target.
    #[must_use]
    pub fn needs_target(&self) -> bool {
        self.effects.iter().any(|(spec, _)| spec.is_single())
    }

    /// True when every pre-requirement holds. Stops at the first failure.
    #[must_use]
    pub fn check(&self, arena: &Arena, actor: CombatantId) -> bool {
        self.pre.iter().all(|req| req.check(arena, actor))
    }

    /// Threads `chosen` through the target requirements.
    ///
    /// With no target requirements the input is returned as is.
    ///
    /// # Errors
    ///
    /// [`TargetingError::NoValidTarget`] as soon as a link leaves no
    /// candidate; [`TargetingError::NotInArena`] for an unplaced actor.
    pub fn check_target(
        &self,
        arena: &Arena,
        actor: CombatantId,
        chosen: Option<Targeting>,
    ) -> Result<Option<Targeting>, ActionError> {
        let mut current = chosen;
        for requirement in &self.targets {
            let next = requirement.check(arena, actor, current)?;
            if next.is_empty() {
                return Err(TargetingError::NoValidTarget.into());
            }
            current = Some(next);
        }
        Ok(current)
    }

    /// Runs the action for `actor`.
    ///
    /// A chosen target is validated against the target requirements before
    /// any effect runs, and must come down to exactly one slot.
    ///
    /// # Errors
    ///
    /// - [`TargetingError::TargetRequired`] when a Single pair has no chosen
    ///   target
    /// - [`TargetingError::AreaNotAimable`] when an area-only action gets one
    /// - [`TargetingError::OutOfRange`] for a chosen slot outside the arena
    /// - [`TargetingError::NoValidTarget`] when the requirements leave no
    ///   slot
    /// - [`TargetingError::TooManyTargets`] when they leave more than one
    /// - [`ActionError::UnknownCombatant`] / [`TargetingError::NotInArena`]
    ///   for an actor the arena cannot place
    /// - any error raised by an effect, such as an out-of-range move
    pub fn execute(
        &self,
        arena: &mut Arena,
        rng: &mut dyn RandomSource,
        actor: CombatantId,
        chosen: Option<&Targeting>,
    ) -> Result<ActionReport, ActionError> {
        if arena.get(actor).is_none() {
            return Err(ActionError::UnknownCombatant(actor));
        }
        let position = arena
            .position_of(actor)
            .ok_or(TargetingError::NotInArena)?;
        let chosen = match (self.needs_target(), chosen) {
            (true, None) => return Err(TargetingError::TargetRequired.into()),
            (false, Some(_)) => return Err(TargetingError::AreaNotAimable.into()),
            (true, Some(target)) => Some(self.validate_target(arena, actor, position, target)?),
            (false, None) => None,
        };
        let chosen = chosen.as_ref();

        tracing::debug!(
            %actor,
            action = %self.name,
            target = ?chosen.map(ToString::to_string),
            "executing action"
        );

        let mut baton = Baton::new();
        baton.attacker = Some(actor);
        self.preset.apply(&mut baton);

        let mut report = ActionReport::new(actor, &self.name, chosen.cloned());
        let mut ctx = EffectContext {
            arena,
            rng,
            actor,
            baton: &mut baton,
            report: &mut report,
        };

        for (spec, effect) in &self.effects {
            let target = match chosen {
                Some(target) if spec.is_single() => target.clone(),
                _ => {
                    let position = ctx
                        .arena
                        .position_of(actor)
                        .ok_or(TargetingError::NotInArena)?;
                    spec.alt(position)
                }
            };
            effect.apply(&mut ctx, &target)?;
        }

        Ok(report)
    }

    /// Narrows a chosen target through the requirement chain down to the
    /// single slot a Single pair acts on.
    fn validate_target(
        &self,
        arena: &Arena,
        actor: CombatantId,
        position: Position,
        chosen: &Targeting,
    ) -> Result<Targeting, ActionError> {
        let chosen = chosen.alt(position);
        if let Some(slot) = chosen.slots().iter().find(|slot| **slot >= ARENA_WIDTH) {
            return Err(TargetingError::OutOfRange { slot: *slot }.into());
        }
        let narrowed = self
            .check_target(arena, actor, Some(chosen))?
            .ok_or(TargetingError::NoValidTarget)?;
        match narrowed.slots().len() {
            0 => Err(TargetingError::NoValidTarget.into()),
            1 => Ok(narrowed),
            count => Err(TargetingError::TooManyTargets { count }.into()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Decision
// =============================================================================

/// What a brain wants its combatant to do this turn.
#[derive(Debug, Clone)]
pub struct Decision {
    /// The chosen action.
    pub action: Arc<Action>,
    /// The chosen target, for actions that need one.
    pub target: Option<Targeting>,
}

impl Decision {
    /// Pairs an action with a target.
    #[must_use]
    pub fn new(action: Arc<Action>, target: Option<Targeting>) -> Self {
        Self { action, target }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} on {}", self.action, target),
            None => write!(f, "{}", self.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::Buff;
    use crate::combatant::Combatant;
    use crate::content::actions;
    use crate::rng::FixedRandom;
    use crate::targeting::{Position, Selection, Side};

    fn at(side: Side, slot: usize) -> Position {
        Position::new(side, slot).unwrap()
    }

    /// Left: hero at 1, friend at 2. Right: two foes at 0 and 1.
    fn skirmish() -> (Arena, CombatantId, CombatantId, CombatantId, CombatantId) {
        let mut arena = Arena::new();
        let hero = arena
            .place(Combatant::new("hero", 20, 20, 5), at(Side::Left, 1))
            .unwrap();
        let friend = arena
            .place(Combatant::new("friend", 20, 20, 4), at(Side::Left, 2))
            .unwrap();
        let foe_a = arena
            .place(Combatant::new("foe a", 20, 20, 3), at(Side::Right, 0))
            .unwrap();
        let foe_b = arena
            .place(Combatant::new("foe b", 20, 20, 3), at(Side::Right, 1))
            .unwrap();
        (arena, hero, friend, foe_a, foe_b)
    }

    mod check_tests {
        use super::*;

        #[test]
        fn test_check_short_circuits_on_position() {
            let (arena, hero, _, _, _) = skirmish();
            let far = Action::new("far").require(PreRequirement::SelfPosition(vec![3]));
            assert!(!far.check(&arena, hero));
            assert!(actions::bash().check(&arena, hero));
        }

        #[test]
        fn test_check_target_supplies_living_candidates() {
            let (mut arena, hero, _, foe_a, _) = skirmish();
            arena.get_mut(foe_a).unwrap().suffer(50);
            let slash = actions::slash();
            let spec = slash.check_target(&arena, hero, None).unwrap().unwrap();
            assert_eq!(spec.slots(), &[1]);
        }

        #[test]
        fn test_check_target_fails_with_no_candidate() {
            let (mut arena, hero, _, foe_a, foe_b) = skirmish();
            arena.get_mut(foe_a).unwrap().suffer(50);
            arena.get_mut(foe_b).unwrap().suffer(50);
            assert_eq!(
                actions::slash().check_target(&arena, hero, None),
                Err(ActionError::Targeting(TargetingError::NoValidTarget))
            );
        }

        #[test]
        fn test_check_target_rejects_a_dead_chosen_target() {
            let (mut arena, hero, _, foe_a, _) = skirmish();
            arena.get_mut(foe_a).unwrap().suffer(50);
            let chosen = Targeting::single_enemy(&[0]);
            assert!(actions::slash()
                .check_target(&arena, hero, Some(chosen))
                .is_err());
        }

        #[test]
        fn test_needs_target() {
            assert!(actions::slash().needs_target());
            assert!(!actions::bash().needs_target());
            assert!(!actions::skip().needs_target());
            assert!(actions::protect().needs_target());
        }
    }

    mod execute_tests {
        use super::*;

        #[test]
        fn test_single_needs_a_target() {
            let (mut arena, hero, _, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            assert_eq!(
                actions::slash().execute(&mut arena, &mut rng, hero, None),
                Err(ActionError::Targeting(TargetingError::TargetRequired))
            );
        }

        #[test]
        fn test_area_rejects_a_target() {
            let (mut arena, hero, _, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let aim = Targeting::single_enemy(&[0]);
            assert_eq!(
                actions::bash().execute(&mut arena, &mut rng, hero, Some(&aim)),
                Err(ActionError::Targeting(TargetingError::AreaNotAimable))
            );
        }

        #[test]
        fn test_area_damage_hits_every_living_slot() {
            let (mut arena, hero, _, foe_a, foe_b) = skirmish();
            let mut rng = FixedRandom::new();
            let report = actions::bash()
                .execute(&mut arena, &mut rng, hero, None)
                .unwrap();
            assert_eq!(report.attacks.len(), 2);
            assert_eq!(arena.get(foe_a).unwrap().cur_hp(), 18);
            assert_eq!(arena.get(foe_b).unwrap().cur_hp(), 18);
            assert!(arena.get(foe_a).unwrap().has_buff("Combo"));
            assert_eq!(report.buffs.len(), 2);
        }

        #[test]
        fn test_combo_branch_follows_the_marker() {
            let (mut arena, hero, _, foe_a, foe_b) = skirmish();
            arena
                .get_mut(foe_a)
                .unwrap()
                .add_buff(Buff::combo(2), &mut Baton::new());
            let mut rng = FixedRandom::new();
            let slash = actions::slash();

            slash
                .execute(&mut arena, &mut rng, hero, Some(&Targeting::single_enemy(&[0])))
                .unwrap();
            // comboed: the light follow-up, and the marker is spent on defend
            assert_eq!(arena.get(foe_a).unwrap().cur_hp(), 16);
            assert!(!arena.get(foe_a).unwrap().has_buff("Combo"));

            slash
                .execute(&mut arena, &mut rng, hero, Some(&Targeting::single_enemy(&[1])))
                .unwrap();
            assert_eq!(arena.get(foe_b).unwrap().cur_hp(), 14);
        }

        #[test]
        fn test_defend_buffs_self() {
            let (mut arena, hero, _, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let report = actions::defend()
                .execute(&mut arena, &mut rng, hero, None)
                .unwrap();
            assert_eq!(report.buffs[0].target, hero);
            assert!(arena.get(hero).unwrap().has_buff("Strength"));
        }

        #[test]
        fn test_protect_guards_ally_and_blocks_self() {
            let (mut arena, hero, friend, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let protect = actions::protect();
            let target = protect
                .check_target(&arena, hero, None)
                .unwrap()
                .unwrap()
                .choose(2)
                .unwrap();
            protect
                .execute(&mut arena, &mut rng, hero, Some(&target))
                .unwrap();
            let guarded = arena.get(friend).unwrap().buffs().get("Protected").unwrap();
            assert_eq!(
                guarded.kind(),
                &crate::buff::BuffKind::Protected { protector: hero }
            );
            assert!(arena.get(hero).unwrap().has_buff("Block"));
        }

        #[test]
        fn test_move_shifts_and_reports() {
            let (mut arena, hero, friend, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let step = actions::move_action(2);
            let target = step
                .check_target(&arena, hero, Some(Targeting::single_ally(&[2])))
                .unwrap();
            let report = step
                .execute(&mut arena, &mut rng, hero, target.as_ref())
                .unwrap();
            assert_eq!(arena.position_of(hero), Some(at(Side::Left, 2)));
            assert_eq!(arena.position_of(friend), Some(at(Side::Left, 1)));
            assert_eq!(report.moves[0].displaced, vec![friend]);
        }

        #[test]
        fn test_move_too_far() {
            let (mut arena, hero, _, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let far = Targeting::single_ally(&[3]);
            // the distance requirement filters the slot out first
            assert_eq!(
                actions::move_action(1).execute(&mut arena, &mut rng, hero, Some(&far)),
                Err(ActionError::Targeting(TargetingError::NoValidTarget))
            );

            let leap = Action::new("Leap").effect(
                Targeting::except_itself(Selection::Single),
                Effect::MoveTo { distance: 1 },
            );
            let err = leap
                .execute(&mut arena, &mut rng, hero, Some(&far))
                .unwrap_err();
            assert_eq!(
                err,
                ActionError::MoveOutOfRange {
                    from: 1,
                    to: 3,
                    distance: 1
                }
            );
            assert_eq!(arena.position_of(hero), Some(at(Side::Left, 1)));
        }

        #[test]
        fn test_move_outside_arena() {
            let (mut arena, hero, _, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let beyond = Targeting::new(
                crate::targeting::Relation::Ally,
                Selection::Single,
                [7],
            );
            assert_eq!(
                actions::move_action(9).execute(&mut arena, &mut rng, hero, Some(&beyond)),
                Err(ActionError::Targeting(TargetingError::OutOfRange { slot: 7 }))
            );
        }

        #[test]
        fn test_heal_clamps() {
            let (mut arena, hero, friend, _, _) = skirmish();
            arena.get_mut(friend).unwrap().suffer(5);
            let mut rng = FixedRandom::new();
            let mend = actions::heal((8, 10));
            let report = mend
                .execute(
                    &mut arena,
                    &mut rng,
                    hero,
                    Some(&Targeting::single_ally(&[2])),
                )
                .unwrap();
            assert_eq!(report.heals[0].amount, 5);
            assert_eq!(arena.get(friend).unwrap().cur_hp(), 20);
        }

        #[test]
        fn test_single_action_takes_one_slot() {
            let (mut arena, hero, _, foe_a, foe_b) = skirmish();
            let mut rng = FixedRandom::new();
            let spread = Targeting::single_enemy(&[0, 1, 2]);
            assert_eq!(
                actions::slash().execute(&mut arena, &mut rng, hero, Some(&spread)),
                Err(ActionError::Targeting(TargetingError::TooManyTargets { count: 2 }))
            );
            assert_eq!(arena.get(foe_a).unwrap().cur_hp(), 20);
            assert_eq!(arena.get(foe_b).unwrap().cur_hp(), 20);
        }

        #[test]
        fn test_enemy_action_cannot_land_on_an_ally() {
            let (mut arena, hero, friend, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let on_friend = Targeting::single_ally(&[2]);
            assert_eq!(
                actions::slash().execute(&mut arena, &mut rng, hero, Some(&on_friend)),
                Err(ActionError::Targeting(TargetingError::NoValidTarget))
            );
            assert_eq!(arena.get(friend).unwrap().cur_hp(), 20);
        }

        #[test]
        fn test_report_records_the_narrowed_target() {
            let (mut arena, hero, _, _, foe_b) = skirmish();
            let mut rng = FixedRandom::new();
            let report = actions::slash()
                .execute(&mut arena, &mut rng, hero, Some(&Targeting::single_enemy(&[1, 3])))
                .unwrap();
            assert_eq!(report.target.as_ref().map(Targeting::slots), Some(&[1][..]));
            assert_eq!(report.attacks.len(), 1);
            assert_eq!(report.attacks[0].defender, foe_b);
        }

        #[test]
        fn test_unknown_actor() {
            let (mut arena, _, _, _, _) = skirmish();
            let mut rng = FixedRandom::new();
            let ghost = CombatantId::new(99);
            assert_eq!(
                actions::skip().execute(&mut arena, &mut rng, ghost, None),
                Err(ActionError::UnknownCombatant(ghost))
            );
        }
    }
}
