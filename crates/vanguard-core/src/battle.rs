//! The round/turn scheduler.
//!
//! A [`Battle`] owns the [`Arena`], the random source and one [`Brain`] per
//! combatant, and drives them through the battle state machine:
//!
//! 1. **Setup**: slots are populated, brains attached
//! 2. **RoundStart**: the turn order is computed (living, placed, fastest
//!    first)
//! 3. **Acting**: the next combatant able to act is popped and its brain is
//!    asked for a [`Decision`]
//! 4. **Resolving**: the decision is re-validated and executed, or the turn
//!    is a no-op when the brain passes
//! 5. **Cleanup**: the actor's buffs tick, the newly dead receive `DEATH` and
//!    leave the remaining order
//!
//! The machine loops back to Acting, or to RoundStart once the order is
//! exhausted, and stops when one side is down or after
//! [`BattleConfig::max_rounds`] rounds.
//!
//! # Determinism
//!
//! Given the same arena, brains and seed, a battle replays identically:
//! combatants live in a `BTreeMap`, turn order ties keep row order, and every
//! draw goes through the injected [`RandomSource`].
//!
//! # Example
//!
//! ```
//! use vanguard_core::battle::{Battle, BattleOutcome, Winner};
//! use vanguard_core::brain::ScriptedBrain;
//! use vanguard_core::combatant::Combatant;
//! use vanguard_core::config::BattleConfig;
//! use vanguard_core::content::actions;
//! use vanguard_core::targeting::{Position, Side, Targeting};
//!
//! let mut battle = Battle::new(BattleConfig::default().with_seed(1));
//! let knight = Combatant::new("knight", 20, 20, 5)
//!     .with_action(actions::slash().shared());
//! battle
//!     .join(
//!         knight,
//!         Position::new(Side::Left, 0).unwrap(),
//!         ScriptedBrain::new().then("Slash", Some(Targeting::single_enemy(&[0]))),
//!     )
//!     .unwrap();
//! battle
//!     .join(
//!         Combatant::new("rat", 3, 3, 1),
//!         Position::new(Side::Right, 0).unwrap(),
//!         ScriptedBrain::new(),
//!     )
//!     .unwrap();
//!
//! let outcome = battle.run().unwrap();
//! assert_eq!(outcome, BattleOutcome::Decided { winner: Winner::Left, rounds: 1 });
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{ActionReport, Decision};
use crate::arena::Arena;
use crate::baton::Baton;
use crate::brain::Brain;
use crate::combatant::{Combatant, CombatantId};
use crate::config::BattleConfig;
use crate::error::{ArenaError, BattleError};
use crate::rng::{RandomSource, SeededRandom};
use crate::targeting::Position;
use crate::timing::Timing;

pub use crate::arena::Winner;

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// One side (or both) went down.
    Decided {
        /// Who won.
        winner: Winner,
        /// Rounds played.
        rounds: u32,
    },
    /// The round limit was reached with both sides standing.
    Stalemate {
        /// Rounds played.
        rounds: u32,
    },
}

/// Where the scheduler stands between two calls to [`Battle::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No round started yet.
    Setup,
    /// The next step starts a new round.
    RoundStart,
    /// The next step pops the next actor of the current round.
    Acting,
    /// The battle is finished.
    Over,
}

/// What happened during one combatant's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Round the turn belongs to.
    pub round: u32,
    /// The acting combatant.
    pub actor: CombatantId,
    /// The actor's name at the time of the turn.
    pub actor_name: String,
    /// The executed action, if any.
    pub action: Option<ActionReport>,
    /// Why the brain's decision was refused, if it was.
    pub rejected: Option<String>,
    /// Combatants that died during the turn, in id order.
    pub deaths: Vec<CombatantId>,
}

impl fmt::Display for TurnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[round {}] {} ({})", self.round, self.actor_name, self.actor)?;
        match (&self.action, &self.rejected) {
            (Some(report), _) => {
                write!(f, " uses {}", report.action)?;
                if let Some(target) = &report.target {
                    write!(f, " on {target}")?;
                }
                for attack in &report.attacks {
                    if attack.missed {
                        write!(f, "; misses {}", attack.nominal_defender)?;
                        continue;
                    }
                    write!(f, "; hits {}", attack.defender)?;
                    if attack.redirected() {
                        write!(f, " (covering {})", attack.nominal_defender)?;
                    }
                    write!(f, " for {}", attack.damage)?;
                    if attack.critted {
                        write!(f, " (crit)")?;
                    }
                }
                for heal in &report.heals {
                    write!(f, "; heals {} for {}", heal.target, heal.amount)?;
                }
                for buff in &report.buffs {
                    write!(f, "; {} gains {}", buff.target, buff.buff)?;
                }
                for step in &report.moves {
                    write!(f, "; moves {} -> {}", step.from, step.to)?;
                }
            }
            (None, Some(reason)) => write!(f, " fails: {reason}")?,
            (None, None) => write!(f, " passes")?,
        }
        for dead in &self.deaths {
            write!(f, "; {dead} falls")?;
        }
        Ok(())
    }
}

// =============================================================================
// Battle
// =============================================================================

/// One battle: arena, randomness, brains and the turn log.
pub struct Battle {
    arena: Arena,
    rng: Box<dyn RandomSource>,
    brains: BTreeMap<CombatantId, Box<dyn Brain>>,
    config: BattleConfig,
    phase: Phase,
    log: Vec<TurnReport>,
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("arena", &self.arena)
            .field("brains", &format!("[{} brains]", self.brains.len()))
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("turns", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl Battle {
    /// An empty battle drawing from a [`SeededRandom`] built from the
    /// config's seed.
    #[must_use]
    pub fn new(config: BattleConfig) -> Self {
        Self::with_arena(Arena::new(), config)
    }

    /// A battle over an already populated arena.
    #[must_use]
    pub fn with_arena(arena: Arena, config: BattleConfig) -> Self {
        Self {
            arena,
            rng: Box::new(SeededRandom::new(config.seed)),
            brains: BTreeMap::new(),
            config,
            phase: Phase::Setup,
            log: Vec::new(),
        }
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Places `combatant` and attaches its brain.
    ///
    /// # Errors
    ///
    /// [`BattleError::Arena`] when the slot is taken.
    pub fn join(
        &mut self,
        combatant: Combatant,
        position: Position,
        brain: impl Brain + 'static,
    ) -> Result<CombatantId, BattleError> {
        let id = self.arena.place(combatant, position)?;
        self.brains.insert(id, Box::new(brain));
        Ok(id)
    }

    /// Attaches (or replaces) the brain of an already placed combatant.
    /// Combatants without a brain pass every turn.
    ///
    /// # Errors
    ///
    /// [`ArenaError::UnknownCombatant`] for an id the arena does not own.
    pub fn set_brain(
        &mut self,
        id: CombatantId,
        brain: impl Brain + 'static,
    ) -> Result<(), BattleError> {
        if self.arena.get(id).is_none() {
            return Err(ArenaError::UnknownCombatant(id).into());
        }
        self.brains.insert(id, Box::new(brain));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The battlefield.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable battlefield, for setup.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// The configuration this battle runs with.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Current scheduler phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rounds started so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.arena.round()
    }

    /// Every turn played so far.
    #[must_use]
    pub fn log(&self) -> &[TurnReport] {
        &self.log
    }

    /// True once the battle has finished.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    /// The result, once finished.
    #[must_use]
    pub fn outcome(&self) -> Option<BattleOutcome> {
        if !self.is_over() {
            return None;
        }
        let rounds = self.arena.round();
        Some(match self.arena.winner() {
            Some(winner) => BattleOutcome::Decided { winner, rounds },
            None => BattleOutcome::Stalemate { rounds },
        })
    }

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    /// Plays one turn.
    ///
    /// Returns `Ok(None)` when the battle ends instead of playing a turn.
    /// A refused decision does not fail the step; it is logged and recorded
    /// in [`TurnReport::rejected`].
    ///
    /// # Errors
    ///
    /// [`BattleError::Finished`] when called after the battle ended.
    pub fn step(&mut self) -> Result<Option<TurnReport>, BattleError> {
        if self.phase == Phase::Over {
            return Err(BattleError::Finished);
        }
        let Some(actor) = self.next_actor() else {
            self.finish();
            return Ok(None);
        };

        let before = self.living();
        let actor_name = self
            .arena
            .get(actor)
            .map(|c| c.name().to_string())
            .unwrap_or_default();

        let decision = self
            .brains
            .get_mut(&actor)
            .and_then(|brain| brain.decide(actor, &self.arena));

        let (action, rejected) = match decision {
            None => {
                tracing::info!(round = self.arena.round(), %actor, "turn passed");
                (None, None)
            }
            Some(decision) => match self.apply_decision(actor, &decision) {
                Ok(report) => (Some(report), None),
                Err(err) => {
                    tracing::warn!(%actor, %decision, %err, "decision rejected");
                    (None, Some(err.to_string()))
                }
            },
        };

        let deaths = self.cleanup(actor, &before);
        let report = TurnReport {
            round: self.arena.round(),
            actor,
            actor_name,
            action,
            rejected,
            deaths,
        };
        tracing::info!("{report}");

        self.phase = if self.arena.is_over() {
            Phase::Over
        } else if self.arena.round_over() {
            Phase::RoundStart
        } else {
            Phase::Acting
        };
        if self.phase == Phase::Over {
            self.finish();
        }
        self.log.push(report.clone());
        Ok(Some(report))
    }

    /// Plays turns until the battle ends.
    ///
    /// # Errors
    ///
    /// [`BattleError::Finished`] when called on a finished battle.
    pub fn run(&mut self) -> Result<BattleOutcome, BattleError> {
        if self.is_over() {
            return Err(BattleError::Finished);
        }
        while !self.is_over() {
            self.step()?;
        }
        self.outcome().ok_or(BattleError::Finished)
    }

    /// Re-validates `decision` for `actor` and executes it.
    ///
    /// The action is looked up by name among the actor's own actions, so a
    /// brain can only cast what its combatant actually has.
    ///
    /// # Errors
    ///
    /// - [`BattleError::NotCastable`] when the actor lacks the action or its
    ///   pre-requirements fail
    /// - [`BattleError::Action`] when target resolution or execution fails
    pub fn apply_decision(
        &mut self,
        actor: CombatantId,
        decision: &Decision,
    ) -> Result<ActionReport, BattleError> {
        let combatant = self
            .arena
            .get(actor)
            .ok_or(ArenaError::UnknownCombatant(actor))?;
        let name = decision.action.name();
        let action = combatant
            .action(name)
            .filter(|action| action.check(&self.arena, actor))
            .ok_or_else(|| BattleError::NotCastable {
                actor,
                action: name.to_string(),
            })?;

        Ok(action.execute(
            &mut self.arena,
            self.rng.as_mut(),
            actor,
            decision.target.as_ref(),
        )?)
    }

    /// Advances to the next combatant able to act, starting rounds as
    /// needed. `None` when the battle is over or out of rounds.
    fn next_actor(&mut self) -> Option<CombatantId> {
        loop {
            if self.arena.is_over() {
                return None;
            }
            if self.arena.round_over() {
                if self.arena.round() >= self.config.max_rounds {
                    return None;
                }
                self.arena.start_round();
                tracing::info!(round = self.arena.round(), "round started");
                if self.arena.round_over() {
                    return None;
                }
            }
            self.phase = Phase::Acting;
            if let Some(actor) = self.arena.next_actor() {
                return Some(actor);
            }
        }
    }

    fn living(&self) -> Vec<CombatantId> {
        self.arena
            .combatants()
            .filter(|(_, c)| c.is_alive())
            .map(|(id, _)| id)
            .collect()
    }

    /// End of turn: tick the actor, announce deaths, clean the order.
    fn cleanup(&mut self, actor: CombatantId, before: &[CombatantId]) -> Vec<CombatantId> {
        if let Some(combatant) = self.arena.get_mut(actor) {
            combatant.turn_end();
        }
        let deaths: Vec<CombatantId> = before
            .iter()
            .copied()
            .filter(|id| self.arena.get(*id).is_some_and(Combatant::is_dead))
            .collect();
        for id in &deaths {
            if let Some(fallen) = self.arena.get_mut(*id) {
                let mut baton = Baton::new();
                baton.defender = Some(*id);
                fallen.dispatch(Timing::DEATH, &mut baton);
                tracing::info!(combatant = %id, name = fallen.name(), "fell");
            }
        }
        self.arena.clean_dead_in_order();
        deaths
    }

    fn finish(&mut self) {
        self.phase = Phase::Over;
        match self.arena.winner() {
            Some(winner) => {
                tracing::info!(?winner, rounds = self.arena.round(), "battle decided");
            }
            None => tracing::info!(rounds = self.arena.round(), "stalemate"),
        }
    }
}
