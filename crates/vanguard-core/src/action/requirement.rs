//! Pre-requirements and target requirements.
//!
//! Pre-requirements answer "may this actor cast the action at all?" and
//! simply return `false` when not. Target requirements thread a targeting
//! spec through a chain of filters; the chain fails as soon as a link leaves
//! no candidate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::combatant::CombatantId;
use crate::error::{ActionError, TargetingError};
use crate::targeting::Targeting;

/// Checked before an action is offered or cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreRequirement {
    /// The actor must stand in one of these slots.
    SelfPosition(Vec<usize>),
    /// The spec must reach at least one living combatant.
    ValidTarget(Targeting),
    /// The actor must hold a buff with this name.
    SelfHasBuff(String),
}

impl PreRequirement {
    /// True when `actor` satisfies the requirement.
    #[must_use]
    pub fn check(&self, arena: &Arena, actor: CombatantId) -> bool {
        let Some(position) = arena.position_of(actor) else {
            return false;
        };
        match self {
            PreRequirement::SelfPosition(slots) => slots.contains(&position.slot()),
            PreRequirement::ValidTarget(spec) => arena
                .find_target_where(actor, &spec.alt(position), |c| c.is_alive())
                .is_ok_and(|found| found.iter().any(Option::is_some)),
            PreRequirement::SelfHasBuff(name) => {
                arena.get(actor).is_some_and(|c| c.has_buff(name))
            }
        }
    }
}

impl fmt::Display for PreRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRequirement::SelfPosition(slots) => write!(f, "self in {slots:?}"),
            PreRequirement::ValidTarget(spec) => write!(f, "valid target: {spec}"),
            PreRequirement::SelfHasBuff(name) => write!(f, "self has {name}"),
        }
    }
}

/// One link in an action's target-resolution chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRequirement {
    /// Supplies the default candidates (the spec resolved at the actor's
    /// position, keeping the spec's declared selection) or narrows a chosen
    /// target to those candidates. A chosen target aimed at the other side
    /// keeps nothing.
    Position(Targeting),
    /// Keeps slots at most this far from the actor's slot.
    DistanceLimit(usize),
    /// Keeps slots holding a living combatant.
    TargetAlive,
}

impl TargetRequirement {
    /// Filters `current` (or supplies a default when `None`).
    ///
    /// # Errors
    ///
    /// [`TargetingError::NotInArena`] when the actor is not placed;
    /// [`TargetingError::NoValidTarget`] when a filter runs with nothing to
    /// filter.
    pub fn check(
        &self,
        arena: &Arena,
        actor: CombatantId,
        current: Option<Targeting>,
    ) -> Result<Targeting, ActionError> {
        let position = arena
            .position_of(actor)
            .ok_or(TargetingError::NotInArena)?;
        match self {
            TargetRequirement::Position(spec) => {
                let default = spec.alt(position).with_selection(spec.selection());
                Ok(match current {
                    None => default,
                    Some(chosen) => {
                        let same_side = chosen.relation() == default.relation();
                        Targeting::new(
                            default.relation(),
                            default.selection(),
                            chosen
                                .alt(position)
                                .slots()
                                .iter()
                                .copied()
                                .filter(|slot| same_side && default.includes(*slot)),
                        )
                    }
                })
            }
            TargetRequirement::DistanceLimit(limit) => {
                let current = current.ok_or(TargetingError::NoValidTarget)?;
                Ok(current.retain_slots(|slot| slot.abs_diff(position.slot()) <= *limit))
            }
            TargetRequirement::TargetAlive => {
                let current = current.ok_or(TargetingError::NoValidTarget)?;
                let found = arena.find_target_where(actor, &current, |c| c.is_alive())?;
                let living: Vec<usize> = current
                    .slots()
                    .iter()
                    .zip(found)
                    .filter_map(|(slot, hit)| hit.map(|_| *slot))
                    .collect();
                Ok(current.retain_slots(|slot| living.contains(&slot)))
            }
        }
    }
}

impl fmt::Display for TargetRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRequirement::Position(spec) => write!(f, "target: {spec}"),
            TargetRequirement::DistanceLimit(limit) => write!(f, "within {limit}"),
            TargetRequirement::TargetAlive => write!(f, "target alive"),
        }
    }
}
