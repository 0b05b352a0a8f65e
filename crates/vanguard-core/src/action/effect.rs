//! The closed set of effects an action can carry.
//!
//! Effects run against an already resolved target spec. A missing or dead
//! combatant in one slot is skipped; the effect still reaches the rest.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::baton::{Baton, BatonPreset};
use crate::buff::Buff;
use crate::combat;
use crate::combatant::{Combatant, CombatantId};
use crate::error::{ActionError, TargetingError};
use crate::rng::RandomSource;
use crate::targeting::{Selection, Targeting, ARENA_WIDTH};
use crate::timing::Timing;

use super::{ActionReport, BuffReport, HealReport, MoveReport};

/// Duration of the Protected buff laid by [`Effect::ProtectTarget`].
pub const PROTECT_DURATION: i32 = 2;

/// Something an action does to its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Attacks every target with this damage range.
    Damage {
        /// Inclusive damage range.
        amount: (i64, i64),
        /// Baton fields raised before each attack.
        preset: Option<BatonPreset>,
    },
    /// Heals every target by a draw from this range.
    Heal {
        /// Inclusive heal range.
        amount: (i64, i64),
    },
    /// Moves the actor to the chosen slot.
    MoveTo {
        /// Furthest the actor may move.
        distance: usize,
    },
    /// Applies a buff to the actor, whatever the target.
    AddSelfBuff(Buff),
    /// Applies a buff to every target.
    ApplyTargetBuff(Buff),
    /// Lays Protected (pointing at the actor) on every target.
    ProtectTarget {
        /// Stack of the Protected buff.
        stack: i32,
    },
    /// Per target: `on_combo` if it holds Combo, `otherwise` if not.
    ComboCondition {
        /// Follow-up against a comboed target.
        on_combo: Box<Effect>,
        /// Plain effect otherwise.
        otherwise: Box<Effect>,
    },
}

/// Everything an effect may touch while it runs.
pub(crate) struct EffectContext<'a> {
    pub arena: &'a mut Arena,
    pub rng: &'a mut dyn RandomSource,
    pub actor: CombatantId,
    pub baton: &'a mut Baton,
    pub report: &'a mut ActionReport,
}

impl Effect {
    /// Shorthand for a plain damage effect.
    #[must_use]
    pub const fn damage(low: i64, high: i64) -> Self {
        Effect::Damage {
            amount: (low, high),
            preset: None,
        }
    }

    /// Shorthand for a combo branch.
    #[must_use]
    pub fn combo(on_combo: Effect, otherwise: Effect) -> Self {
        Effect::ComboCondition {
            on_combo: Box::new(on_combo),
            otherwise: Box::new(otherwise),
        }
    }

    pub(crate) fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        target: &Targeting,
    ) -> Result<(), ActionError> {
        match self {
            Effect::Damage { amount, preset } => {
                for defender in living(ctx.arena, ctx.actor, target)? {
                    if let Some(preset) = preset {
                        preset.apply(ctx.baton);
                    }
                    let report = combat::resolve_attack(
                        ctx.arena,
                        ctx.rng,
                        ctx.actor,
                        defender,
                        *amount,
                        ctx.baton,
                    );
                    ctx.report.attacks.extend(report);
                }
            }
            Effect::Heal { amount } => {
                for patient in living(ctx.arena, ctx.actor, target)? {
                    let rolled = ctx.rng.integer(amount.0, amount.1);
                    ctx.baton.heal = Some(rolled);
                    if let Some(combatant) = ctx.arena.get_mut(patient) {
                        combatant.dispatch(Timing::HEALING, ctx.baton);
                        let staged = ctx.baton.heal.take().unwrap_or(rolled);
                        let healed = combatant.heal(staged);
                        ctx.report.heals.push(HealReport {
                            target: patient,
                            amount: healed,
                        });
                    }
                }
            }
            Effect::MoveTo { distance } => move_to(ctx, target, *distance)?,
            Effect::AddSelfBuff(buff) => {
                let actor = ctx.actor;
                give(ctx, actor, buff.clone());
            }
            Effect::ApplyTargetBuff(buff) => {
                for receiver in living(ctx.arena, ctx.actor, target)? {
                    give(ctx, receiver, buff.clone());
                }
            }
            Effect::ProtectTarget { stack } => {
                let actor = ctx.actor;
                for receiver in living(ctx.arena, actor, target)? {
                    give(ctx, receiver, Buff::protected(actor, *stack, PROTECT_DURATION));
                }
            }
            Effect::ComboCondition {
                on_combo,
                otherwise,
            } => {
                let found = ctx
                    .arena
                    .find_target_where(ctx.actor, target, Combatant::is_alive)?;
                let hits: Vec<(usize, CombatantId)> = target
                    .slots()
                    .iter()
                    .copied()
                    .zip(found)
                    .filter_map(|(slot, hit)| hit.map(|id| (slot, id)))
                    .collect();
                for (slot, id) in hits {
                    ctx.baton.combo = true;
                    let comboed = ctx.arena.get(id).is_some_and(|c| c.has_buff("Combo"));
                    let narrowed = Targeting::new(target.relation(), Selection::Single, [slot]);
                    let branch = if comboed { on_combo } else { otherwise };
                    tracing::debug!(target = %id, comboed, "combo branch");
                    branch.apply(ctx, &narrowed)?;
                }
            }
        }
        Ok(())
    }
}

/// Living combatants reached by `target`, in slot order.
fn living(
    arena: &Arena,
    actor: CombatantId,
    target: &Targeting,
) -> Result<Vec<CombatantId>, TargetingError> {
    Ok(arena
        .find_target_where(actor, target, Combatant::is_alive)?
        .into_iter()
        .flatten()
        .collect())
}

fn give(ctx: &mut EffectContext<'_>, receiver: CombatantId, buff: Buff) {
    let name = buff.name_str().to_string();
    if let Some(combatant) = ctx.arena.get_mut(receiver) {
        combatant.add_buff(buff, ctx.baton);
        ctx.report.buffs.push(BuffReport {
            target: receiver,
            buff: name,
        });
    }
}

fn move_to(
    ctx: &mut EffectContext<'_>,
    target: &Targeting,
    distance: usize,
) -> Result<(), ActionError> {
    let from = ctx
        .arena
        .position_of(ctx.actor)
        .ok_or(TargetingError::NotInArena)?
        .slot();
    let &[to] = target.slots() else {
        return Err(TargetingError::TargetRequired.into());
    };
    if to >= ARENA_WIDTH {
        return Err(TargetingError::OutOfRange { slot: to }.into());
    }
    if to.abs_diff(from) > distance {
        return Err(ActionError::MoveOutOfRange { from, to, distance });
    }
    ctx.baton.moved_to = Some(to);
    let displaced = ctx.arena.move_to(ctx.actor, to)?;
    ctx.report.moves.push(MoveReport {
        combatant: ctx.actor,
        from,
        to,
        displaced,
    });
    Ok(())
}
