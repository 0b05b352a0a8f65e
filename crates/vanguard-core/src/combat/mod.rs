//! Attack resolution.
//!
//! [`resolve_attack`] carries one attack from the attacker to whoever ends up
//! taking it:
//!
//! 1. nothing happens if the defender is missing or already dead
//! 2. a fresh [`Attack`] is seeded from the baton's forced outcomes, or
//!    else from the miss outcome of the previous attack in the same action
//! 3. `ATTACK` is dispatched on the attacker
//! 4. the miss outcome is rolled if unknown ([`roll_miss`])
//! 5. a missed attack stops here
//! 6. `MISLEAD` is dispatched on the nominal defender; a living protector
//!    other than the defender takes its place (one level, never chained)
//! 7. `DEFEND` is dispatched on the actual defender
//! 8. the miss outcome is rolled again if a defend factor reopened it
//! 9. a landed attack rolls crit (unless forced) and deals its damage
//!
//! Only the actual defender loses HP. HP may go negative.

mod attack;

pub use attack::{roll_crit, roll_miss, Attack, CRIT_MULTIPLIER};

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::baton::Baton;
use crate::combatant::CombatantId;
use crate::rng::RandomSource;
use crate::timing::Timing;

/// Final miss/crit outcome of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// The attack missed.
    pub missed: bool,
    /// The attack crit.
    pub critted: bool,
}

/// What happened to one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    /// Who attacked.
    pub attacker: CombatantId,
    /// Who the attack was aimed at.
    pub nominal_defender: CombatantId,
    /// Who took it after redirection.
    pub defender: CombatantId,
    /// The attack missed.
    pub missed: bool,
    /// The attack crit.
    pub critted: bool,
    /// HP removed from `defender`.
    pub damage: i64,
}

impl AttackReport {
    /// True when a protector took the hit.
    #[must_use]
    pub fn redirected(&self) -> bool {
        self.nominal_defender != self.defender
    }
}

/// Resolves an attack of `amount` from `attacker` on `defender`.
///
/// Returns `None` when the defender is missing or dead, or the attacker is
/// not owned by the arena. The outcome is also recorded in
/// `baton.last_outcome`, where it seeds the next attack made with the same
/// baton.
pub fn resolve_attack(
    arena: &mut Arena,
    rng: &mut dyn RandomSource,
    attacker: CombatantId,
    defender: CombatantId,
    amount: (i64, i64),
    baton: &mut Baton,
) -> Option<AttackReport> {
    if !arena.get(defender).is_some_and(|c| c.is_alive()) {
        return None;
    }

    baton.attacker = Some(attacker);
    baton.defender = Some(defender);
    baton.mislead_target = None;
    let carried = baton.last_outcome.map(|outcome| outcome.missed);
    baton.attack = Some(
        Attack::new(amount)
            .with_forced(baton.forced_miss, baton.forced_crit)
            .with_carried_miss(carried),
    );

    arena.get_mut(attacker)?.dispatch(Timing::ATTACK, baton);

    let missed = baton.attack.as_mut()?.resolve_miss(rng);
    if missed {
        return Some(finish(arena, attacker, defender, defender, baton, rng));
    }

    let actual = mislead(arena, defender, baton);
    baton.defender = Some(actual);

    if let Some(target) = arena.get_mut(actual) {
        target.dispatch(Timing::DEFEND, baton);
    }
    baton.attack.as_mut()?.resolve_miss(rng);

    Some(finish(arena, attacker, defender, actual, baton, rng))
}

/// Runs the mislead dispatch and returns who actually takes the attack.
fn mislead(arena: &mut Arena, defender: CombatantId, baton: &mut Baton) -> CombatantId {
    if let Some(target) = arena.get_mut(defender) {
        target.dispatch(Timing::MISLEAD, baton);
    }
    let Some(protector) = baton.mislead_target.take() else {
        return defender;
    };
    let usable = protector != defender && arena.get(protector).is_some_and(|c| c.is_alive());
    if usable {
        tracing::debug!(%defender, %protector, "attack redirected");
        protector
    } else {
        tracing::debug!(%defender, %protector, "redirect ignored");
        defender
    }
}

/// Applies the landed (or missed) attack and builds the report.
fn finish(
    arena: &mut Arena,
    attacker: CombatantId,
    nominal: CombatantId,
    actual: CombatantId,
    baton: &mut Baton,
    rng: &mut dyn RandomSource,
) -> AttackReport {
    let mut report = AttackReport {
        attacker,
        nominal_defender: nominal,
        defender: actual,
        missed: true,
        critted: false,
        damage: 0,
    };

    if let Some(attack) = baton.attack.as_mut() {
        report.missed = attack.missed.unwrap_or(true);
        if !report.missed {
            report.critted = attack.resolve_crit(rng);
            report.damage = attack.damage(report.critted, rng);
            if let Some(target) = arena.get_mut(actual) {
                target.suffer(report.damage);
            }
        }
    }

    baton.last_outcome = Some(AttackOutcome {
        missed: report.missed,
        critted: report.critted,
    });
    tracing::debug!(
        %attacker,
        defender = %actual,
        missed = report.missed,
        critted = report.critted,
        damage = report.damage,
        "attack resolved"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::Buff;
    use crate::combatant::Combatant;
    use crate::rng::FixedRandom;
    use crate::targeting::{Position, Side};

    fn duel(left: Combatant, right: Combatant) -> (Arena, CombatantId, CombatantId) {
        let mut arena = Arena::new();
        let a = arena
            .place(left, Position::new(Side::Left, 0).unwrap())
            .unwrap();
        let b = arena
            .place(right, Position::new(Side::Right, 0).unwrap())
            .unwrap();
        (arena, a, b)
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn test_stub_deals_low_end() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 100, 100, 7),
            );
            let mut rng = FixedRandom::new();
            let report =
                resolve_attack(&mut arena, &mut rng, a, b, (10, 20), &mut Baton::new()).unwrap();
            assert_eq!(report.damage, 10);
            assert!(!report.missed);
            assert!(!report.critted);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 90);
        }

        #[test]
        fn test_strength_boosts_and_is_consumed() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3).with_buff(Buff::strength(1, 1)),
                Combatant::new("b", 100, 100, 7),
            );
            let mut rng = FixedRandom::new();
            let report =
                resolve_attack(&mut arena, &mut rng, a, b, (10, 10), &mut Baton::new()).unwrap();
            assert_eq!(report.damage, 15);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 85);
            assert!(arena.get(a).unwrap().buffs().is_empty());
        }

        #[test]
        fn test_forced_crit() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 100, 100, 7),
            );
            let mut rng = FixedRandom::new();
            let mut baton = Baton {
                forced_crit: Some(true),
                ..Baton::default()
            };
            let report = resolve_attack(&mut arena, &mut rng, a, b, (10, 20), &mut baton).unwrap();
            assert!(report.critted);
            assert_eq!(report.damage, 15);
        }

        #[test]
        fn test_dead_defender_is_skipped() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 0, 10, 7),
            );
            let mut rng = FixedRandom::new();
            assert!(resolve_attack(&mut arena, &mut rng, a, b, (5, 5), &mut Baton::new()).is_none());
            assert_eq!(arena.get(b).unwrap().cur_hp(), 0);
        }

        #[test]
        fn test_forced_miss_deals_nothing() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 10, 10, 7),
            );
            let mut rng = FixedRandom::new();
            let mut baton = Baton {
                forced_miss: Some(true),
                ..Baton::default()
            };
            let report = resolve_attack(&mut arena, &mut rng, a, b, (5, 5), &mut baton).unwrap();
            assert!(report.missed);
            assert_eq!(report.damage, 0);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 10);
            assert_eq!(
                baton.last_outcome,
                Some(AttackOutcome {
                    missed: true,
                    critted: false
                })
            );
        }
    }

    mod evasion_tests {
        use super::*;

        #[test]
        fn test_dodge_rerolls_against_halved_accuracy() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 10, 10, 7).with_buff(Buff::dodge(1, 3)),
            );
            // first roll lands, the dodge re-roll of 0.7 beats accuracy 0.5
            let mut rng = FixedRandom::with_uniforms([0.5, 0.7]);
            let report =
                resolve_attack(&mut arena, &mut rng, a, b, (5, 5), &mut Baton::new()).unwrap();
            assert!(report.missed);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 10);
            assert!(arena.get(b).unwrap().buffs().is_empty());
        }

        #[test]
        fn test_ignore_evade_bypasses_dodge() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 10, 10, 7).with_buff(Buff::dodge(1, 3)),
            );
            let mut rng = FixedRandom::with_uniforms([0.5, 0.7]);
            let mut baton = Baton {
                ignore_evade: true,
                ..Baton::default()
            };
            let report = resolve_attack(&mut arena, &mut rng, a, b, (5, 5), &mut baton).unwrap();
            assert!(!report.missed);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 5);
            assert!(arena.get(b).unwrap().buffs().contains("Dodge"));
        }

        #[test]
        fn test_block_halves_magnitude() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 20, 20, 7).with_buff(Buff::block(1, 3)),
            );
            let mut rng = FixedRandom::new();
            let report =
                resolve_attack(&mut arena, &mut rng, a, b, (10, 10), &mut Baton::new()).unwrap();
            assert_eq!(report.damage, 5);
            assert!(!arena.get(b).unwrap().buffs().contains("Block"));
        }

        #[test]
        fn test_earlier_miss_carries_over() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 10, 10, 7),
            );
            // a draw below accuracy would land, but none is taken
            let mut rng = FixedRandom::with_uniforms([0.1]);
            let mut baton = Baton {
                last_outcome: Some(AttackOutcome {
                    missed: true,
                    critted: false,
                }),
                ..Baton::default()
            };
            let report = resolve_attack(&mut arena, &mut rng, a, b, (5, 5), &mut baton).unwrap();
            assert!(report.missed);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 10);
            assert!((rng.uniform() - 0.1).abs() < f64::EPSILON);
        }

        #[test]
        fn test_dodge_reopens_a_carried_hit() {
            let (mut arena, a, b) = duel(
                Combatant::new("a", 13, 20, 3),
                Combatant::new("b", 10, 10, 7).with_buff(Buff::dodge(1, 3)),
            );
            let mut rng = FixedRandom::with_uniforms([0.7]);
            let mut baton = Baton {
                last_outcome: Some(AttackOutcome {
                    missed: false,
                    critted: false,
                }),
                ..Baton::default()
            };
            let report = resolve_attack(&mut arena, &mut rng, a, b, (5, 5), &mut baton).unwrap();
            assert!(report.missed);
            assert_eq!(arena.get(b).unwrap().cur_hp(), 10);
        }
    }

    mod redirect_tests {
        use super::*;

        fn guarded(protector_hp: i64) -> (Arena, CombatantId, CombatantId, CombatantId) {
            let mut arena = Arena::new();
            let attacker = arena
                .place(
                    Combatant::new("attacker", 20, 20, 5),
                    Position::new(Side::Left, 0).unwrap(),
                )
                .unwrap();
            let protector = arena
                .place(
                    Combatant::new("protector", protector_hp, 20, 5),
                    Position::new(Side::Right, 0).unwrap(),
                )
                .unwrap();
            let ward = arena
                .place(
                    Combatant::new("ward", 20, 20, 5).with_buff(Buff::protected(protector, 1, 2)),
                    Position::new(Side::Right, 1).unwrap(),
                )
                .unwrap();
            (arena, attacker, protector, ward)
        }

        #[test]
        fn test_living_protector_takes_the_hit() {
            let (mut arena, attacker, protector, ward) = guarded(20);
            let mut rng = FixedRandom::new();
            let report = resolve_attack(
                &mut arena,
                &mut rng,
                attacker,
                ward,
                (10, 10),
                &mut Baton::new(),
            )
            .unwrap();
            assert!(report.redirected());
            assert_eq!(arena.get(ward).unwrap().cur_hp(), 20);
            assert_eq!(arena.get(protector).unwrap().cur_hp(), 10);
        }

        #[test]
        fn test_dead_protector_is_ignored() {
            let (mut arena, attacker, protector, ward) = guarded(0);
            let mut rng = FixedRandom::new();
            let report = resolve_attack(
                &mut arena,
                &mut rng,
                attacker,
                ward,
                (10, 10),
                &mut Baton::new(),
            )
            .unwrap();
            assert!(!report.redirected());
            assert_eq!(arena.get(ward).unwrap().cur_hp(), 10);
            assert_eq!(arena.get(protector).unwrap().cur_hp(), 0);
        }

        #[test]
        fn test_redirect_does_not_chain() {
            let (mut arena, attacker, protector, ward) = guarded(20);
            // the protector is itself guarded by the ward; still one hop only
            arena
                .get_mut(protector)
                .unwrap()
                .add_buff(Buff::protected(ward, 1, 2), &mut Baton::new());
            let mut rng = FixedRandom::new();
            let report = resolve_attack(
                &mut arena,
                &mut rng,
                attacker,
                ward,
                (10, 10),
                &mut Baton::new(),
            )
            .unwrap();
            assert_eq!(report.defender, protector);
            assert_eq!(arena.get(protector).unwrap().cur_hp(), 10);
            assert_eq!(arena.get(ward).unwrap().cur_hp(), 20);
        }
    }
}
