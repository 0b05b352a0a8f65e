//! Arena module for the battle simulation.
//!
//! The Arena is the container for everything on the battlefield. It provides:
//! - Combatant storage with deterministic iteration order (`BTreeMap`)
//! - Two fixed-width slot rows, authoritative for "where is X"
//! - Target lookup from a caster's point of view
//! - Movement with neighbour shifting
//! - The round counter, the turn-order queue and the current actor
//!
//! # Architecture
//!
//! Combatants are owned by the arena and addressed by [`CombatantId`]. Ids
//! are assigned monotonically on placement, and the `BTreeMap`'s natural
//! ordering keeps every iteration over combatants reproducible. The slot
//! rows hold ids only, so a combatant can be moved or die without anything
//! else holding a dangling reference to it. Dead combatants keep their slot.
//!
//! # Example
//!
//! ```
//! use vanguard_core::arena::Arena;
//! use vanguard_core::combatant::Combatant;
//! use vanguard_core::targeting::{Position, Side, Targeting};
//!
//! let mut arena = Arena::new();
//! let hero = arena
//!     .place(Combatant::new("hero", 20, 20, 5), Position::new(Side::Left, 0).unwrap())
//!     .unwrap();
//! let wolf = arena
//!     .place(Combatant::new("wolf", 12, 12, 7), Position::new(Side::Right, 1).unwrap())
//!     .unwrap();
//!
//! let found = arena.find_target(hero, &Targeting::area_enemy(&[0, 1])).unwrap();
//! assert_eq!(found, vec![None, Some(wolf)]);
//!
//! arena.start_round();
//! assert_eq!(arena.next_actor(), Some(wolf));
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::baton::Baton;
use crate::combatant::{Combatant, CombatantId};
use crate::error::{ArenaError, TargetingError};
use crate::targeting::{Position, Side, Slots, Targeting, ARENA_WIDTH};
use crate::timing::Timing;

/// One side's slot row.
type Row = [Option<CombatantId>; ARENA_WIDTH];

/// Which side won a finished battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Winner {
    /// The right side is down.
    Left,
    /// The left side is down.
    Right,
    /// Both sides are down.
    Draw,
}

// =============================================================================
// Arena
// =============================================================================

/// The battlefield: combatants, slot rows and turn bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    /// Monotonically increasing id counter.
    next_id: u64,
    /// Combatant storage with deterministic iteration order.
    combatants: BTreeMap<CombatantId, Combatant>,
    left: Row,
    right: Row,
    /// Rounds started so far.
    round: u32,
    /// Who still acts this round, front first.
    order: VecDeque<CombatantId>,
    /// Who is acting now.
    current: Option<CombatantId>,
}

impl Arena {
    /// Creates an empty arena at round 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------

    /// Places `combatant` at `position` and returns its new id.
    ///
    /// # Errors
    ///
    /// [`ArenaError::SlotOccupied`] when the slot already holds someone.
    pub fn place(
        &mut self,
        combatant: Combatant,
        position: Position,
    ) -> Result<CombatantId, ArenaError> {
        if self.row(position.side())[position.slot()].is_some() {
            return Err(ArenaError::SlotOccupied(position));
        }
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        self.row_mut(position.side())[position.slot()] = Some(id);
        tracing::debug!(%id, name = combatant.name(), %position, "placed");
        self.combatants.insert(id, combatant);
        Ok(id)
    }

    /// Takes a combatant off the field and out of the turn order.
    pub fn remove(&mut self, id: CombatantId) -> Option<Combatant> {
        for cell in self.left.iter_mut().chain(self.right.iter_mut()) {
            if *cell == Some(id) {
                *cell = None;
            }
        }
        self.order.retain(|queued| *queued != id);
        if self.current == Some(id) {
            self.current = None;
        }
        self.combatants.remove(&id)
    }

    /// The combatant with this id.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Mutable access to the combatant with this id.
    #[must_use]
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// Ids in ascending order.
    pub fn combatant_ids(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.combatants.keys().copied()
    }

    /// Combatants in id order.
    pub fn combatants(&self) -> impl Iterator<Item = (CombatantId, &Combatant)> + '_ {
        self.combatants.iter().map(|(id, c)| (*id, c))
    }

    /// Number of combatants owned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// True when nobody has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    // -------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------

    /// The slot row of `side`.
    #[must_use]
    pub fn row(&self, side: Side) -> &[Option<CombatantId>; ARENA_WIDTH] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn row_mut(&mut self, side: Side) -> &mut Row {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Who stands at `position`.
    #[must_use]
    pub fn occupant(&self, position: Position) -> Option<CombatantId> {
        self.row(position.side())[position.slot()]
    }

    /// Where `id` stands, if placed.
    #[must_use]
    pub fn position_of(&self, id: CombatantId) -> Option<Position> {
        [Side::Left, Side::Right].into_iter().find_map(|side| {
            self.row(side)
                .iter()
                .position(|cell| *cell == Some(id))
                .map(|slot| Position::at(side, slot))
        })
    }

    /// Resolves `spec` from `caster`'s point of view.
    ///
    /// Returns one entry per requested slot, in order. Empty and out-of-range
    /// slots resolve to `None`; dead occupants are still returned.
    ///
    /// # Errors
    ///
    /// [`TargetingError::NotInArena`] when the caster is not placed.
    pub fn find_target(
        &self,
        caster: CombatantId,
        spec: &Targeting,
    ) -> Result<Vec<Option<CombatantId>>, TargetingError> {
        self.find_target_where(caster, spec, |_| true)
    }

    /// Like [`Arena::find_target`], mapping occupants rejected by `keep` to
    /// `None`.
    ///
    /// # Errors
    ///
    /// [`TargetingError::NotInArena`] when the caster is not placed.
    pub fn find_target_where(
        &self,
        caster: CombatantId,
        spec: &Targeting,
        keep: impl Fn(&Combatant) -> bool,
    ) -> Result<Vec<Option<CombatantId>>, TargetingError> {
        let position = self
            .position_of(caster)
            .ok_or(TargetingError::NotInArena)?;
        let own = self.row(position.side());

        let found: Vec<Option<CombatantId>> = match spec.raw_slots() {
            Slots::Itself => vec![Some(caster)],
            Slots::ExceptItself => own
                .iter()
                .enumerate()
                .filter(|(slot, _)| *slot != position.slot())
                .map(|(_, cell)| *cell)
                .collect(),
            Slots::At(slots) => {
                let row = self.row(spec.relation().row_for(position.side()));
                slots
                    .iter()
                    .map(|slot| row.get(*slot).copied().flatten())
                    .collect()
            }
        };

        Ok(found
            .into_iter()
            .map(|hit| hit.filter(|id| self.get(*id).is_some_and(&keep)))
            .collect())
    }

    /// Moves `id` to `slot` in its own row.
    ///
    /// Everyone between the old and new slot shifts one step toward the
    /// vacated slot. `MOVE` is dispatched on the mover and on every displaced
    /// combatant, each with its own new slot. Returns the displaced ids.
    ///
    /// # Errors
    ///
    /// [`ArenaError::UnknownCombatant`] for an unplaced id,
    /// [`ArenaError::OutOfRange`] for a slot outside the row.
    pub fn move_to(
        &mut self,
        id: CombatantId,
        slot: usize,
    ) -> Result<Vec<CombatantId>, ArenaError> {
        let from = self
            .position_of(id)
            .ok_or(ArenaError::UnknownCombatant(id))?;
        if slot >= ARENA_WIDTH {
            return Err(ArenaError::OutOfRange { slot });
        }

        let row = self.row_mut(from.side());
        let mut shifted = Vec::new();
        if from.slot() < slot {
            for i in from.slot()..slot {
                row[i] = row[i + 1];
                if let Some(other) = row[i] {
                    shifted.push((other, i));
                }
            }
        } else {
            for i in (slot + 1..=from.slot()).rev() {
                row[i] = row[i - 1];
                if let Some(other) = row[i] {
                    shifted.push((other, i));
                }
            }
        }
        row[slot] = Some(id);

        if let Some(mover) = self.get_mut(id) {
            mover.dispatch(Timing::MOVE, &mut Baton::moved(slot));
        }
        for (other, new_slot) in &shifted {
            if let Some(displaced) = self.get_mut(*other) {
                displaced.dispatch(Timing::MOVE, &mut Baton::moved(*new_slot));
            }
        }
        tracing::debug!(%id, from = from.slot(), to = slot, displaced = shifted.len(), "moved");
        Ok(shifted.into_iter().map(|(other, _)| other).collect())
    }

    // -------------------------------------------------------------------------
    // Turn order
    // -------------------------------------------------------------------------

    /// Living, placed combatants sorted by queried speed, fastest first.
    ///
    /// Ties keep row order: left slots 0..N, then right slots 0..N.
    #[must_use]
    pub fn compute_turn_order(&self) -> Vec<CombatantId> {
        let mut order: Vec<(CombatantId, i64)> = self
            .left
            .iter()
            .chain(self.right.iter())
            .flatten()
            .filter_map(|id| {
                self.get(*id)
                    .filter(|c| c.is_alive())
                    .map(|c| (*id, c.speed()))
            })
            .collect();
        order.sort_by_key(|(_, speed)| std::cmp::Reverse(*speed));
        order.into_iter().map(|(id, _)| id).collect()
    }

    /// Starts a new round: bumps the counter and recomputes the order.
    pub fn start_round(&mut self) {
        self.round += 1;
        self.order = self.compute_turn_order().into();
        self.current = None;
        tracing::debug!(round = self.round, order = ?self.order, "round started");
    }

    /// Pops the next combatant able to act, skipping the dead and the
    /// unplaced. Returns `None` once the round is exhausted.
    pub fn next_actor(&mut self) -> Option<CombatantId> {
        while let Some(id) = self.order.pop_front() {
            let ready = self.get(id).is_some_and(Combatant::is_alive)
                && self.position_of(id).is_some();
            if ready {
                self.current = Some(id);
                return Some(id);
            }
        }
        self.current = None;
        None
    }

    /// Drops the dead from the rest of this round's order.
    pub fn clean_dead_in_order(&mut self) {
        let combatants = &self.combatants;
        self.order
            .retain(|id| combatants.get(id).is_some_and(Combatant::is_alive));
    }

    /// True when nobody is left to act this round.
    #[must_use]
    pub fn round_over(&self) -> bool {
        self.order.is_empty()
    }

    /// Who still acts this round, front first.
    #[must_use]
    pub fn pending(&self) -> &VecDeque<CombatantId> {
        &self.order
    }

    /// Rounds started so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Who is acting now.
    #[must_use]
    pub fn current(&self) -> Option<CombatantId> {
        self.current
    }

    // -------------------------------------------------------------------------
    // Outcome
    // -------------------------------------------------------------------------

    /// True when every slot of `side` is empty or holds the dead.
    #[must_use]
    pub fn side_defeated(&self, side: Side) -> bool {
        self.row(side)
            .iter()
            .flatten()
            .all(|id| !self.get(*id).is_some_and(Combatant::is_alive))
    }

    /// True when one side is defeated.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.side_defeated(Side::Left) || self.side_defeated(Side::Right)
    }

    /// The winner of a finished battle, `None` while both sides stand.
    #[must_use]
    pub fn winner(&self) -> Option<Winner> {
        match (self.side_defeated(Side::Left), self.side_defeated(Side::Right)) {
            (true, true) => Some(Winner::Draw),
            (false, true) => Some(Winner::Left),
            (true, false) => Some(Winner::Right),
            (false, false) => None,
        }
    }
}

impl fmt::Display for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round {}", self.round)?;
        for side in [Side::Left, Side::Right] {
            write!(f, "{side}:")?;
            for cell in self.row(side) {
                match cell.and_then(|id| self.get(id)) {
                    Some(combatant) => write!(f, " [{combatant}]")?,
                    None => write!(f, " [-]")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
