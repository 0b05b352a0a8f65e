//! Positions and targeting specs.
//!
//! A [`Targeting`] describes *who* an action or effect reaches in abstract
//! terms: a relation (ally or enemy), a selection mode (a single chosen slot
//! or every listed slot at once) and a slot list. Two sentinel slot lists,
//! "the caster itself" and "every slot except the caster's", stay abstract
//! until [`Targeting::alt`] resolves them against a concrete [`Position`].
//! This lets one action definition be shared by every combatant regardless
//! of where they stand.
//!
//! An empty resolved slot list is the canonical "no valid target" state.
//!
//! # Example
//!
//! ```
//! use vanguard_core::targeting::{Position, Selection, Side, Targeting};
//!
//! let spec = Targeting::except_itself(Selection::Area);
//! let resolved = spec.alt(Position::new(Side::Left, 1).unwrap());
//! assert_eq!(resolved.slots(), &[0, 2, 3]);
//! assert_eq!(resolved.to_string(), "ally area [0, 2, 3]");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TargetingError;
use crate::rng::RandomSource;

/// Number of slots in each side's row.
pub const ARENA_WIDTH: usize = 4;

// =============================================================================
// Position
// =============================================================================

/// One of the two opposing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The left row (the demo's player party).
    Left,
    /// The right row.
    Right,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A (side, slot) pair. The slot is always inside `[0, ARENA_WIDTH)`.
///
/// Deserialization goes through [`Position::new`], so decoded positions keep
/// the same guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    side: Side,
    slot: usize,
}

/// Unchecked wire form of [`Position`].
#[derive(Deserialize)]
struct RawPosition {
    side: Side,
    slot: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = TargetingError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.side, raw.slot)
    }
}

impl Position {
    /// Creates a position, rejecting slots outside the arena.
    ///
    /// # Errors
    ///
    /// Returns [`TargetingError::OutOfRange`] when `slot >= ARENA_WIDTH`.
    pub fn new(side: Side, slot: usize) -> Result<Self, TargetingError> {
        if slot >= ARENA_WIDTH {
            return Err(TargetingError::OutOfRange { slot });
        }
        Ok(Self { side, slot })
    }

    /// Builds a position from an index already known to be in range.
    pub(crate) const fn at(side: Side, slot: usize) -> Self {
        Self { side, slot }
    }

    /// The row this position belongs to.
    #[must_use]
    pub const fn side(self) -> Side {
        self.side
    }

    /// The slot index within the row.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.side, self.slot)
    }
}

// =============================================================================
// Targeting
// =============================================================================

/// Which row a spec reaches, relative to the caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// The caster's own row.
    Ally,
    /// The opposing row.
    Enemy,
}

impl Relation {
    /// True for [`Relation::Ally`].
    #[must_use]
    pub const fn is_friendly(self) -> bool {
        matches!(self, Relation::Ally)
    }

    /// The row this relation names for a caster standing on `caster`.
    #[must_use]
    pub const fn row_for(self, caster: Side) -> Side {
        match self {
            Relation::Ally => caster,
            Relation::Enemy => caster.opposite(),
        }
    }
}

/// Whether a spec is aimed at one chosen slot or hits every listed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// One slot chosen from the candidates.
    Single,
    /// Every listed slot at once.
    Area,
}

/// The slot list of a spec, possibly still a caster-relative sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slots {
    /// The caster's own slot.
    Itself,
    /// Every slot of the caster's row except its own.
    ExceptItself,
    /// Concrete slot indices.
    At(Vec<usize>),
}

/// An abstract or resolved description of who an effect reaches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Targeting {
    relation: Relation,
    selection: Selection,
    slots: Slots,
}

impl Targeting {
    /// Creates a concrete spec over the given slots.
    #[must_use]
    pub fn new(
        relation: Relation,
        selection: Selection,
        slots: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            relation,
            selection,
            slots: Slots::At(slots.into_iter().collect()),
        }
    }

    /// A single enemy chosen from `slots`.
    #[must_use]
    pub fn single_enemy(slots: &[usize]) -> Self {
        Self::new(Relation::Enemy, Selection::Single, slots.iter().copied())
    }

    /// Every enemy in `slots`.
    #[must_use]
    pub fn area_enemy(slots: &[usize]) -> Self {
        Self::new(Relation::Enemy, Selection::Area, slots.iter().copied())
    }

    /// A single ally chosen from `slots`.
    #[must_use]
    pub fn single_ally(slots: &[usize]) -> Self {
        Self::new(Relation::Ally, Selection::Single, slots.iter().copied())
    }

    /// Every ally in `slots`.
    #[must_use]
    pub fn area_ally(slots: &[usize]) -> Self {
        Self::new(Relation::Ally, Selection::Area, slots.iter().copied())
    }

    /// The caster itself. Never needs a chosen target.
    #[must_use]
    pub const fn itself() -> Self {
        Self {
            relation: Relation::Ally,
            selection: Selection::Area,
            slots: Slots::Itself,
        }
    }

    /// Every slot of the caster's row except its own.
    #[must_use]
    pub const fn except_itself(selection: Selection) -> Self {
        Self {
            relation: Relation::Ally,
            selection,
            slots: Slots::ExceptItself,
        }
    }

    /// The relation of this spec.
    #[must_use]
    pub const fn relation(&self) -> Relation {
        self.relation
    }

    /// The selection mode of this spec.
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// True when the spec is aimed at a single chosen slot.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self.selection, Selection::Single)
    }

    /// True when the slot list is still a caster-relative sentinel.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        !matches!(self.slots, Slots::At(_))
    }

    /// The raw slot list, sentinel or concrete.
    #[must_use]
    pub const fn raw_slots(&self) -> &Slots {
        &self.slots
    }

    /// Concrete slot indices. Sentinels have none until resolved by
    /// [`Targeting::alt`].
    #[must_use]
    pub fn slots(&self) -> &[usize] {
        match &self.slots {
            Slots::At(slots) => slots,
            Slots::Itself | Slots::ExceptItself => &[],
        }
    }

    /// True for a resolved spec with no candidate left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&self.slots, Slots::At(slots) if slots.is_empty())
    }

    /// True when `slot` is one of the concrete candidates.
    #[must_use]
    pub fn includes(&self, slot: usize) -> bool {
        self.slots().contains(&slot)
    }

    /// Resolves the sentinels against `position`.
    ///
    /// "Itself" becomes a Single spec over exactly the position's slot;
    /// "except itself" becomes an Area spec over every other slot. Concrete
    /// specs are returned unchanged.
    #[must_use]
    pub fn alt(&self, position: Position) -> Targeting {
        match self.slots {
            Slots::Itself => Targeting::new(self.relation, Selection::Single, [position.slot()]),
            Slots::ExceptItself => Targeting::new(
                self.relation,
                Selection::Area,
                (0..ARENA_WIDTH).filter(|slot| *slot != position.slot()),
            ),
            Slots::At(_) => self.clone(),
        }
    }

    /// Returns the same candidates under a different selection mode.
    #[must_use]
    pub fn with_selection(&self, selection: Selection) -> Targeting {
        Targeting {
            selection,
            ..self.clone()
        }
    }

    /// Keeps only the concrete slots accepted by `keep`.
    #[must_use]
    pub fn retain_slots(&self, mut keep: impl FnMut(usize) -> bool) -> Targeting {
        match &self.slots {
            Slots::At(slots) => Targeting::new(
                self.relation,
                self.selection,
                slots.iter().copied().filter(|slot| keep(*slot)),
            ),
            Slots::Itself | Slots::ExceptItself => self.clone(),
        }
    }

    /// Narrows a Single spec to one slot drawn uniformly from its candidates.
    ///
    /// Area specs, sentinels and empty specs are returned unchanged.
    #[must_use]
    pub fn random_choose(&self, rng: &mut dyn RandomSource) -> Targeting {
        let slots = self.slots();
        if !self.is_single() || slots.is_empty() {
            return self.clone();
        }
        let pick = slots[rng.choice(slots.len()).min(slots.len() - 1)];
        Targeting::new(self.relation, self.selection, [pick])
    }

    /// Narrows a Single spec to exactly `slot`. Area specs are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TargetingError::OutOfRange`] when `slot >= ARENA_WIDTH`.
    pub fn choose(&self, slot: usize) -> Result<Targeting, TargetingError> {
        if slot >= ARENA_WIDTH {
            return Err(TargetingError::OutOfRange { slot });
        }
        if !self.is_single() {
            return Ok(self.clone());
        }
        Ok(Targeting::new(self.relation, self.selection, [slot]))
    }
}

impl fmt::Display for Targeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = match self.relation {
            Relation::Ally => "ally",
            Relation::Enemy => "enemy",
        };
        let selection = match self.selection {
            Selection::Single => "single",
            Selection::Area => "area",
        };
        match &self.slots {
            Slots::Itself => write!(f, "{relation} {selection} itself"),
            Slots::ExceptItself => write!(f, "{relation} {selection} except-itself"),
            Slots::At(slots) => write!(f, "{relation} {selection} {slots:?}"),
        }
    }
}
