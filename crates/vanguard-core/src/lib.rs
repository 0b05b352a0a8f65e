//! # Vanguard Core
//!
//! Combat resolution core for Vanguard, a turn-based slot battler.
//!
//! Two parties occupy fixed-width slot rows and take turns issuing actions
//! (attacks, defenses, movement, buffs). Every action runs through a layered
//! pipeline of requirements, target resolution and effect sequencing, while
//! buffs and equipment ("factors") react to combat events at well-defined
//! dispatch points.
//!
//! ## Architecture
//!
//! - **Targeting**: abstract intents ("all enemies", "myself", "everyone but
//!   me") resolved into concrete slots relative to a caster
//! - **Factors**: buffs and equipment consulted at [`Timing`] dispatch points
//!   through a shared [`Baton`]
//! - **Actions**: requirement checks, target resolution and effects
//! - **Arena**: slot ownership, movement and turn order
//! - **Battle**: the round/turn scheduler driving injected [`Brain`]s
//!
//! ## Usage
//!
//! ```
//! use vanguard_core::battle::{Battle, BattleOutcome};
//! use vanguard_core::config::BattleConfig;
//! use vanguard_core::content;
//!
//! let config = BattleConfig::default().with_seed(7);
//! let mut battle = content::roster::demo_battle(&config).unwrap();
//! let outcome = battle.run().unwrap();
//! assert!(matches!(
//!     outcome,
//!     BattleOutcome::Decided { .. } | BattleOutcome::Stalemate { .. }
//! ));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod arena;
pub mod baton;
pub mod battle;
pub mod brain;
pub mod buff;
pub mod combat;
pub mod combatant;
pub mod config;
pub mod content;
pub mod equipment;
pub mod error;
pub mod factor;
pub mod rng;
pub mod targeting;
pub mod timing;

pub use action::{Action, ActionReport, Decision};
pub use arena::Arena;
pub use baton::Baton;
pub use battle::{Battle, BattleOutcome, TurnReport, Winner};
pub use brain::Brain;
pub use buff::{Buff, BuffKind, Buffs};
pub use combat::{Attack, AttackReport};
pub use combatant::{Combatant, CombatantId};
pub use config::BattleConfig;
pub use equipment::{Equipment, Slot};
pub use error::{ActionError, ArenaError, BattleError, EquipError, TargetingError};
pub use factor::Factor;
pub use rng::{FixedRandom, RandomSource, SeededRandom};
pub use targeting::{Position, Relation, Selection, Side, Targeting, ARENA_WIDTH};
pub use timing::Timing;

#[cfg(test)]
mod tests;
