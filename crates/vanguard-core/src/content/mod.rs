//! Named catalog of stock buffs, actions, items and combatants.
//!
//! The core never depends on this module; it exists so the demo binary,
//! the bench and the scenario tests share one set of definitions.
//!
//! - [`buffs`]: stock buff applications
//! - [`actions`]: attacks, defenses, movement and support actions
//! - [`equipment`]: Sword, Shield and Bow
//! - [`roster`]: character and monster templates plus the demo battle

pub mod actions;
pub mod buffs;
pub mod equipment;
pub mod roster;
