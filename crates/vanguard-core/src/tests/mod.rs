//! Scenario tests for the battle core.
//!
//! These tests drive whole battles and multi-step interactions through the
//! public API:
//! - **Determinism tests**: the same seed replays the same battle
//! - **Integration tests**: action pipeline, factors and scheduler together
//! - **Helper functions**: utilities for test setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end battle scenarios
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;

// Re-export for convenience
pub use helpers::*;
