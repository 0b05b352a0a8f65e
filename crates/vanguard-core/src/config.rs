//! Battle configuration.

use serde::{Deserialize, Serialize};

/// Rounds played before a battle is called a stalemate.
pub const DEFAULT_MAX_ROUNDS: u32 = 100;

/// Knobs for one battle.
///
/// # Example
///
/// ```
/// use vanguard_core::config::BattleConfig;
///
/// let config = BattleConfig::default().with_seed(9).with_max_rounds(20);
/// assert_eq!(config.seed, 9);
/// assert_eq!(config.max_rounds, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for the battle's random source. Brains derive their own seeds
    /// from it.
    pub seed: u64,
    /// Stalemate after this many rounds.
    pub max_rounds: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl BattleConfig {
    /// Replaces the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the round limit.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = BattleConfig::default();
        assert_eq!(config.seed, 0);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: BattleConfig = serde_json::from_str(r#"{"seed": 5}"#).unwrap();
        assert_eq!(config, BattleConfig::default().with_seed(5));
    }
}
