//! Match scoring.

use serde::{Deserialize, Serialize};

/// Scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Points per destroyed block before bonuses.
    pub base_per_block: u32,
    /// Match size at which the standard bonus multiplier applies.
    pub bonus_threshold: usize,
    pub bonus_multiplier: u32,
    /// Match size at which the large bonus multiplier applies instead.
    pub big_bonus_threshold: usize,
    pub big_bonus_multiplier: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            base_per_block: 10,
            bonus_threshold: 4,
            bonus_multiplier: 2,
            big_bonus_threshold: 6,
            big_bonus_multiplier: 3,
        }
    }
}

/// Converts a matched group size into points.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    config: ScoreConfig,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(ScoreConfig::default())
    }
}

impl ScoreCalculator {
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    /// `match_size * base`, then the multiplier of the largest satisfied
    /// threshold. Thresholds are checked largest-first, so meeting the big
    /// threshold always pays the big bonus.
    pub fn score(&self, match_size: usize) -> u32 {
        let base = match_size as u32 * self.config.base_per_block;
        if match_size >= self.config.big_bonus_threshold {
            base * self.config.big_bonus_multiplier
        } else if match_size >= self.config.bonus_threshold {
            base * self.config.bonus_multiplier
        } else {
            base
        }
    }
}
