//! Unified configuration schema.
//!
//! One YAML file configures the search, the evaluation harness, and the
//! fitness shaping weights. Every field has a default so partial files load.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// MCTS settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Self-play evaluation harness settings.
    #[serde(default)]
    pub harness: HarnessConfig,
    /// Fitness shaping weights.
    #[serde(default)]
    pub fitness: FitnessConfig,
}

/// MCTS settings.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SearchConfig {
    /// UCT exploration constant.
    #[serde(default = "default_c_explore")]
    pub c_explore: f64,
    /// Simulation budget per decision.
    #[serde(default = "default_simulations")]
    pub simulations: u32,
    /// Rollout length bound, in plies; hitting it scores as a draw.
    #[serde(default = "default_rollout_cap")]
    pub rollout_cap: u32,
}

fn default_c_explore() -> f64 {
    1.4
}

fn default_simulations() -> u32 {
    200
}

fn default_rollout_cap() -> u32 {
    150
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            c_explore: default_c_explore(),
            simulations: default_simulations(),
            rollout_cap: default_rollout_cap(),
        }
    }
}

/// Self-play evaluation harness settings.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct HarnessConfig {
    /// Swap-pairs played per task.
    #[serde(default = "default_repeats")]
    pub repeats: u32,
    /// Per-game move cap; hitting it scores as a draw.
    #[serde(default = "default_max_moves")]
    pub max_moves: u32,
    /// Worker threads for the batch pool (0 = pool default).
    #[serde(default)]
    pub workers: u32,
    /// Upper bound on retained prior champions used as opponents.
    #[serde(default = "default_opponent_pool_cap")]
    pub opponent_pool_cap: usize,
    /// Base seed for deterministic per-task seed derivation.
    #[serde(default)]
    pub seed: u64,
}

fn default_repeats() -> u32 {
    3
}

fn default_max_moves() -> u32 {
    100
}

fn default_opponent_pool_cap() -> usize {
    5
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            repeats: default_repeats(),
            max_moves: default_max_moves(),
            workers: 0,
            opponent_pool_cap: default_opponent_pool_cap(),
            seed: 0,
        }
    }
}

/// Fitness shaping weights, from the candidate's perspective.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct FitnessConfig {
    /// Flat bonus for winning a game.
    #[serde(default = "default_win_bonus")]
    pub win_bonus: f64,
    /// Weight on the final piece-count margin of a won game.
    #[serde(default = "default_margin_weight")]
    pub margin_weight: f64,
    /// Weight on the unused move budget of a won game (faster wins score higher).
    #[serde(default = "default_speed_weight")]
    pub speed_weight: f64,
    /// Flat penalty for losing a game.
    #[serde(default = "default_loss_penalty")]
    pub loss_penalty: f64,
    /// Flat penalty for a draw (including a hit move cap); smaller than a loss.
    #[serde(default = "default_draw_penalty")]
    pub draw_penalty: f64,
    /// Bonus per opposing piece captured on the candidate's moves.
    #[serde(default = "default_capture_bonus")]
    pub capture_bonus: f64,
    /// Penalty per own piece lost to the opponent.
    #[serde(default = "default_piece_loss_penalty")]
    pub piece_loss_penalty: f64,
    /// Penalty per previously-seen board position within a task.
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f64,
    /// Small bonus per move the candidate makes.
    #[serde(default = "default_good_move_bonus")]
    pub good_move_bonus: f64,
    /// Weight on the maximum piece advantage ever held during a game.
    #[serde(default = "default_advantage_weight")]
    pub advantage_weight: f64,
}

fn default_win_bonus() -> f64 {
    10.0
}

fn default_margin_weight() -> f64 {
    0.1
}

fn default_speed_weight() -> f64 {
    0.05
}

fn default_loss_penalty() -> f64 {
    5.0
}

fn default_draw_penalty() -> f64 {
    2.0
}

fn default_capture_bonus() -> f64 {
    0.2
}

fn default_piece_loss_penalty() -> f64 {
    0.3
}

fn default_repetition_penalty() -> f64 {
    0.5
}

fn default_good_move_bonus() -> f64 {
    0.05
}

fn default_advantage_weight() -> f64 {
    0.1
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            win_bonus: default_win_bonus(),
            margin_weight: default_margin_weight(),
            speed_weight: default_speed_weight(),
            loss_penalty: default_loss_penalty(),
            draw_penalty: default_draw_penalty(),
            capture_bonus: default_capture_bonus(),
            piece_loss_penalty: default_piece_loss_penalty(),
            repetition_penalty: default_repetition_penalty(),
            good_move_bonus: default_good_move_bonus(),
            advantage_weight: default_advantage_weight(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
