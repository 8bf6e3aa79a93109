//! Capability interface between the core and the learning layer.
//!
//! Candidate move-selectors and position-evaluators plug in through these
//! two traits; the built-in baselines below are the closed set of trivial
//! backends used for opponents and tests.

use ck_core::{Board, Move};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// Picks a move for the side owning `legal`.
pub trait MoveSelector {
    /// Must return a member of `legal`, or `None` iff `legal` is empty.
    fn select(&mut self, board: &Board, legal: &[Move]) -> Option<Move>;

    /// Raw per-move scores aligned to `legal`, for backends that expose
    /// them (biases tree expansion). Baselines return `None`.
    fn move_scores(&mut self, _board: &Board, _legal: &[Move]) -> Option<Vec<f64>> {
        None
    }
}

/// Judges a position with a scalar in roughly [-1, 1].
pub trait PositionEvaluator {
    fn evaluate(&mut self, board: &Board) -> f64;
}

pub type BoxedSelector = Box<dyn MoveSelector + Send>;
pub type BoxedEvaluator = Box<dyn PositionEvaluator + Send>;

/// Uniform-random baseline selector.
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl MoveSelector for RandomAgent {
    fn select(&mut self, _board: &Board, legal: &[Move]) -> Option<Move> {
        if legal.is_empty() {
            return None;
        }
        Some(legal[self.rng.gen_range(0..legal.len())].clone())
    }
}

/// Capture-preferring baseline: random among capture moves when any exist,
/// otherwise uniform.
pub struct GreedyAgent {
    rng: ChaCha8Rng,
}

impl GreedyAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl MoveSelector for GreedyAgent {
    fn select(&mut self, _board: &Board, legal: &[Move]) -> Option<Move> {
        if legal.is_empty() {
            return None;
        }
        let captures: Vec<&Move> = legal.iter().filter(|m| m.is_capture()).collect();
        if captures.is_empty() {
            Some(legal[self.rng.gen_range(0..legal.len())].clone())
        } else {
            Some(captures[self.rng.gen_range(0..captures.len())].clone())
        }
    }
}
