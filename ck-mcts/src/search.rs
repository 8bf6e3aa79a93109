//! UCT Monte Carlo Tree Search over `GameSession` positions.
//!
//! One `Mcts` instance runs one decision at a time: a fixed simulation
//! budget of select / expand / evaluate-or-rollout / backpropagate
//! iterations, then picks the most-visited root child. Expansion can be
//! biased by a `MoveSelector` exposing per-move scores; evaluation can be
//! short-circuited by a `PositionEvaluator` instead of playing rollouts.

use crate::agent::{BoxedEvaluator, BoxedSelector, MoveSelector, PositionEvaluator};
use crate::arena::Arena;
use crate::node::{Node, NodeId};
use ck_core::{Board, GameSession, Move, SearchConfig, Side, Status};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use thiserror::Error;

/// Guards the divisions in the UCT score for unvisited children.
const EPS: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search config: {msg}")]
    InvalidConfig { msg: &'static str },
    #[error("root has {legal} legal moves but no child was ever expanded")]
    NoExpandedChildren { legal: usize },
    #[error("position evaluator returned a non-finite value")]
    BadEvaluation,
    #[error("recorded move failed to replay: {0}")]
    Replay(#[from] ck_core::ApplyError),
}

pub struct Mcts {
    cfg: SearchConfig,
    arena: Arena,
    rng: ChaCha8Rng,
}

impl Mcts {
    pub fn new(cfg: SearchConfig, seed: u64) -> Result<Self, SearchError> {
        if !(cfg.c_explore.is_finite() && cfg.c_explore > 0.0) {
            return Err(SearchError::InvalidConfig {
                msg: "c_explore must be finite and > 0",
            });
        }
        if cfg.simulations == 0 {
            return Err(SearchError::InvalidConfig {
                msg: "simulations must be > 0",
            });
        }
        if cfg.rollout_cap == 0 {
            return Err(SearchError::InvalidConfig {
                msg: "rollout_cap must be > 0",
            });
        }
        Ok(Self {
            cfg,
            arena: Arena::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Visit count accumulated on the root's children in the last search.
    pub fn root_child_visits(&self) -> u32 {
        if self.arena.is_empty() {
            return 0;
        }
        self.arena
            .get(0)
            .children
            .iter()
            .map(|&(_, cid)| self.arena.get(cid).visits)
            .sum()
    }

    /// Run the configured simulation budget from `session` and pick a move
    /// for the side to move.
    ///
    /// `Ok(None)` is the no-move signal: the position is already decided or
    /// offers no legal move. It is not an error; callers check it before
    /// acting on the result.
    pub fn select_move(
        &mut self,
        session: &GameSession,
        mut policy: Option<&mut dyn MoveSelector>,
        mut evaluator: Option<&mut dyn PositionEvaluator>,
    ) -> Result<Option<Move>, SearchError> {
        if session.is_over() {
            return Ok(None);
        }
        let root_moves = session.legal_moves();
        let legal_count = root_moves.len();
        if legal_count == 0 {
            return Ok(None);
        }
        let searcher = session.to_move();

        self.arena = Arena::new();
        let root = self.arena.push(Node::new(None, root_moves, false));

        for _ in 0..self.cfg.simulations {
            let mut sess = session.clone();
            let mut id = root;

            // Selection: walk down while fully expanded and alive.
            loop {
                let node = self.arena.get(id);
                if node.terminal || !node.fully_expanded() {
                    break;
                }
                let Some((mv, next)) = self.best_child(id) else {
                    break;
                };
                sess.apply(&mv)?;
                id = next;
            }

            // Expansion: materialize one untried move as a new child.
            let node = self.arena.get(id);
            if !node.terminal && !node.fully_expanded() {
                let idx = {
                    let arena = &self.arena;
                    let rng = &mut self.rng;
                    choose_untried(rng, &mut policy, sess.board(), &arena.get(id).untried)
                };
                let mv = self.arena.get_mut(id).untried.remove(idx);
                sess.apply(&mv)?;
                let terminal = sess.is_over();
                let untried = if terminal {
                    Vec::new()
                } else {
                    sess.legal_moves()
                };
                let child = self.arena.push(Node::new(Some(id), untried, terminal));
                self.arena.get_mut(id).children.push((mv, child));
                id = child;
            }

            // Evaluation: direct scalar if an evaluator is plugged in,
            // otherwise a playout to a terminal state.
            let reward = match &mut evaluator {
                Some(eval) => {
                    let value = eval.evaluate(sess.board());
                    if !value.is_finite() {
                        return Err(SearchError::BadEvaluation);
                    }
                    value.clamp(-1.0, 1.0)
                }
                None => self.rollout(sess, searcher, &mut policy)?,
            };

            self.backpropagate(id, reward);
        }

        let root_node = self.arena.get(root);
        if root_node.children.is_empty() {
            // Legal moves existed but expansion never ran: bookkeeping defect.
            return Err(SearchError::NoExpandedChildren { legal: legal_count });
        }
        let mut best: Option<(u32, &Move)> = None;
        for (mv, cid) in &root_node.children {
            let visits = self.arena.get(*cid).visits;
            if best.map_or(true, |(b, _)| visits > b) {
                best = Some((visits, mv));
            }
        }
        Ok(best.map(|(_, mv)| mv.clone()))
    }

    /// UCT child pick, ties to the first-encountered maximum.
    fn best_child(&self, id: NodeId) -> Option<(Move, NodeId)> {
        let parent = self.arena.get(id);
        let parent_visits = parent.visits;
        let mut best: Option<(f64, &(Move, NodeId))> = None;
        for edge in &parent.children {
            let child = self.arena.get(edge.1);
            let visits = child.visits as f64 + EPS;
            let exploit = child.value_sum / visits;
            let explore = self.cfg.c_explore * ((parent_visits as f64 + 1.0).ln() / visits).sqrt();
            let score = exploit + explore;
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, edge));
            }
        }
        best.map(|(_, (mv, cid))| (mv.clone(), *cid))
    }

    /// Play out to a terminal state (bounded by `rollout_cap`; the cap
    /// scores as a draw). The searching side moves through its own selector
    /// when one is plugged in; the opponent moves uniformly at random.
    fn rollout(
        &mut self,
        mut sess: GameSession,
        searcher: Side,
        policy: &mut Option<&mut dyn MoveSelector>,
    ) -> Result<f64, SearchError> {
        for _ in 0..self.cfg.rollout_cap {
            if sess.is_over() {
                break;
            }
            let legal = sess.legal_moves();
            let chosen = if sess.to_move() == searcher {
                match policy {
                    Some(p) => p.select(sess.board(), &legal),
                    None => None,
                }
            } else {
                None
            };
            let mv =
                chosen.unwrap_or_else(|| legal[self.rng.gen_range(0..legal.len())].clone());
            sess.apply(&mv)?;
        }
        Ok(match sess.status() {
            Status::Won(side) if side == searcher => 1.0,
            Status::Won(_) => -1.0,
            Status::Drawn | Status::InProgress => 0.0,
        })
    }

    /// Walk from the evaluated node to the root, flipping the reward sign
    /// each ply.
    fn backpropagate(&mut self, mut id: NodeId, mut reward: f64) {
        loop {
            let node = self.arena.get_mut(id);
            node.visits += 1;
            node.value_sum += reward;
            reward = -reward;
            match node.parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
    }
}

/// Index of the untried move to expand: softmax-biased when the policy
/// exposes scores, uniform otherwise.
fn choose_untried(
    rng: &mut ChaCha8Rng,
    policy: &mut Option<&mut dyn MoveSelector>,
    board: &Board,
    untried: &[Move],
) -> usize {
    if untried.len() > 1 {
        if let Some(p) = policy {
            if let Some(scores) = p.move_scores(board, untried) {
                if scores.len() == untried.len() {
                    if let Some(idx) = sample_softmax(rng, &scores) {
                        return idx;
                    }
                }
            }
        }
    }
    rng.gen_range(0..untried.len())
}

/// Softmax sample, stabilized by subtracting the maximum score before
/// exponentiating. Degenerate score vectors fall back to uniform (`None`).
fn sample_softmax(rng: &mut ChaCha8Rng, scores: &[f64]) -> Option<usize> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    let weights: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let dist = WeightedIndex::new(&weights).ok()?;
    Some(dist.sample(rng))
}

/// A `MoveSelector` backed by a full search.
///
/// Wraps an `Mcts` plus the inner capabilities the search consults. The
/// side to move is recovered from the owner of the first legal move, so the
/// selector fits the plain capability interface.
pub struct SearchPolicy {
    mcts: Mcts,
    policy: Option<BoxedSelector>,
    evaluator: Option<BoxedEvaluator>,
}

impl SearchPolicy {
    pub fn new(
        cfg: SearchConfig,
        seed: u64,
        policy: Option<BoxedSelector>,
        evaluator: Option<BoxedEvaluator>,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            mcts: Mcts::new(cfg, seed)?,
            policy,
            evaluator,
        })
    }
}

impl MoveSelector for SearchPolicy {
    fn select(&mut self, board: &Board, legal: &[Move]) -> Option<Move> {
        let first = legal.first()?;
        let side = board.piece_at(first.from)?.side;
        let session = GameSession::with_position(board.clone(), side);
        let policy = self
            .policy
            .as_deref_mut()
            .map(|p| p as &mut dyn MoveSelector);
        let evaluator = self
            .evaluator
            .as_deref_mut()
            .map(|e| e as &mut dyn PositionEvaluator);
        match self.mcts.select_move(&session, policy, evaluator) {
            Ok(mv) => mv,
            Err(err) => {
                // Surfaced to the caller as a stalled selector; the harness
                // turns that into a task failure rather than a batch abort.
                eprintln!("search-backed selector failed: {err}");
                None
            }
        }
    }
}
