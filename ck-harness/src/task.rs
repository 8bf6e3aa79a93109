//! Single-task execution: paired side-swapped games plus fitness shaping.

use crate::{splitmix64, CandidateId, CandidateRegistry, MatchTask, OpponentSpec};
use ck_core::{Config, FitnessConfig, GameSession, Side, Status};
use ck_mcts::{BoxedSelector, GreedyAgent, MoveSelector, RandomAgent};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Errors inside one match task. They fail the task, never the batch.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("malformed candidate {id}: {msg}")]
    Candidate { id: CandidateId, msg: String },
    #[error("opponent pool has no entry {index}")]
    MissingOpponent { index: usize },
    #[error("selector returned no move on a non-empty legal set")]
    SelectorStalled,
    #[error("selector produced an illegal move: {0}")]
    Rules(#[from] ck_core::ApplyError),
}

/// Accumulated score of one task.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskScore {
    pub fitness: f64,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// Outcome of one task, ready for reduction.
#[derive(Debug)]
pub struct TaskResult {
    pub policy_id: CandidateId,
    pub value_id: CandidateId,
    pub outcome: Result<TaskScore, MatchError>,
}

pub(crate) fn run_task(
    task: &MatchTask,
    registry: &dyn CandidateRegistry,
    cfg: &Config,
) -> TaskResult {
    TaskResult {
        policy_id: task.policy_id,
        value_id: task.value_id,
        outcome: execute(task, registry, cfg),
    }
}

fn execute(
    task: &MatchTask,
    registry: &dyn CandidateRegistry,
    cfg: &Config,
) -> Result<TaskScore, MatchError> {
    let mut score = TaskScore::default();
    for repeat in 0..task.repeats {
        let repeat_seed = splitmix64(task.seed ^ repeat as u64);
        let mut candidate = registry.build_candidate(task.policy_id, task.value_id, repeat_seed)?;
        let opp_seed = splitmix64(repeat_seed.wrapping_add(0x9E37_79B9_7F4A_7C15));
        let mut opponent = build_opponent(registry, task.opponent, opp_seed)?;

        // Seen-position set spans both games of the swap pair.
        let mut seen: FxHashSet<u128> = FxHashSet::default();
        for cand_side in [Side::Red, Side::Black] {
            let game = play_game(
                candidate.as_mut(),
                opponent.as_mut(),
                cand_side,
                task.max_moves,
                &mut seen,
                &cfg.fitness,
            )?;
            score.fitness += game.fitness;
            score.games += 1;
            match game.result {
                GameResult::Win => score.wins += 1,
                GameResult::Loss => score.losses += 1,
                GameResult::Draw => score.draws += 1,
            }
        }
    }
    Ok(score)
}

fn build_opponent(
    registry: &dyn CandidateRegistry,
    spec: OpponentSpec,
    seed: u64,
) -> Result<BoxedSelector, MatchError> {
    match spec {
        OpponentSpec::Pool(index) => registry.build_pool_opponent(index, seed),
        // Baseline games alternate between the two trivial agents so the
        // candidate faces a less uniform opposition.
        OpponentSpec::Baseline => {
            let agent: BoxedSelector = if seed & 1 == 0 {
                Box::new(RandomAgent::new(seed))
            } else {
                Box::new(GreedyAgent::new(seed))
            };
            Ok(agent)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GameResult {
    Win,
    Loss,
    Draw,
}

struct GameScore {
    fitness: f64,
    result: GameResult,
}

/// One game from the candidate's perspective, shaped per `FitnessConfig`.
fn play_game(
    candidate: &mut dyn MoveSelector,
    opponent: &mut dyn MoveSelector,
    cand_side: Side,
    max_moves: u32,
    seen: &mut FxHashSet<u128>,
    weights: &FitnessConfig,
) -> Result<GameScore, MatchError> {
    let mut session = GameSession::new();
    let mut fitness = 0.0;
    let mut repeated: u32 = 0;
    let mut good_moves: u32 = 0;
    let mut max_advantage: i64 = 0;
    let mut moves_played: u32 = 0;

    while !session.is_over() && moves_played < max_moves {
        if !seen.insert(session.board().state_key()) {
            repeated += 1;
        }

        let prev_cand = session.board().piece_count(cand_side);
        let prev_opp = session.board().piece_count(cand_side.opponent());

        let legal = session.legal_moves();
        let mover = session.to_move();
        let mv = if mover == cand_side {
            candidate.select(session.board(), &legal)
        } else {
            opponent.select(session.board(), &legal)
        }
        .ok_or(MatchError::SelectorStalled)?;
        session.apply(&mv)?;
        moves_played += 1;

        let cur_cand = session.board().piece_count(cand_side);
        let cur_opp = session.board().piece_count(cand_side.opponent());
        if mover == cand_side {
            good_moves += 1;
            fitness += weights.capture_bonus * prev_opp.saturating_sub(cur_opp) as f64;
        } else {
            fitness -= weights.piece_loss_penalty * prev_cand.saturating_sub(cur_cand) as f64;
        }

        let advantage = cur_cand as i64 - cur_opp as i64;
        if advantage > max_advantage {
            max_advantage = advantage;
        }
    }

    let margin = session.board().piece_count(cand_side) as i64
        - session.board().piece_count(cand_side.opponent()) as i64;
    let result = match session.status() {
        Status::Won(side) if side == cand_side => {
            fitness += weights.win_bonus
                + weights.margin_weight * margin as f64
                + weights.speed_weight * (max_moves - moves_played) as f64;
            GameResult::Win
        }
        Status::Won(_) => {
            fitness -= weights.loss_penalty;
            GameResult::Loss
        }
        // A hit move cap scores as a draw.
        Status::Drawn | Status::InProgress => {
            fitness -= weights.draw_penalty;
            GameResult::Draw
        }
    };

    fitness -= weights.repetition_penalty * repeated as f64;
    fitness += weights.good_move_bonus * good_moves as f64;
    fitness += weights.advantage_weight * max_advantage as f64;

    Ok(GameScore { fitness, result })
}
