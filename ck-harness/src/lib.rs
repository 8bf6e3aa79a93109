//! ck-harness: self-play evaluation batches over a worker pool.
//!
//! A generation is the cross-product of every (policy, value) candidate pair
//! with every opponent-pool entry, each expanded into independent match
//! tasks. Tasks are pure data; workers rebuild capabilities from a shared
//! read-only registry, play paired side-swapped games, and return one
//! fitness scalar per task. Results are reduced by summation, which is
//! commutative, so completion order never matters.

pub mod task;

use ck_core::Config;
use ck_mcts::BoxedSelector;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;

pub use task::{MatchError, TaskResult, TaskScore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Opaque candidate identity assigned by the learning layer.
pub type CandidateId = u64;

/// Where a task's opponent comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentSpec {
    /// Index into the bounded pool of retained prior champions.
    Pool(usize),
    /// Synthetic baseline opponent (pool is empty).
    Baseline,
}

/// One match task: pure data, freely distributable across workers.
#[derive(Debug, Clone, Copy)]
pub struct MatchTask {
    pub policy_id: CandidateId,
    pub value_id: CandidateId,
    pub opponent: OpponentSpec,
    /// Swap-pairs to play (each repeat is two games with sides swapped).
    pub repeats: u32,
    /// Per-game move cap; hitting it scores as a draw.
    pub max_moves: u32,
    pub seed: u64,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid harness config: {0}")]
    InvalidConfig(&'static str),
    #[error("worker pool construction failed: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Shared read-only registry the workers rebuild capabilities from.
///
/// Workers receive candidate ids, never serialized capability objects. A
/// builder failure (malformed candidate data) fails the one task that needed
/// it; the batch keeps going.
pub trait CandidateRegistry: Sync {
    fn policy_ids(&self) -> Vec<CandidateId>;
    fn value_ids(&self) -> Vec<CandidateId>;

    /// Number of retained prior champions available as opponents.
    fn pool_len(&self) -> usize;

    /// Playing selector for a (policy, value) candidate pair. The registry
    /// decides the wiring: a bare learned selector, or a search over the
    /// pair.
    fn build_candidate(
        &self,
        policy_id: CandidateId,
        value_id: CandidateId,
        seed: u64,
    ) -> Result<BoxedSelector, MatchError>;

    /// Playing selector for opponent-pool entry `index` (0 = oldest).
    fn build_pool_opponent(&self, index: usize, seed: u64) -> Result<BoxedSelector, MatchError>;
}

/// Stable seed mixer (standard SplitMix64).
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Full task list for one generation: every (policy, value) pair against
/// every opponent entry (a single baseline when the pool is empty), with
/// deterministic per-task seeds derived from `harness.seed`.
pub fn build_schedule(registry: &dyn CandidateRegistry, cfg: &Config) -> Vec<MatchTask> {
    let pool = registry.pool_len().min(cfg.harness.opponent_pool_cap);
    let opponents: Vec<OpponentSpec> = if pool == 0 {
        vec![OpponentSpec::Baseline]
    } else {
        (0..pool).map(OpponentSpec::Pool).collect()
    };

    let policy_ids = registry.policy_ids();
    let value_ids = registry.value_ids();
    let mut tasks = Vec::with_capacity(policy_ids.len() * value_ids.len() * opponents.len());
    let mut counter: u64 = 0;
    for &policy_id in &policy_ids {
        for &value_id in &value_ids {
            for &opponent in &opponents {
                counter += 1;
                tasks.push(MatchTask {
                    policy_id,
                    value_id,
                    opponent,
                    repeats: cfg.harness.repeats,
                    max_moves: cfg.harness.max_moves,
                    seed: splitmix64(cfg.harness.seed ^ counter),
                });
            }
        }
    }
    tasks
}

/// A task that could not produce a score; its fitness contribution is zero.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub policy_id: CandidateId,
    pub value_id: CandidateId,
    pub error: String,
}

/// Reduced result of one generation.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub policy_fitness: FxHashMap<CandidateId, f64>,
    pub value_fitness: FxHashMap<CandidateId, f64>,
    pub tasks: usize,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub failures: Vec<TaskFailure>,
}

impl GenerationOutcome {
    /// Highest-fitness id in `map` (lowest id on ties), for reporting.
    pub fn best_of(map: &FxHashMap<CandidateId, f64>) -> Option<(CandidateId, f64)> {
        let mut best: Option<(CandidateId, f64)> = None;
        let mut ids: Vec<_> = map.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let fitness = map[&id];
            if best.map_or(true, |(_, b)| fitness > b) {
                best = Some((id, fitness));
            }
        }
        best
    }
}

/// Sum task results into per-candidate totals, then clamp each total at
/// zero.
///
/// Accumulators start from zero for every id on every call, so no fitness
/// carries over between generations. Summation is commutative: any
/// permutation of `results` yields the same totals.
pub fn reduce_results(
    policy_ids: &[CandidateId],
    value_ids: &[CandidateId],
    results: impl IntoIterator<Item = TaskResult>,
) -> GenerationOutcome {
    let mut outcome = GenerationOutcome::default();
    for &id in policy_ids {
        outcome.policy_fitness.insert(id, 0.0);
    }
    for &id in value_ids {
        outcome.value_fitness.insert(id, 0.0);
    }

    for result in results {
        outcome.tasks += 1;
        match result.outcome {
            Ok(score) => {
                *outcome.policy_fitness.entry(result.policy_id).or_insert(0.0) += score.fitness;
                *outcome.value_fitness.entry(result.value_id).or_insert(0.0) += score.fitness;
                outcome.games += score.games;
                outcome.wins += score.wins;
                outcome.losses += score.losses;
                outcome.draws += score.draws;
            }
            Err(err) => {
                outcome.failures.push(TaskFailure {
                    policy_id: result.policy_id,
                    value_id: result.value_id,
                    error: err.to_string(),
                });
            }
        }
    }

    for total in outcome.policy_fitness.values_mut() {
        *total = total.max(0.0);
    }
    for total in outcome.value_fitness.values_mut() {
        *total = total.max(0.0);
    }
    outcome
}

/// Run one full generation: build the schedule, execute every task on the
/// worker pool, wait for the whole batch, then reduce.
///
/// Barrier-style parallelism: nothing streams and nothing cancels mid-batch.
/// A failed task is recorded in the outcome and contributes zero fitness.
pub fn run_generation(
    cfg: &Config,
    registry: &dyn CandidateRegistry,
) -> Result<GenerationOutcome, HarnessError> {
    if cfg.harness.repeats == 0 {
        return Err(HarnessError::InvalidConfig("harness.repeats must be > 0"));
    }
    if cfg.harness.max_moves == 0 {
        return Err(HarnessError::InvalidConfig("harness.max_moves must be > 0"));
    }

    let tasks = build_schedule(registry, cfg);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.harness.workers as usize)
        .build()?;
    let results: Vec<TaskResult> = pool.install(|| {
        tasks
            .par_iter()
            .map(|t| task::run_task(t, registry, cfg))
            .collect()
    });

    Ok(reduce_results(
        &registry.policy_ids(),
        &registry.value_ids(),
        results,
    ))
}


#[cfg(test)]
mod harness_tests;
