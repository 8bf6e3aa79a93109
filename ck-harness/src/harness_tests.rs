use crate::task::{TaskResult, TaskScore};
use crate::{
    build_schedule, reduce_results, run_generation, CandidateId, CandidateRegistry, MatchError,
    OpponentSpec,
};
use ck_core::Config;
use ck_mcts::{BoxedSelector, GreedyAgent, RandomAgent};

struct StubRegistry {
    policies: Vec<CandidateId>,
    values: Vec<CandidateId>,
    pool: usize,
    fail_policy: Option<CandidateId>,
}

impl StubRegistry {
    fn new(policies: Vec<CandidateId>, values: Vec<CandidateId>, pool: usize) -> Self {
        Self {
            policies,
            values,
            pool,
            fail_policy: None,
        }
    }
}

impl CandidateRegistry for StubRegistry {
    fn policy_ids(&self) -> Vec<CandidateId> {
        self.policies.clone()
    }

    fn value_ids(&self) -> Vec<CandidateId> {
        self.values.clone()
    }

    fn pool_len(&self) -> usize {
        self.pool
    }

    fn build_candidate(
        &self,
        policy_id: CandidateId,
        _value_id: CandidateId,
        seed: u64,
    ) -> Result<BoxedSelector, MatchError> {
        if self.fail_policy == Some(policy_id) {
            return Err(MatchError::Candidate {
                id: policy_id,
                msg: "corrupt genome data".to_string(),
            });
        }
        Ok(Box::new(RandomAgent::new(seed)))
    }

    fn build_pool_opponent(&self, index: usize, seed: u64) -> Result<BoxedSelector, MatchError> {
        if index >= self.pool {
            return Err(MatchError::MissingOpponent { index });
        }
        Ok(Box::new(GreedyAgent::new(seed)))
    }
}

fn quick_config() -> Config {
    let mut cfg = Config::default();
    cfg.harness.repeats = 1;
    cfg.harness.max_moves = 40;
    cfg.harness.workers = 2;
    cfg
}

fn ok_result(policy_id: CandidateId, value_id: CandidateId, fitness: f64) -> TaskResult {
    TaskResult {
        policy_id,
        value_id,
        outcome: Ok(TaskScore {
            fitness,
            games: 2,
            wins: 1,
            losses: 1,
            draws: 0,
        }),
    }
}

#[test]
fn schedule_is_the_full_cross_product() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1, 2], vec![10, 11], 3);
    let tasks = build_schedule(&registry, &cfg);
    assert_eq!(tasks.len(), 2 * 2 * 3);
    assert!(tasks
        .iter()
        .all(|t| matches!(t.opponent, OpponentSpec::Pool(i) if i < 3)));
}

#[test]
fn schedule_clamps_the_opponent_pool() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1], vec![10], 9);
    let tasks = build_schedule(&registry, &cfg);
    assert_eq!(tasks.len(), cfg.harness.opponent_pool_cap);
}

#[test]
fn empty_pool_schedules_a_single_baseline_opponent() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1, 2], vec![10], 0);
    let tasks = build_schedule(&registry, &cfg);
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.opponent == OpponentSpec::Baseline));
}

#[test]
fn schedule_seeds_are_deterministic_and_distinct() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1, 2], vec![10, 11], 2);
    let a = build_schedule(&registry, &cfg);
    let b = build_schedule(&registry, &cfg);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.seed, y.seed);
    }
    let mut seeds: Vec<u64> = a.iter().map(|t| t.seed).collect();
    seeds.sort_unstable();
    seeds.dedup();
    assert_eq!(seeds.len(), a.len());
}

#[test]
fn reduction_is_order_independent() {
    // 8 tasks, 4 of them for candidate X with contributions summing to 2.75.
    let x: CandidateId = 1;
    let y: CandidateId = 2;
    let make = || {
        vec![
            ok_result(x, 10, 1.0),
            ok_result(y, 10, 0.5),
            ok_result(x, 11, -0.5),
            ok_result(y, 11, 0.5),
            ok_result(x, 10, 2.0),
            ok_result(y, 10, 0.5),
            ok_result(x, 11, 0.25),
            ok_result(y, 11, 0.5),
        ]
    };

    let forward = reduce_results(&[x, y], &[10, 11], make());
    let mut reversed_input = make();
    reversed_input.reverse();
    let reversed = reduce_results(&[x, y], &[10, 11], reversed_input);
    let mut rotated_input = make();
    rotated_input.rotate_left(3);
    let rotated = reduce_results(&[x, y], &[10, 11], rotated_input);

    for outcome in [&forward, &reversed, &rotated] {
        assert!((outcome.policy_fitness[&x] - 2.75).abs() < 1e-12);
        assert!((outcome.policy_fitness[&y] - 2.0).abs() < 1e-12);
        assert!((outcome.value_fitness[&10] - 4.0).abs() < 1e-12);
    }
}

#[test]
fn aggregate_fitness_is_clamped_at_zero() {
    let outcome = reduce_results(&[1], &[10], vec![ok_result(1, 10, -3.5)]);
    assert_eq!(outcome.policy_fitness[&1], 0.0);
    assert_eq!(outcome.value_fitness[&10], 0.0);
}

#[test]
fn failed_tasks_contribute_zero_and_are_recorded() {
    let results = vec![
        ok_result(1, 10, 1.5),
        TaskResult {
            policy_id: 2,
            value_id: 10,
            outcome: Err(MatchError::SelectorStalled),
        },
    ];
    let outcome = reduce_results(&[1, 2], &[10], results);
    assert_eq!(outcome.policy_fitness[&2], 0.0);
    assert!((outcome.policy_fitness[&1] - 1.5).abs() < 1e-12);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].policy_id, 2);
}

#[test]
fn generation_runs_end_to_end_against_the_baseline() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1, 2], vec![10], 0);
    let outcome = run_generation(&cfg, &registry).unwrap();

    assert_eq!(outcome.tasks, 2);
    // 1 repeat = one swap pair per task.
    assert_eq!(outcome.games, 4);
    assert_eq!(outcome.wins + outcome.losses + outcome.draws, 4);
    assert!(outcome.failures.is_empty());
    assert!(outcome.policy_fitness.values().all(|f| *f >= 0.0));
    assert!(outcome.value_fitness.values().all(|f| *f >= 0.0));
    assert!(outcome.policy_fitness.contains_key(&1));
    assert!(outcome.policy_fitness.contains_key(&2));
}

#[test]
fn generation_against_the_pool_uses_pool_opponents() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1], vec![10], 2);
    let outcome = run_generation(&cfg, &registry).unwrap();
    assert_eq!(outcome.tasks, 2);
    assert_eq!(outcome.games, 4);
    assert!(outcome.failures.is_empty());
}

#[test]
fn a_malformed_candidate_fails_its_tasks_but_not_the_batch() {
    let cfg = quick_config();
    let mut registry = StubRegistry::new(vec![1, 2], vec![10], 0);
    registry.fail_policy = Some(2);
    let outcome = run_generation(&cfg, &registry).unwrap();

    assert_eq!(outcome.tasks, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].policy_id, 2);
    assert_eq!(outcome.policy_fitness[&2], 0.0);
    // The healthy candidate still played.
    assert_eq!(outcome.games, 2);
}

#[test]
fn zero_repeats_is_rejected() {
    let mut cfg = quick_config();
    cfg.harness.repeats = 0;
    let registry = StubRegistry::new(vec![1], vec![10], 0);
    assert!(run_generation(&cfg, &registry).is_err());
}

#[test]
fn same_config_same_registry_same_totals() {
    let cfg = quick_config();
    let registry = StubRegistry::new(vec![1, 2], vec![10], 0);
    let a = run_generation(&cfg, &registry).unwrap();
    let b = run_generation(&cfg, &registry).unwrap();
    assert_eq!(a.policy_fitness, b.policy_fitness);
    assert_eq!(a.value_fitness, b.value_fitness);
    assert_eq!((a.wins, a.losses, a.draws), (b.wins, b.losses, b.draws));
}
