//! ck: CLI binary for the checkers self-play evaluation core.
//!
//! Subcommands:
//! - evaluate: run evaluation generations with built-in demo candidates
//! - search: run one search from the opening position

use std::env;
use std::process;

use ck_core::{Config, GameSession};
use ck_harness::{
    run_generation, CandidateId, CandidateRegistry, GenerationOutcome, MatchError,
};
use ck_logging::{now_ms, GenerationEventV1, NdjsonWriter, TaskFailureEventV1};
use ck_mcts::{BoxedSelector, GreedyAgent, Mcts, RandomAgent, SearchPolicy};

/// Demo stand-in for the external learning layer: candidate ids map onto the
/// built-in backends (bare random, bare greedy, or greedy driven through a
/// search), pool opponents are greedy.
struct BuiltinRegistry {
    population: u64,
    pool: usize,
    search: ck_core::SearchConfig,
}

impl CandidateRegistry for BuiltinRegistry {
    fn policy_ids(&self) -> Vec<CandidateId> {
        (0..self.population).collect()
    }

    fn value_ids(&self) -> Vec<CandidateId> {
        vec![0]
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
        let agent: BoxedSelector = match policy_id % 3 {
            0 => Box::new(RandomAgent::new(seed)),
            1 => Box::new(GreedyAgent::new(seed)),
            _ => {
                let inner: BoxedSelector = Box::new(GreedyAgent::new(seed ^ 1));
                Box::new(
                    SearchPolicy::new(self.search, seed, Some(inner), None).map_err(|e| {
                        MatchError::Candidate {
                            id: policy_id,
                            msg: e.to_string(),
                        }
                    })?,
                )
            }
        };
        Ok(agent)
    }

    fn build_pool_opponent(&self, _index: usize, seed: u64) -> Result<BoxedSelector, MatchError> {
        Ok(Box::new(GreedyAgent::new(seed)))
    }
}

fn cmd_evaluate(args: &[String]) {
    let mut config_path: Option<String> = None;
    let mut log_path: Option<String> = None;
    let mut population: u64 = 6;
    let mut generations: u32 = 1;
    let mut pool: usize = 0;
    let mut seed: Option<u64> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ck evaluate

USAGE:
    ck evaluate [--config PATH] [--pop N] [--generations N] [--pool N] [--seed S] [--log PATH]

OPTIONS:
    --config PATH      YAML config file (default: built-in defaults)
    --pop N            Demo population size (default: 6)
    --generations N    Generations to run (default: 1)
    --pool N           Size of the greedy opponent pool (default: 0 = baseline)
    --seed S           Base seed override
    --log PATH         Append NDJSON events to PATH
"#
                );
                return;
            }
            "--config" => {
                config_path = Some(take_value(args, &mut i, "--config"));
            }
            "--log" => {
                log_path = Some(take_value(args, &mut i, "--log"));
            }
            "--pop" => {
                population = parse_value(args, &mut i, "--pop");
            }
            "--generations" => {
                generations = parse_value(args, &mut i, "--generations");
            }
            "--pool" => {
                pool = parse_value(args, &mut i, "--pool");
            }
            "--seed" => {
                seed = Some(parse_value(args, &mut i, "--seed"));
            }
            other => {
                eprintln!("Unknown option for `ck evaluate`: {other}");
                eprintln!("Run `ck evaluate --help` for usage.");
                process::exit(1);
            }
        }
    }

    let mut cfg = match config_path {
        Some(p) => match Config::load(&p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load {p}: {e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(s) = seed {
        cfg.harness.seed = s;
    }

    let mut log = log_path.map(|p| match NdjsonWriter::open_append(&p) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Failed to open log {p}: {e}");
            process::exit(1);
        }
    });

    let registry = BuiltinRegistry {
        population,
        pool,
        search: cfg.search,
    };

    for generation in 1..=generations {
        let mut gen_cfg = cfg.clone();
        gen_cfg.harness.seed = cfg.harness.seed.wrapping_add(generation as u64);
        let outcome = match run_generation(&gen_cfg, &registry) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Generation {generation} failed: {e}");
                process::exit(1);
            }
        };
        print_outcome(generation, &outcome);
        if let Some(w) = log.as_mut() {
            if let Err(e) = write_events(w, generation, &outcome) {
                eprintln!("Failed to write log events: {e}");
                process::exit(1);
            }
        }
    }
}

fn print_outcome(generation: u32, outcome: &GenerationOutcome) {
    println!(
        "Generation {generation}: {} tasks, {} games (W/L/D {}/{}/{}), {} failed",
        outcome.tasks,
        outcome.games,
        outcome.wins,
        outcome.losses,
        outcome.draws,
        outcome.failures.len()
    );

    let mut rows: Vec<(u64, f64)> = outcome
        .policy_fitness
        .iter()
        .map(|(&id, &f)| (id, f))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    println!("  policy id    fitness");
    for (id, fitness) in rows {
        println!("  {id:>9}    {fitness:>8.2}");
    }
    for failure in &outcome.failures {
        eprintln!(
            "  task failure (policy {}, value {}): {}",
            failure.policy_id, failure.value_id, failure.error
        );
    }
}

fn write_events(
    w: &mut NdjsonWriter,
    generation: u32,
    outcome: &GenerationOutcome,
) -> Result<(), ck_logging::NdjsonError> {
    let best_policy = GenerationOutcome::best_of(&outcome.policy_fitness);
    let best_value = GenerationOutcome::best_of(&outcome.value_fitness);
    w.write_event(&GenerationEventV1 {
        event: "generation",
        ts_ms: now_ms(),
        generation,
        tasks: outcome.tasks as u64,
        games: outcome.games as u64,
        wins: outcome.wins as u64,
        losses: outcome.losses as u64,
        draws: outcome.draws as u64,
        failures: outcome.failures.len() as u64,
        best_policy_id: best_policy.map(|(id, _)| id),
        best_policy_fitness: best_policy.map(|(_, f)| f),
        best_value_id: best_value.map(|(id, _)| id),
        best_value_fitness: best_value.map(|(_, f)| f),
    })?;
    for failure in &outcome.failures {
        w.write_event(&TaskFailureEventV1 {
            event: "task_failure",
            ts_ms: now_ms(),
            generation,
            policy_id: failure.policy_id,
            value_id: failure.value_id,
            error: failure.error.clone(),
        })?;
    }
    w.flush()
}

fn cmd_search(args: &[String]) {
    let mut sims: Option<u32> = None;
    let mut seed: u64 = 0;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ck search

USAGE:
    ck search [--sims N] [--seed S]

OPTIONS:
    --sims N     Simulation budget (default: 200)
    --seed S     RNG seed (default: 0)
"#
                );
                return;
            }
            "--sims" => {
                sims = Some(parse_value(args, &mut i, "--sims"));
            }
            "--seed" => {
                seed = parse_value(args, &mut i, "--seed");
            }
            other => {
                eprintln!("Unknown option for `ck search`: {other}");
                eprintln!("Run `ck search --help` for usage.");
                process::exit(1);
            }
        }
    }

    let mut cfg = ck_core::SearchConfig::default();
    if let Some(n) = sims {
        cfg.simulations = n;
    }
    let session = GameSession::new();
    let mut mcts = match Mcts::new(cfg, seed) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Bad search config: {e}");
            process::exit(1);
        }
    };
    match mcts.select_move(&session, None, None) {
        Ok(Some(mv)) => {
            println!("{}", session.board());
            println!(
                "Chosen move after {} simulations: {mv}",
                cfg.simulations
            );
        }
        Ok(None) => println!("No move available from the opening position."),
        Err(e) => {
            eprintln!("Search failed: {e}");
            process::exit(1);
        }
    }
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> String {
    if *i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    let v = args[*i + 1].clone();
    *i += 2;
    v
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    let raw = take_value(args, i, flag);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {raw}");
        process::exit(1);
    })
}

fn print_usage() {
    println!(
        r#"ck — checkers self-play evaluation core

USAGE:
    ck <SUBCOMMAND> [OPTIONS]

SUBCOMMANDS:
    evaluate    Run evaluation generations with built-in demo candidates
    search      Run one search from the opening position

Run `ck <SUBCOMMAND> --help` for subcommand options.
"#
    );
}

fn main() {
    let argv: Vec<String> = env::args().collect();
    if argv.len() < 2 {
        print_usage();
        process::exit(1);
    }
    match argv[1].as_str() {
        "evaluate" => cmd_evaluate(&argv[2..]),
        "search" => cmd_search(&argv[2..]),
        "--help" | "-h" | "help" => print_usage(),
        other => {
            eprintln!("Unknown subcommand: {other}");
            print_usage();
            process::exit(1);
        }
    }
}
