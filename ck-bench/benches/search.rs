use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ck_core::{GameSession, SearchConfig};
use ck_mcts::Mcts;

fn bench_opening_search(c: &mut Criterion) {
    let cfg = SearchConfig {
        c_explore: 1.4,
        simulations: 32,
        rollout_cap: 60,
    };
    let session = GameSession::new();
    c.bench_function("ck_mcts_opening_search_32", |b| {
        b.iter(|| {
            let mut mcts = Mcts::new(cfg, 7).expect("valid config");
            black_box(mcts.select_move(black_box(&session), None, None).expect("search"))
        })
    });
}

criterion_group!(benches, bench_opening_search);
criterion_main!(benches);
