use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ck_bench::midgame_board;
use ck_core::{Board, Side};

fn bench_legal_moves(c: &mut Criterion) {
    let mut g = c.benchmark_group("ck_core_legal");
    for &plies in &[0u32, 12u32, 24u32] {
        let board = if plies == 0 {
            Board::initial()
        } else {
            midgame_board(plies)
        };
        g.bench_with_input(BenchmarkId::new("legal_moves", plies), &board, |b, board| {
            b.iter(|| {
                black_box(black_box(board).legal_moves(Side::Red));
                black_box(black_box(board).legal_moves(Side::Black));
            })
        });
    }
    g.finish();
}

fn bench_state_key(c: &mut Criterion) {
    let board = midgame_board(16);
    c.bench_function("ck_core_state_key", |b| {
        b.iter(|| black_box(black_box(&board).state_key()))
    });
}

criterion_group!(benches, bench_legal_moves, bench_state_key);
criterion_main!(benches);
