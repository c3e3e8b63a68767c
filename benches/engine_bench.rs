//! Criterion micro-benchmarks for the engine hot paths.

use basalt::chess::*;
use basalt::engine::uci::perft;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_move_generation(c: &mut Criterion) {
    let startpos = Board::new(STARTPOS_FEN).unwrap();
    let kiwipete = Board::new(KIWIPETE).unwrap();

    c.bench_function("generate_moves_startpos", |b| {
        b.iter(|| black_box(generate_moves(&startpos).len()))
    });
    c.bench_function("generate_moves_kiwipete", |b| {
        b.iter(|| black_box(generate_moves(&kiwipete).len()))
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let board = Board::new(KIWIPETE).unwrap();

    c.bench_function("evaluate_kiwipete", |b| b.iter(|| black_box(board.evaluate())));
}

fn bench_perft(c: &mut Criterion) {
    let mut board = Board::new(STARTPOS_FEN).unwrap();

    c.bench_function("perft_3_startpos", |b| {
        b.iter(|| black_box(perft(&mut board, 3)))
    });
}

criterion_group!(benches, bench_move_generation, bench_evaluation, bench_perft);
criterion_main!(benches);
