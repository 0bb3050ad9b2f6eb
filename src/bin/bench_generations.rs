#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use sparse_life::{Board, Coord, EngineConfig, GenerationRuleEngine};
use std::time::Instant;

const LIVE_DENSITY: f64 = 0.35;

fn seed_board(size: i64, density: f64) -> Board {
    let mut board = Board::new();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    let threshold = (u64::MAX as f64 * density) as u64;
    let half = size / 2;

    for row in -half..size - half {
        for col in -half..size - half {
            if rng.next_u64() <= threshold {
                board.initialize(Coord::new(row, col));
            }
        }
    }
    board
}

fn bench(size: i64, iterations: u64, cache_capacity: usize) -> (f64, usize) {
    let mut board = seed_board(size, LIVE_DENSITY);
    let mut engine =
        GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(cache_capacity));

    let start = Instant::now();
    engine.step_n(&mut board, iterations);
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;
    (total_ms, board.size())
}

fn main() {
    let scales: &[(i64, u64)] = &[(32, 200), (64, 100), (128, 50), (256, 20)];
    let capacities: &[usize] = &[8, 32, 256];

    println!(
        "{:<10} {:>8} {:>8} {:>12} {:>10} {:>10}",
        "Grid", "Cache", "Iters", "Total(ms)", "Avg(ms)", "Pop"
    );
    println!("{}", "-".repeat(64));

    for &(size, iters) in scales {
        for &cap in capacities {
            let (total_ms, pop) = bench(size, iters, cap);
            let avg_ms = total_ms / iters as f64;
            println!(
                "{:<10} {:>8} {:>8} {:>12.1} {:>10.4} {:>10}",
                format!("{}x{}", size, size),
                cap,
                iters,
                total_ms,
                avg_ms,
                pop
            );
        }
    }
}
