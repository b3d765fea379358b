//! Tick throughput across grid sizes and backends.
//!
//! Use with `--release` for meaningful results.

use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;
use torus_life::{Grid, LifeConfig, TickBackend};

fn seed_board(grid: &mut Grid, density: f64, seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let threshold = (u64::MAX as f64 * density) as u64;
    let (width, height) = grid.dimensions();
    for row in 0..height as i64 {
        for column in 0..width as i64 {
            if rng.next_u64() <= threshold {
                grid.set_alive(row, column);
            }
        }
    }
}

fn bench(
    size: i64,
    backend: TickBackend,
    density: f64,
    iterations: u64,
) -> anyhow::Result<(f64, u64)> {
    let mut grid = Grid::with_config(size, size, LifeConfig::default().backend(backend))?;
    seed_board(&mut grid, density, 0x5EED_1234_ABCD_EF01);

    let start = Instant::now();
    grid.tick_n(iterations);
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;
    Ok((total_ms, grid.population()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scales: &[(i64, u64)] = &[
        (128, 500), // below the auto parallel threshold
        (256, 300), // at the threshold
        (512, 200),
        (1024, 100),
        (2048, 30),
    ];

    println!(
        "{:<10} {:<9} {:>8} {:>12} {:>10} {:>10}",
        "Grid", "Backend", "Iters", "Total(ms)", "Avg(ms)", "Pop"
    );
    println!("{}", "-".repeat(64));

    for &(size, iters) in scales {
        for backend in [TickBackend::Serial, TickBackend::Parallel] {
            let (total_ms, pop) = bench(size, backend, 0.42, iters)?;
            println!(
                "{:<10} {:<9} {:>8} {:>12.1} {:>10.4} {:>10}",
                format!("{size}x{size}"),
                format!("{backend:?}"),
                iters,
                total_ms,
                total_ms / iters as f64,
                pop
            );
        }
    }
    Ok(())
}
