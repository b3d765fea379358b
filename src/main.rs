#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use torus_life::{Grid, LifeConfig, TickBackend, patterns};

/// Headless toroidal Game of Life runner.
#[derive(Parser, Debug)]
#[command(name = "torus-life", version, about)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 200)]
    width: i64,

    /// Grid height in cells
    #[arg(long, default_value_t = 110)]
    height: i64,

    /// Random cells to seed before the first generation
    #[arg(long, default_value_t = 6000)]
    cells: usize,

    /// Extra named patterns to stamp, as NAME@ROW,COLUMN (e.g. glider@5,5)
    #[arg(long = "pattern", value_name = "NAME@ROW,COLUMN")]
    patterns: Vec<String>,

    /// Generations to run
    #[arg(short, long, default_value_t = 1000)]
    generations: u64,

    /// Log population every N generations (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// RNG seed for the initial population (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Tick backend (auto if omitted)
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Threads for the parallel backend
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Serial,
    Parallel,
}

impl From<BackendArg> for TickBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Serial => TickBackend::Serial,
            BackendArg::Parallel => TickBackend::Parallel,
        }
    }
}

fn parse_placement(placement: &str) -> anyhow::Result<(&'static patterns::Pattern, i64, i64)> {
    let (name, at) = placement
        .split_once('@')
        .with_context(|| format!("pattern {placement:?} must look like NAME@ROW,COLUMN"))?;
    let Some(pattern) = patterns::find(name) else {
        let known: Vec<_> = patterns::PATTERNS.iter().map(|p| p.name).collect();
        bail!("unknown pattern {name:?} (known: {})", known.join(", "));
    };
    let (row, column) = at
        .split_once(',')
        .with_context(|| format!("pattern {placement:?} is missing ROW,COLUMN"))?;
    let row = row.trim().parse().with_context(|| format!("bad row in {placement:?}"))?;
    let column = column
        .trim()
        .parse()
        .with_context(|| format!("bad column in {placement:?}"))?;
    Ok((pattern, row, column))
}

fn build_config(args: &Args) -> LifeConfig {
    let mut config = LifeConfig::default();
    if let Some(backend) = args.backend {
        config = config.backend(backend.into());
    }
    if let Some(n) = args.threads {
        config = config.thread_count(n);
    }
    config
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let placements = args
        .patterns
        .iter()
        .map(|placement| parse_placement(placement))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut grid = Grid::with_config(args.width, args.height, build_config(&args))
        .context("failed to create grid")?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    grid.seed_random(&mut rng, args.cells);
    for (pattern, row, column) in placements {
        grid.seed_pattern(pattern, row, column);
    }

    let (width, height) = grid.dimensions();
    log::info!(
        "{width}x{height} grid, backend {:?}, seed {seed:#x}, initial population {}",
        grid.backend(),
        grid.population()
    );

    let start = Instant::now();
    for _ in 0..args.generations {
        grid.tick();
        if args.report_every > 0 && grid.generation() % args.report_every == 0 {
            log::info!(
                "generation {}: population {}",
                grid.generation(),
                grid.population()
            );
        }
        if grid.is_empty() {
            log::warn!("population died out at generation {}", grid.generation());
            break;
        }
    }
    let elapsed = start.elapsed();

    let ticks = grid.generation().max(1);
    log::info!(
        "ran {} generations in {:.3} ms ({:.4} ms/gen), final population {}",
        grid.generation(),
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / ticks as f64,
        grid.population()
    );
    Ok(())
}
