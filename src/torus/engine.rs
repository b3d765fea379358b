use std::collections::TryReserveError;
use std::fmt;
use std::num::NonZeroUsize;

use rand::Rng;
use rayon::prelude::*;

use super::coords::{Axis, Direction};
use super::patterns::{self, Pattern};
use super::rules::RuleTable;
use crate::error::GridError;

/// Cell count at which the auto policy switches to the parallel backend.
pub const PARALLEL_MIN_CELLS: usize = 64 * 1024;

/// How a tick walks the grid.
///
/// Both backends read only the committed generation and produce
/// identical results; they differ only in how rows are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickBackend {
    Serial,
    Parallel,
}

/// Configuration for a [`Grid`] instance.
///
/// Use `LifeConfig::default()` for the auto policy, or pin individual
/// knobs via the builder methods.
#[derive(Clone, Debug, Default)]
pub struct LifeConfig {
    /// Threads for the parallel backend.
    /// `None` means `std::thread::available_parallelism`.
    pub thread_count: Option<usize>,
    /// Backend selection.
    /// `None` means parallel for grids of at least `PARALLEL_MIN_CELLS`
    /// cells when more than one thread is available, serial otherwise.
    pub backend: Option<TickBackend>,
}

impl LifeConfig {
    /// Set an explicit thread count for the parallel backend.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    /// Force a specific backend.
    pub fn backend(mut self, backend: TickBackend) -> Self {
        self.backend = Some(backend);
        self
    }
}

fn auto_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Resolve the thread count from a config, falling back to auto-detect.
fn resolve_thread_count(config: &LifeConfig) -> usize {
    config
        .thread_count
        .unwrap_or_else(auto_thread_count)
        .max(1)
}

/// Resolve the backend from a config, falling back to the size policy.
fn resolve_backend(config: &LifeConfig, cells: usize, threads: usize) -> TickBackend {
    if let Some(backend) = config.backend {
        return backend;
    }
    if cells >= PARALLEL_MIN_CELLS && threads > 1 {
        TickBackend::Parallel
    } else {
        TickBackend::Serial
    }
}

fn validate_dimensions(width: i64, height: i64) -> Result<(NonZeroUsize, NonZeroUsize), GridError> {
    let invalid = || GridError::InvalidDimension { width, height };
    let w = usize::try_from(width)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(invalid)?;
    let h = usize::try_from(height)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(invalid)?;
    match w.get().checked_mul(h.get()) {
        Some(cells) if cells <= isize::MAX as usize => Ok((w, h)),
        _ => Err(invalid()),
    }
}

/// An all-dead cell buffer, reporting allocation failure instead of aborting.
fn try_dead_cells(cells: usize) -> Result<Vec<bool>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(cells)?;
    buf.resize(cells, false);
    Ok(buf)
}

/// Split the double buffer into (committed, scratch).
#[inline(always)]
fn split_phase(bufs: &mut [Vec<bool>; 2], phase: usize) -> (&[bool], &mut [bool]) {
    let [a, b] = bufs;
    if phase == 0 {
        (a.as_slice(), b.as_mut_slice())
    } else {
        (b.as_slice(), a.as_mut_slice())
    }
}

/// Count live cells at the 8 offsets around a cell.
///
/// Offsets are counted one by one, so on grids narrower or shorter than
/// 3 a cell reached by several offsets (itself included) counts once per
/// offset.
#[inline(always)]
fn count_neighbors(current: &[bool], width: usize, rows: [usize; 3], columns: [usize; 3]) -> u8 {
    let mut count = 0u8;
    for dir in Direction::ALL {
        let (dr, dc) = dir.offset();
        let row = rows[(dr + 1) as usize];
        let column = columns[(dc + 1) as usize];
        count += current[row * width + column] as u8;
    }
    count
}

/// Write one row of the next generation into `next_row`.
/// Reads only `current`. Returns the live cells written.
#[inline]
fn advance_row(
    current: &[bool],
    next_row: &mut [bool],
    row: usize,
    rows: &Axis,
    columns: &Axis,
    rules: &RuleTable,
) -> u64 {
    let width = columns.len();
    let row_window = rows.window(row);
    let base = row * width;
    let mut live = 0u64;
    for (column, out) in next_row.iter_mut().enumerate() {
        let neighbors = count_neighbors(current, width, row_window, columns.window(column));
        let alive = rules.lookup(current[base + column], neighbors);
        *out = alive;
        live += alive as u64;
    }
    live
}

/// A fixed-size toroidal Game of Life grid.
///
/// Rows and columns wrap, so every coordinate is valid. The grid owns a
/// committed buffer and a scratch buffer of the same shape; a tick
/// writes the next generation into scratch and then flips the two, so
/// callers only ever observe whole generations.
pub struct Grid {
    rows: Axis,
    columns: Axis,
    /// Row-major cells. `cell_bufs[cell_phase]` is the committed generation.
    cell_bufs: [Vec<bool>; 2],
    cell_phase: usize,
    rules: RuleTable,
    generation: u64,
    /// Live cells in the committed generation, kept exact on every write.
    population: u64,
    backend: TickBackend,
    pool: Option<rayon::ThreadPool>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("generation", &self.generation)
            .field("population", &self.population)
            .field("backend", &self.backend)
            .finish()
    }
}

impl Grid {
    /// Create an all-dead `width x height` grid with the default config.
    pub fn new(width: i64, height: i64) -> Result<Self, GridError> {
        Self::with_config(width, height, LifeConfig::default())
    }

    /// Create an all-dead grid with explicit configuration.
    pub fn with_config(width: i64, height: i64, config: LifeConfig) -> Result<Self, GridError> {
        let (w, h) = validate_dimensions(width, height)?;
        let cells = w.get() * h.get();
        // Dimensions that cannot be backed by memory are unusable dimensions.
        let unallocatable = |_: TryReserveError| GridError::InvalidDimension { width, height };
        let cell_bufs = [
            try_dead_cells(cells).map_err(unallocatable)?,
            try_dead_cells(cells).map_err(unallocatable)?,
        ];
        let rows = Axis::try_new(h).map_err(unallocatable)?;
        let columns = Axis::try_new(w).map_err(unallocatable)?;

        let threads = resolve_thread_count(&config);
        let backend = resolve_backend(&config, cells, threads);
        let pool = match backend {
            TickBackend::Parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("torus-life-{i}"))
                    .build()?,
            ),
            TickBackend::Serial => None,
        };

        log::debug!("created {w}x{h} grid, backend {backend:?}, {threads} thread(s) available");

        Ok(Self {
            rows,
            columns,
            cell_bufs,
            cell_phase: 0,
            rules: RuleTable::new(),
            generation: 0,
            population: 0,
            backend,
            pool,
        })
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn backend(&self) -> TickBackend {
        self.backend
    }

    /// Generations advanced since creation or the last [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn is_empty(&self) -> bool {
        self.population == 0
    }

    /// Wrap a row into `[0, height)`.
    #[inline]
    pub fn normalize_row(&self, row: i64) -> usize {
        self.rows.normalize(row)
    }

    /// Wrap a column into `[0, width)`.
    #[inline]
    pub fn normalize_column(&self, column: i64) -> usize {
        self.columns.normalize(column)
    }

    #[inline(always)]
    fn index(&self, row: usize, column: usize) -> usize {
        row * self.width() + column
    }

    #[inline]
    fn set_index(&mut self, row: usize, column: usize, alive: bool) {
        let idx = self.index(row, column);
        let phase = self.cell_phase;
        let cell = &mut self.cell_bufs[phase][idx];
        match (*cell, alive) {
            (false, true) => self.population += 1,
            (true, false) => self.population -= 1,
            _ => {}
        }
        *cell = alive;
    }

    pub fn set_cell(&mut self, row: i64, column: i64, alive: bool) {
        let row = self.normalize_row(row);
        let column = self.normalize_column(column);
        self.set_index(row, column, alive);
    }

    /// Mark a cell alive. Idempotent.
    pub fn set_alive(&mut self, row: i64, column: i64) {
        self.set_cell(row, column, true);
    }

    /// Flip a cell between alive and dead.
    pub fn toggle(&mut self, row: i64, column: i64) {
        let row = self.normalize_row(row);
        let column = self.normalize_column(column);
        let alive = self.cell_bufs[self.cell_phase][self.index(row, column)];
        self.set_index(row, column, !alive);
    }

    #[inline]
    pub fn is_alive(&self, row: i64, column: i64) -> bool {
        let idx = self.index(self.normalize_row(row), self.normalize_column(column));
        self.cell_bufs[self.cell_phase][idx]
    }

    /// Live cells among the 8 wrapped offsets around `(row, column)`,
    /// counted exactly as a tick counts them.
    pub fn live_neighbors(&self, row: i64, column: i64) -> u8 {
        let row = self.normalize_row(row);
        let column = self.normalize_column(column);
        count_neighbors(
            &self.cell_bufs[self.cell_phase],
            self.width(),
            self.rows.window(row),
            self.columns.window(column),
        )
    }

    /// Stamp `pattern` with its offsets relative to `(row, column)`.
    pub fn seed_pattern(&mut self, pattern: &Pattern, row: i64, column: i64) {
        // Anchor first so adding an offset cannot overflow.
        let row = self.normalize_row(row) as i64;
        let column = self.normalize_column(column) as i64;
        for &(dr, dc) in pattern.cells {
            self.set_alive(row + dr, column + dc);
        }
    }

    pub fn seed_glider(&mut self, row: i64, column: i64) {
        self.seed_pattern(&patterns::GLIDER, row, column);
    }

    /// Set `count` uniformly drawn cells alive. Repeated draws of the same
    /// cell are allowed, so fewer than `count` cells may end up alive.
    pub fn seed_random<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) {
        let (width, height) = self.dimensions();
        for _ in 0..count {
            let row = rng.random_range(0..height);
            let column = rng.random_range(0..width);
            self.set_index(row, column, true);
        }
    }

    /// Kill every cell and reset the generation counter.
    pub fn clear(&mut self) {
        for buf in &mut self.cell_bufs {
            buf.fill(false);
        }
        self.population = 0;
        self.generation = 0;
    }

    /// Advance one generation.
    pub fn tick(&mut self) {
        let width = self.columns.len();
        let (current, next) = split_phase(&mut self.cell_bufs, self.cell_phase);
        next.fill(false);

        let rows = &self.rows;
        let columns = &self.columns;
        let rules = &self.rules;
        let population: u64 = match (&self.pool, self.backend) {
            (Some(pool), TickBackend::Parallel) => pool.install(|| {
                next.par_chunks_mut(width)
                    .enumerate()
                    .map(|(row, out)| advance_row(current, out, row, rows, columns, rules))
                    .sum::<u64>()
            }),
            _ => next
                .chunks_mut(width)
                .enumerate()
                .map(|(row, out)| advance_row(current, out, row, rows, columns, rules))
                .sum(),
        };

        self.cell_phase ^= 1;
        self.population = population;
        self.generation += 1;
        log::trace!(
            "generation {} committed, population {}",
            self.generation,
            self.population
        );
    }

    pub fn tick_n(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Visit live cells as `(row, column)` in row-major order.
    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        let width = self.width();
        let current = &self.cell_bufs[self.cell_phase];
        for (row, cells) in current.chunks(width).enumerate() {
            for (column, &alive) in cells.iter().enumerate() {
                if alive {
                    f(row, column);
                }
            }
        }
    }

    /// Live cells as `(row, column)` in row-major order.
    pub fn live_cells(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.population as usize);
        self.for_each_live(|row, column| out.push((row, column)));
        out
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::{
        Grid, GridError, LifeConfig, PARALLEL_MIN_CELLS, TickBackend, resolve_backend,
        resolve_thread_count,
    };

    fn grid(width: i64, height: i64) -> Grid {
        Grid::with_config(width, height, LifeConfig::default().backend(TickBackend::Serial))
            .expect("valid dimensions")
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        for (w, h) in [(0, 10), (10, -1), (-5, -5), (0, 0), (10, 0)] {
            match Grid::new(w, h) {
                Err(GridError::InvalidDimension { width, height }) => {
                    assert_eq!((width, height), (w, h));
                }
                other => panic!("expected InvalidDimension for {w}x{h}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        assert!(matches!(
            Grid::new(i64::MAX, i64::MAX),
            Err(GridError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn reports_unallocatable_dimensions() {
        // 2^62 cells passes the overflow check but cannot be backed by memory.
        match Grid::new(1 << 31, 1 << 31) {
            Err(GridError::InvalidDimension { width, height }) => {
                assert_eq!((width, height), (1 << 31, 1 << 31));
            }
            other => panic!("expected InvalidDimension, got {other:?}"),
        }
    }

    #[test]
    fn new_grid_is_dead() {
        let g = grid(7, 3);
        assert_eq!(g.dimensions(), (7, 3));
        assert_eq!(g.population(), 0);
        assert_eq!(g.generation(), 0);
        for row in 0..3 {
            for column in 0..7 {
                assert!(!g.is_alive(row, column));
            }
        }
    }

    #[test]
    fn normalization_matches_known_values() {
        let g = grid(500, 500);
        assert_eq!(g.normalize_row(101), 101);
        assert_eq!(g.normalize_column(101), 101);
        assert_eq!(g.normalize_row(-399), 101);
        assert_eq!(g.normalize_column(-399), 101);
        assert_eq!(g.normalize_row(-1), 499);
    }

    #[test]
    fn normalization_uses_the_right_axis() {
        let g = grid(10, 4);
        assert_eq!(g.normalize_row(5), 1);
        assert_eq!(g.normalize_column(5), 5);
        assert_eq!(g.normalize_row(-1), 3);
        assert_eq!(g.normalize_column(-1), 9);
    }

    #[test]
    fn accessors_wrap_coordinates() {
        let mut g = grid(8, 6);
        g.set_alive(-1, -1);
        assert!(g.is_alive(5, 7));
        assert!(g.is_alive(11, 15));
        assert!(g.is_alive(-7, -9));
        assert_eq!(g.population(), 1);
    }

    #[test]
    fn set_alive_is_idempotent() {
        let mut g = grid(5, 5);
        g.set_alive(2, 2);
        g.set_alive(2, 2);
        g.set_alive(7, -3);
        assert_eq!(g.population(), 1);
    }

    #[test]
    fn set_cell_and_toggle_track_population() {
        let mut g = grid(5, 5);
        g.set_cell(1, 1, true);
        g.toggle(2, 2);
        assert_eq!(g.population(), 2);
        g.toggle(2, 2);
        g.set_cell(1, 1, false);
        g.set_cell(1, 1, false);
        assert_eq!(g.population(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn corner_counts_wrapped_neighbors() {
        let n = 9i64;
        let wrapped = [
            (n - 1, n - 1),
            (n - 1, 0),
            (n - 1, 1),
            (0, n - 1),
            (0, 1),
            (1, n - 1),
            (1, 0),
            (1, 1),
        ];
        for &(row, column) in &wrapped {
            let mut g = grid(n, n);
            g.set_alive(row, column);
            assert_eq!(g.live_neighbors(0, 0), 1, "({row},{column}) not seen from (0,0)");
        }

        let mut g = grid(n, n);
        for &(row, column) in &wrapped {
            g.set_alive(row, column);
        }
        assert_eq!(g.live_neighbors(0, 0), 8);
        g.set_alive(0, 0);
        assert_eq!(g.live_neighbors(0, 0), 8);
    }

    #[test]
    fn single_cell_grid_counts_itself_per_offset() {
        let mut g = grid(1, 1);
        assert_eq!(g.live_neighbors(0, 0), 0);
        g.tick();
        assert!(!g.is_alive(0, 0));

        g.set_alive(0, 0);
        assert_eq!(g.live_neighbors(0, 0), 8);
        g.tick();
        assert!(!g.is_alive(0, 0));
        assert!(g.is_empty());
    }

    #[test]
    fn two_wide_grid_counts_once_per_offset() {
        let mut g = grid(2, 2);
        g.set_alive(0, 1);
        // (0,1) is reached by offsets (0,-1) and (0,1).
        assert_eq!(g.live_neighbors(0, 0), 2);
        // (1,1) sees (0,1) via (-1,0) and (1,0).
        assert_eq!(g.live_neighbors(1, 1), 2);
    }

    #[test]
    fn tick_reads_only_the_previous_generation() {
        // A scan-order update would let (0,1) see the already-dead (0,0)
        // and kill it; the snapshot rule keeps it alive.
        let mut g = grid(25, 25);
        for column in 0..3 {
            g.set_alive(0, column);
        }
        g.tick();
        assert!(g.is_alive(0, 1));
        assert!(g.is_alive(-1, 1));
        assert!(g.is_alive(1, 1));
        assert!(!g.is_alive(0, 0));
        assert!(!g.is_alive(0, 2));
        assert_eq!(g.population(), 3);
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn clear_resets_cells_and_generation() {
        let mut g = grid(6, 6);
        g.seed_glider(2, 2);
        g.tick_n(3);
        g.clear();
        assert!(g.is_empty());
        assert_eq!(g.generation(), 0);
        assert!(g.live_cells().is_empty());
        g.tick();
        assert!(g.is_empty());
    }

    #[test]
    fn glider_seeds_across_the_corner() {
        let mut g = grid(10, 10);
        g.seed_glider(0, 0);
        let mut cells = g.live_cells();
        cells.sort_unstable();
        assert_eq!(cells, vec![(0, 1), (1, 0), (1, 1), (1, 9), (9, 0)]);
    }

    #[test]
    fn seed_pattern_handles_extreme_anchors() {
        let mut g = grid(10, 10);
        g.seed_glider(i64::MAX, i64::MIN);
        assert_eq!(g.population(), 5);
    }

    #[test]
    fn seed_random_stays_in_bounds_and_is_reproducible() {
        let mut a = grid(40, 30);
        let mut b = grid(40, 30);
        a.seed_random(&mut rand::rngs::StdRng::seed_from_u64(7), 500);
        b.seed_random(&mut rand::rngs::StdRng::seed_from_u64(7), 500);
        assert_eq!(a.live_cells(), b.live_cells());
        assert!(a.population() > 0 && a.population() <= 500);
        assert_eq!(a.population() as usize, a.live_cells().len());
        for (row, column) in a.live_cells() {
            assert!(row < 30 && column < 40);
        }
    }

    #[test]
    fn population_matches_scan_after_ticks() {
        let mut g = grid(32, 24);
        g.seed_random(&mut rand::rngs::StdRng::seed_from_u64(0xC0FFEE), 300);
        for _ in 0..20 {
            g.tick();
            assert_eq!(g.population() as usize, g.live_cells().len());
        }
    }

    #[test]
    fn auto_backend_follows_grid_size() {
        let config = LifeConfig::default();
        assert_eq!(resolve_backend(&config, PARALLEL_MIN_CELLS - 1, 8), TickBackend::Serial);
        assert_eq!(resolve_backend(&config, PARALLEL_MIN_CELLS, 8), TickBackend::Parallel);
        assert_eq!(resolve_backend(&config, PARALLEL_MIN_CELLS, 1), TickBackend::Serial);

        let forced = LifeConfig::default().backend(TickBackend::Parallel);
        assert_eq!(resolve_backend(&forced, 1, 1), TickBackend::Parallel);
    }

    #[test]
    fn thread_count_is_at_least_one() {
        assert_eq!(resolve_thread_count(&LifeConfig::default().thread_count(0)), 1);
        assert_eq!(resolve_thread_count(&LifeConfig::default().thread_count(3)), 3);
        assert!(resolve_thread_count(&LifeConfig::default()) >= 1);
    }

    #[test]
    fn small_default_grid_ticks_serially() {
        let g = Grid::new(16, 16).expect("valid dimensions");
        assert_eq!(g.backend(), TickBackend::Serial);
    }

    #[test]
    fn parallel_backend_builds_its_pool() {
        let config = LifeConfig::default()
            .backend(TickBackend::Parallel)
            .thread_count(2);
        let mut g = Grid::with_config(12, 12, config).expect("valid dimensions");
        assert_eq!(g.backend(), TickBackend::Parallel);
        g.seed_glider(5, 5);
        g.tick_n(4);
        assert_eq!(g.population(), 5);
    }
}
