//! Named seed patterns.
//!
//! Cells are `(row, column)` offsets from an anchor; stamping goes
//! through the grid's normal setter, so patterns wrap across edges.

#[derive(Debug)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i64, i64)],
}

impl Pattern {
    /// Number of live cells the pattern places.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(-1, 0), (0, 1), (1, -1), (1, 0), (1, 1)],
};

pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    cells: &[(0, -1), (0, 0), (0, 1)],
};

pub const BLOCK: Pattern = Pattern {
    name: "Block",
    cells: &[(0, 0), (0, 1), (1, 0), (1, 1)],
};

pub const TOAD: Pattern = Pattern {
    name: "Toad",
    cells: &[(0, 0), (0, 1), (0, 2), (1, -1), (1, 0), (1, 1)],
};

pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "R-pentomino",
    cells: &[(-1, 0), (-1, 1), (0, -1), (0, 0), (1, 0)],
};

pub const PATTERNS: &[&Pattern] = &[&GLIDER, &BLINKER, &BLOCK, &TOAD, &BEACON, &R_PENTOMINO];

/// Look up a pattern by name, ignoring ASCII case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS
        .iter()
        .copied()
        .find(|pattern| pattern.name.eq_ignore_ascii_case(name))
}
