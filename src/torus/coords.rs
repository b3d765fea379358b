//! Toroidal coordinate helpers.
//!
//! Every coordinate entering the grid goes through [`Axis::normalize`],
//! which is a true (non-negative) modulo. Neighbor lookups use the
//! precomputed `prev`/`next` tables so the tick loop never divides.

use std::collections::TryReserveError;
use std::num::NonZeroUsize;

/// The 8 neighbor directions, as `(row, column)` offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    NW,
    North,
    NE,
    West,
    East,
    SW,
    South,
    SE,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::NW,   Direction::North, Direction::NE,
        Direction::West,                   Direction::East,
        Direction::SW,   Direction::South, Direction::SE,
    ];

    /// The `(row, column)` offset for this direction.
    #[inline]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Direction::NW    => (-1, -1),
            Direction::North => (-1, 0),
            Direction::NE    => (-1, 1),
            Direction::West  => (0, -1),
            Direction::East  => (0, 1),
            Direction::SW    => (1, -1),
            Direction::South => (1, 0),
            Direction::SE    => (1, 1),
        }
    }
}

/// One wrapping axis of the torus (rows or columns).
#[derive(Clone, Debug)]
pub struct Axis {
    len: usize,
    prev: Vec<usize>,
    next: Vec<usize>,
}

impl Axis {
    /// Build the wrap tables, reporting allocation failure instead of aborting.
    pub fn try_new(len: NonZeroUsize) -> Result<Self, TryReserveError> {
        let len = len.get();
        let mut prev = Vec::new();
        prev.try_reserve_exact(len)?;
        prev.extend((0..len).map(|i| if i == 0 { len - 1 } else { i - 1 }));
        let mut next = Vec::new();
        next.try_reserve_exact(len)?;
        next.extend((0..len).map(|i| if i + 1 == len { 0 } else { i + 1 }));
        Ok(Self { len, prev, next })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Wrap any integer into `[0, len)`.
    #[inline]
    pub fn normalize(&self, i: i64) -> usize {
        // `len` came from a positive i64, so the cast back is lossless.
        i.rem_euclid(self.len as i64) as usize
    }

    /// `[prev, self, next]` for an in-range index, matching offsets -1, 0, 1.
    #[inline(always)]
    pub fn window(&self, i: usize) -> [usize; 3] {
        [self.prev[i], i, self.next[i]]
    }
}
