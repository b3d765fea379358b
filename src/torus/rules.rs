//! Rule table for B3/S23.

/// Largest neighbor count a cell can see (one per offset).
pub const MAX_NEIGHBORS: usize = 8;

const STATES: usize = 2 * (MAX_NEIGHBORS + 1);

/// Next-state lookup indexed by current state and live-neighbor count.
#[derive(Clone, Debug)]
pub struct RuleTable {
    table: [bool; STATES],
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTable {
    pub fn new() -> Self {
        let mut table = [false; STATES];
        for alive in [false, true] {
            for neighbors in 0..=MAX_NEIGHBORS as u8 {
                table[slot(alive, neighbors)] = next_state(alive, neighbors);
            }
        }
        Self { table }
    }

    /// `neighbors` must be at most [`MAX_NEIGHBORS`].
    #[inline(always)]
    pub fn lookup(&self, alive: bool, neighbors: u8) -> bool {
        debug_assert!(neighbors as usize <= MAX_NEIGHBORS);
        self.table[slot(alive, neighbors)]
    }
}

#[inline(always)]
fn slot(alive: bool, neighbors: u8) -> usize {
    (alive as usize) * (MAX_NEIGHBORS + 1) + neighbors as usize
}

/// Conway's transition: underpopulation below 2, survival on 2 or 3,
/// overpopulation above 3, birth on exactly 3.
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    match (alive, neighbors) {
        (true, 2) | (true, 3) => true,
        (false, 3) => true,
        _ => false,
    }
}
