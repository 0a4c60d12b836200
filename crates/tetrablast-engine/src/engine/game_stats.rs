use serde::{Deserialize, Serialize};

use super::chain::ChainPass;

/// Points per cleared row.
pub const ROW_CLEAR_SCORE: usize = 100;

/// Game statistics tracking score, cleared rows, explosions, and chains.
///
/// - **Score**: row clears (100 each) plus chain passes (`cells × 50 × combo`)
/// - **Locked pieces**: pieces merged into the grid
/// - **Chains**: locks that triggered at least one explosion pass
///
/// # Example
///
/// ```
/// use tetrablast_engine::{GameStats, Grid, run_chain};
///
/// let outcome = run_chain(&Grid::from_rows(&["...", "rrr"])?);
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_lock(2, outcome.passes());
///
/// assert_eq!(stats.score(), 200 + 150);
/// assert_eq!(stats.total_cleared_rows(), 2);
/// assert_eq!(stats.exploded_cells(), 3);
/// assert_eq!(stats.chains(), 1);
/// # Ok::<(), tetrablast_engine::ParseGridError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    locked_pieces: usize,
    total_cleared_rows: usize,
    exploded_cells: usize,
    chains: usize,
    longest_chain: usize,
    max_combo: usize,
}

impl GameStats {
    /// Creates a new tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            locked_pieces: 0,
            total_cleared_rows: 0,
            exploded_cells: 0,
            chains: 0,
            longest_chain: 0,
            max_combo: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn total_cleared_rows(&self) -> usize {
        self.total_cleared_rows
    }

    #[must_use]
    pub const fn exploded_cells(&self) -> usize {
        self.exploded_cells
    }

    /// Number of locks whose chain exploded at least once.
    #[must_use]
    pub const fn chains(&self) -> usize {
        self.chains
    }

    /// Most passes in a single chain.
    #[must_use]
    pub const fn longest_chain(&self) -> usize {
        self.longest_chain
    }

    /// Highest combo multiplier applied to any pass.
    #[must_use]
    pub const fn max_combo(&self) -> usize {
        self.max_combo
    }

    /// Updates statistics after a piece lock, its row clear, and the passes of
    /// its chain.
    pub fn complete_piece_lock(&mut self, cleared_rows: usize, passes: &[ChainPass]) {
        self.locked_pieces += 1;
        self.total_cleared_rows += cleared_rows;
        self.score += cleared_rows * ROW_CLEAR_SCORE;
        for pass in passes {
            self.score += pass.score();
            self.exploded_cells += pass.exploded_cells();
            self.max_combo = self.max_combo.max(pass.combo());
        }
        if !passes.is_empty() {
            self.chains += 1;
        }
        self.longest_chain = self.longest_chain.max(passes.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid, run_chain};

    #[test]
    fn test_new_is_zero() {
        let stats = GameStats::new();
        assert_eq!(stats, GameStats::default());
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.locked_pieces(), 0);
    }

    #[test]
    fn test_lock_without_clear_or_chain() {
        let mut stats = GameStats::new();
        let quiet = run_chain(&Grid::new(4, 4));
        stats.complete_piece_lock(0, quiet.passes());
        assert_eq!(stats.locked_pieces(), 1);
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.chains(), 0);
        assert_eq!(stats.longest_chain(), 0);
    }

    #[test]
    fn test_records_longest_chain_and_combo() {
        let cascade = run_chain(&Grid::from_rows(&["c..", "r..", "r..", "r..", "cc."]).unwrap());
        let single = run_chain(&Grid::from_rows(&["...", "ggg"]).unwrap());

        let mut stats = GameStats::new();
        stats.complete_piece_lock(0, cascade.passes());
        stats.complete_piece_lock(1, single.passes());

        assert_eq!(stats.locked_pieces(), 2);
        assert_eq!(stats.score(), 450 + 100 + 150);
        assert_eq!(stats.chains(), 2);
        assert_eq!(stats.longest_chain(), 2);
        assert_eq!(stats.max_combo(), 2);
        assert_eq!(stats.exploded_cells(), 9);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(GameStats::new()).unwrap();
        assert_eq!(json["score"], 0);
        assert_eq!(json["locked_pieces"], 0);
        assert_eq!(json["longest_chain"], 0);
    }
}
