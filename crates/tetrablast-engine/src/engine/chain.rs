use serde::{Deserialize, Serialize};

use crate::core::{
    explosion::{ExplosionGroup, apply_explosion, find_explosions},
    gravity::settle,
    grid::Grid,
};

/// Points per exploded cell, before the combo multiplier.
pub const EXPLOSION_CELL_SCORE: usize = 50;

/// When a piece lock runs the chain controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainTrigger {
    /// Only after a lock that cleared at least one row.
    #[default]
    RowClear,
    /// After every lock.
    EveryLock,
}

impl ChainTrigger {
    #[must_use]
    pub const fn fires(self, cleared_rows: usize) -> bool {
        match self {
            ChainTrigger::RowClear => cleared_rows > 0,
            ChainTrigger::EveryLock => true,
        }
    }
}

/// One explosion + gravity pass of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPass {
    combo: usize,
    groups: Vec<ExplosionGroup>,
}

impl ChainPass {
    /// Multiplier applied to this pass: 1 for the first pass of a chain.
    #[must_use]
    pub const fn combo(&self) -> usize {
        self.combo
    }

    #[must_use]
    pub fn groups(&self) -> &[ExplosionGroup] {
        &self.groups
    }

    #[must_use]
    pub fn exploded_cells(&self) -> usize {
        self.groups.iter().map(ExplosionGroup::len).sum()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.exploded_cells() * EXPLOSION_CELL_SCORE * self.combo
    }
}

/// Result of [`run_chain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    grid: Grid,
    passes: Vec<ChainPass>,
}

impl ChainOutcome {
    /// The grid after the last pass. No explodable group remains in it.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    #[must_use]
    pub fn into_parts(self) -> (Grid, Vec<ChainPass>) {
        (self.grid, self.passes)
    }

    #[must_use]
    pub fn passes(&self) -> &[ChainPass] {
        &self.passes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    #[must_use]
    pub fn total_score(&self) -> usize {
        self.passes.iter().map(ChainPass::score).sum()
    }

    #[must_use]
    pub fn exploded_cells(&self) -> usize {
        self.passes.iter().map(ChainPass::exploded_cells).sum()
    }

    /// Highest multiplier reached; 0 when nothing exploded.
    #[must_use]
    pub fn max_combo(&self) -> usize {
        self.passes.last().map_or(0, ChainPass::combo)
    }
}

/// Explodes, settles, and repeats until no group qualifies.
///
/// The combo multiplier starts at 1 and increases by one per pass. Each
/// pass scores `cells × 50 × combo`. Every pass removes at least
/// [`EXPLOSION_THRESHOLD`](crate::EXPLOSION_THRESHOLD) cells, so the loop
/// terminates.
///
/// # Example
///
/// ```
/// use tetrablast_engine::{Grid, run_chain};
///
/// let grid = Grid::from_rows(&["...", "...", "ccc"])?;
/// let outcome = run_chain(&grid);
/// assert_eq!(outcome.total_score(), 150);
/// assert!(outcome.grid().is_empty());
/// # Ok::<(), tetrablast_engine::ParseGridError>(())
/// ```
#[must_use]
pub fn run_chain(grid: &Grid) -> ChainOutcome {
    let mut current = grid.clone();
    let mut passes = vec![];
    let mut combo = 1;

    loop {
        let groups = find_explosions(&current);
        if groups.is_empty() {
            break;
        }
        current = settle(&apply_explosion(&current, &groups));
        passes.push(ChainPass { combo, groups });
        combo += 1;
    }

    ChainOutcome {
        grid: current,
        passes,
    }
}
