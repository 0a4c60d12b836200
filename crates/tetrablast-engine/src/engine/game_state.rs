use crate::{
    PieceCollisionError,
    core::{
        grid::Grid,
        piece::{Direction, MAX_SHAPE_SIZE, Piece},
    },
};

use super::{
    chain::{ChainPass, ChainTrigger, run_chain},
    game_stats::{GameStats, ROW_CLEAR_SCORE},
    piece_source::{PieceSeed, PieceSource, UniformPieceSource},
};

/// Lifecycle phase of a [`GameState`].
///
/// Between calls a state is always `Falling` or `GameOver`; the other phases
/// are passed through while a lock is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    Spawning,
    Falling,
    Locking,
    Clearing,
    Exploding,
    GameOver,
}

/// What one [`GameState::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickReport {
    /// The piece moved down one row.
    Descended,
    /// The piece could not move and was locked.
    Locked(LockReport),
}

impl TickReport {
    #[must_use]
    pub fn lock(&self) -> Option<&LockReport> {
        match self {
            TickReport::Descended => None,
            TickReport::Locked(report) => Some(report),
        }
    }
}

/// Outcome of locking one piece: its row clear, its chain, and whether the
/// following spawn ended the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockReport {
    piece: Piece,
    cleared_rows: usize,
    passes: Vec<ChainPass>,
    game_over: bool,
}

impl LockReport {
    fn new(piece: Piece) -> Self {
        Self {
            piece,
            cleared_rows: 0,
            passes: vec![],
            game_over: false,
        }
    }

    /// The piece as it was merged into the grid.
    #[must_use]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub const fn cleared_rows(&self) -> usize {
        self.cleared_rows
    }

    #[must_use]
    pub fn passes(&self) -> &[ChainPass] {
        &self.passes
    }

    #[must_use]
    pub fn row_score(&self) -> usize {
        self.cleared_rows * ROW_CLEAR_SCORE
    }

    #[must_use]
    pub fn chain_score(&self) -> usize {
        self.passes.iter().map(ChainPass::score).sum()
    }

    #[must_use]
    pub fn score_gained(&self) -> usize {
        self.row_score() + self.chain_score()
    }

    /// Highest combo multiplier of the chain; 0 when nothing exploded.
    #[must_use]
    pub fn max_combo(&self) -> usize {
        self.passes.last().map_or(0, ChainPass::combo)
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }
}

/// One game: the grid, the falling piece, the score, and the piece source.
///
/// The state is owned by a single driver that serializes timer ticks and
/// player commands into calls on it.
///
/// - [`advance`](Self::advance) moves the piece down, or locks it and resolves
///   row clears, explosion chains, and the next spawn.
/// - [`try_move`](Self::try_move) and [`try_rotate`](Self::try_rotate) apply a
///   command only if the result is collision-free; a refused command leaves
///   the state unchanged.
/// - [`hard_drop`](Self::hard_drop) drops and locks immediately.
///
/// After a lock, full rows are cleared and then, as decided by the
/// [`ChainTrigger`], the explosion chain runs on the resulting grid.
///
/// # Example
///
/// ```
/// use tetrablast_engine::{Direction, GameState, PieceKind, SequencePieceSource};
///
/// let mut state = GameState::with_source(20, 10, SequencePieceSource::new([PieceKind::O]));
/// assert_eq!(state.active_piece().unwrap().kind(), PieceKind::O);
///
/// // Refused commands are reported and leave the state unchanged.
/// for _ in 0..10 {
///     _ = state.try_move(Direction::Left);
/// }
/// assert_eq!(state.active_piece().unwrap().position().x, 0);
///
/// let report = state.hard_drop()?;
/// assert_eq!(report.cleared_rows(), 0);
/// assert_eq!(state.grid().occupied_count(), 4);
/// assert!(!state.is_game_over());
/// # Ok::<(), tetrablast_engine::PieceCollisionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GameState<S = UniformPieceSource> {
    grid: Grid,
    piece: Piece,
    phase: Phase,
    stats: GameStats,
    chain_trigger: ChainTrigger,
    source: S,
}

impl GameState {
    /// Creates a game on an empty `rows × cols` grid with a random seed.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is smaller than the largest piece.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_source(rows, cols, UniformPieceSource::new())
    }

    /// Like [`Self::new`], but with a fixed seed for a reproducible piece
    /// sequence.
    #[must_use]
    pub fn with_seed(rows: usize, cols: usize, seed: PieceSeed) -> Self {
        Self::with_source(rows, cols, UniformPieceSource::with_seed(seed))
    }
}

impl<S> GameState<S>
where
    S: PieceSource,
{
    #[must_use]
    pub fn with_source(rows: usize, cols: usize, source: S) -> Self {
        Self::with_grid(Grid::new(rows, cols), source)
    }

    /// Starts a game on a pre-filled grid. The first piece spawns immediately;
    /// if it collides the game is over before it ever falls.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is smaller than the largest piece.
    #[must_use]
    pub fn with_grid(grid: Grid, mut source: S) -> Self {
        assert!(
            grid.rows() >= MAX_SHAPE_SIZE && grid.cols() >= MAX_SHAPE_SIZE,
            "grid {}x{} is smaller than the largest piece",
            grid.cols(),
            grid.rows(),
        );
        let (piece, phase) = spawn(&grid, &mut source);
        Self {
            grid,
            piece,
            phase,
            stats: GameStats::new(),
            chain_trigger: ChainTrigger::default(),
            source,
        }
    }

    #[must_use]
    pub fn with_chain_trigger(mut self, chain_trigger: ChainTrigger) -> Self {
        self.chain_trigger = chain_trigger;
        self
    }

    #[must_use]
    pub const fn chain_trigger(&self) -> ChainTrigger {
        self.chain_trigger
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }

    /// The falling piece, or `None` once the game is over.
    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.phase.is_falling().then_some(&self.piece)
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Where the falling piece would land on a hard drop.
    #[must_use]
    pub fn drop_preview(&self) -> Option<Piece> {
        let piece = self.active_piece()?;
        Some(self.landing_position(*piece))
    }

    fn landing_position(&self, mut piece: Piece) -> Piece {
        loop {
            let below = piece.shifted(Direction::Down);
            if self.grid.is_colliding(&below) {
                return piece;
            }
            piece = below;
        }
    }

    /// One time step: descend one row, or lock and resolve.
    ///
    /// # Panics
    ///
    /// Panics if the game is already over.
    pub fn advance(&mut self) -> TickReport {
        assert!(!self.is_game_over(), "advance called after game over");
        let below = self.piece.shifted(Direction::Down);
        if self.grid.is_colliding(&below) {
            return TickReport::Locked(self.lock_piece());
        }
        self.piece = below;
        TickReport::Descended
    }

    /// Translates the falling piece. `Down` never locks.
    ///
    /// `Err` only reports that the move was refused. The state is left as it
    /// was and the game goes on.
    pub fn try_move(&mut self, direction: Direction) -> Result<(), PieceCollisionError> {
        let piece = *self.active_piece().ok_or(PieceCollisionError)?;
        self.set_piece(piece.shifted(direction))
    }

    /// Rotates the falling piece to its next rotation state.
    ///
    /// A blocked rotation is refused the same way as a blocked move; there is
    /// no wall kick.
    pub fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        let piece = *self.active_piece().ok_or(PieceCollisionError)?;
        self.set_piece(piece.rotated())
    }

    /// Drops the falling piece to its landing row and locks it.
    pub fn hard_drop(&mut self) -> Result<LockReport, PieceCollisionError> {
        let piece = *self.active_piece().ok_or(PieceCollisionError)?;
        self.piece = self.landing_position(piece);
        Ok(self.lock_piece())
    }

    fn set_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.grid.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.piece = piece;
        Ok(())
    }

    /// Runs `Locking → Clearing → Exploding → Spawning` for the current piece.
    fn lock_piece(&mut self) -> LockReport {
        let mut report = LockReport::new(self.piece);
        self.phase = Phase::Locking;
        while !matches!(self.phase, Phase::Falling | Phase::GameOver) {
            self.phase = match self.phase {
                Phase::Locking => {
                    self.grid = self.grid.placed(&self.piece);
                    Phase::Clearing
                }
                Phase::Clearing => {
                    let (grid, cleared_rows) = self.grid.cleared_rows();
                    self.grid = grid;
                    report.cleared_rows = cleared_rows;
                    Phase::Exploding
                }
                Phase::Exploding => {
                    if self.chain_trigger.fires(report.cleared_rows) {
                        let (grid, passes) = run_chain(&self.grid).into_parts();
                        self.grid = grid;
                        report.passes = passes;
                    }
                    self.stats
                        .complete_piece_lock(report.cleared_rows, &report.passes);
                    Phase::Spawning
                }
                Phase::Spawning => {
                    let (piece, phase) = spawn(&self.grid, &mut self.source);
                    self.piece = piece;
                    phase
                }
                Phase::Falling | Phase::GameOver => unreachable!(),
            };
        }
        report.game_over = self.is_game_over();
        report
    }
}

fn spawn<S>(grid: &Grid, source: &mut S) -> (Piece, Phase)
where
    S: PieceSource,
{
    let piece = Piece::spawn(source.next_kind(), grid.cols());
    let phase = if grid.is_colliding(&piece) {
        Phase::GameOver
    } else {
        Phase::Falling
    };
    (piece, phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorTag, PieceKind, PiecePosition, SequencePieceSource};

    fn state_with(rows: &[&str], kinds: &[PieceKind]) -> GameState<SequencePieceSource> {
        GameState::with_grid(
            Grid::from_rows(rows).unwrap(),
            SequencePieceSource::new(kinds.iter().copied()),
        )
    }

    #[test]
    fn test_spawn_at_top_center() {
        let state = GameState::with_source(20, 10, SequencePieceSource::new([PieceKind::T]));
        let piece = state.active_piece().unwrap();
        assert_eq!(piece.kind(), PieceKind::T);
        assert_eq!(piece.rotation(), 0);
        assert_eq!(piece.position(), PiecePosition::new(3, 0));
        assert!(state.phase().is_falling());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_seeded_games_match() {
        let seed = PieceSeed::from_bytes([9; 16]);
        let mut a = GameState::with_seed(20, 10, seed);
        let mut b = GameState::with_seed(20, 10, seed);
        while !a.is_game_over() {
            assert_eq!(a.active_piece(), b.active_piece());
            a.hard_drop().unwrap();
            b.hard_drop().unwrap();
        }
        assert!(b.is_game_over());
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.source().seed(), seed);
    }

    #[test]
    fn test_advance_descends_then_locks() {
        let mut state = GameState::with_source(6, 4, SequencePieceSource::new([PieceKind::O]));
        // O spawns at x = 0 on a 4-wide grid and occupies rows 0..=1.
        for y in 1..=4 {
            assert_eq!(state.advance(), TickReport::Descended);
            assert_eq!(state.active_piece().unwrap().position().y, y);
        }
        let report = state.advance();
        let lock = report.lock().unwrap();
        assert_eq!(lock.piece().position(), PiecePosition::new(0, 4));
        assert_eq!(lock.cleared_rows(), 0);
        assert!(lock.passes().is_empty());
        assert!(!lock.is_game_over());
        assert_eq!(state.grid().to_string(), "....\n....\n....\n....\nyy..\nyy..");
        assert_eq!(state.stats().locked_pieces(), 1);
        assert_eq!(state.active_piece().unwrap().position(), PiecePosition::new(0, 0));
    }

    #[test]
    fn test_refused_commands_leave_state_unchanged() {
        let mut state = GameState::with_source(6, 4, SequencePieceSource::new([PieceKind::O]));
        let before = *state.active_piece().unwrap();
        assert_eq!(state.try_move(Direction::Left), Err(PieceCollisionError));
        assert_eq!(state.active_piece(), Some(&before));

        state.try_move(Direction::Right).unwrap();
        state.try_move(Direction::Right).unwrap();
        assert_eq!(state.try_move(Direction::Right), Err(PieceCollisionError));
        assert_eq!(state.active_piece().unwrap().position().x, 2);

        // A refusal is not a failure: the piece still falls and locks.
        assert!(state.advance().is_descended());
        assert!(state.hard_drop().is_ok());
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_soft_drop_never_locks() {
        let mut state = GameState::with_source(6, 4, SequencePieceSource::new([PieceKind::O]));
        while state.try_move(Direction::Down).is_ok() {}
        assert_eq!(state.active_piece().unwrap().position().y, 4);
        assert!(state.grid().is_empty());
        assert_eq!(state.stats().locked_pieces(), 0);
    }

    #[test]
    fn test_rotation_blocked_by_wall() {
        // Vertical I at the right wall cannot rotate back to horizontal.
        let mut state = GameState::with_source(8, 4, SequencePieceSource::new([PieceKind::I]));
        state.try_rotate().unwrap();
        state.try_move(Direction::Right).unwrap();
        let before = *state.active_piece().unwrap();
        assert_eq!(state.try_rotate(), Err(PieceCollisionError));
        assert_eq!(state.active_piece(), Some(&before));
    }

    #[test]
    fn test_drop_preview_matches_hard_drop() {
        let mut state = state_with(
            &["....", "....", "....", "....", "..r.", "r.r."],
            &[PieceKind::O],
        );
        let preview = state.drop_preview().unwrap();
        assert_eq!(preview.position(), PiecePosition::new(0, 3));
        let report = state.hard_drop().unwrap();
        assert_eq!(report.piece(), &preview);
    }

    #[test]
    fn test_hard_drop_clears_row() {
        let mut state = state_with(
            &["....", "....", "....", "....", "..gr", "..rg"],
            &[PieceKind::O],
        );
        let report = state.hard_drop().unwrap();
        assert_eq!(report.cleared_rows(), 2);
        assert_eq!(report.row_score(), 200);
        assert_eq!(state.score(), 200);
        assert!(state.grid().is_empty());
    }

    #[test]
    fn test_row_clear_triggers_chain() {
        // The O fills row 4; clearing it drops the red on row 3 onto the two
        // reds below, and the three reds explode.
        let mut state = state_with(
            &["....", "....", "....", "r...", "gb..", "rr.b"],
            &[PieceKind::O],
        );
        state.try_move(Direction::Right).unwrap();
        state.try_move(Direction::Right).unwrap();
        let report = state.hard_drop().unwrap();
        assert_eq!(report.piece().position(), PiecePosition::new(2, 3));
        assert_eq!(report.cleared_rows(), 1);
        assert_eq!(report.passes().len(), 1);
        assert_eq!(report.passes()[0].groups()[0].color(), ColorTag::Red);
        assert_eq!(report.chain_score(), 3 * 50);
        assert_eq!(report.max_combo(), 1);
        assert_eq!(report.score_gained(), 250);
        assert_eq!(state.score(), 250);
        assert_eq!(
            state.grid().to_string(),
            "....\n....\n....\n....\n...y\n..yb"
        );
        assert_eq!(state.stats().chains(), 1);
    }

    #[test]
    fn test_no_chain_without_row_clear() {
        let mut state = GameState::with_source(6, 4, SequencePieceSource::new([PieceKind::O]));
        let report = state.hard_drop().unwrap();
        assert!(report.passes().is_empty());
        assert_eq!(state.grid().occupied_count(), 4);
    }

    #[test]
    fn test_every_lock_trigger_explodes_single_piece() {
        let mut state = GameState::with_source(6, 4, SequencePieceSource::new([PieceKind::O]))
            .with_chain_trigger(ChainTrigger::EveryLock);
        assert_eq!(state.chain_trigger(), ChainTrigger::EveryLock);
        let report = state.hard_drop().unwrap();
        assert_eq!(report.cleared_rows(), 0);
        assert_eq!(report.chain_score(), 4 * 50);
        assert!(state.grid().is_empty());
    }

    #[test]
    fn test_cleared_row_without_match() {
        // Only one red survives the clear, so nothing connects.
        let mut state = state_with(
            &["....", "....", "....", "....", "..r.", "..rb"],
            &[PieceKind::O],
        );
        let report = state.hard_drop().unwrap();
        assert_eq!(report.cleared_rows(), 1);
        assert!(report.passes().is_empty());
        assert_eq!(state.grid().to_string(), "....\n....\n....\n....\n....\nyyr.");
    }

    #[test]
    fn test_game_over_at_spawn() {
        let mut rows = vec!["...."; 6];
        rows[0] = "yy..";
        let state = state_with(&rows, &[PieceKind::O]);
        assert!(state.is_game_over());
        assert!(state.phase().is_game_over());
        assert_eq!(state.active_piece(), None);
        assert_eq!(state.drop_preview(), None);
    }

    #[test]
    fn test_game_over_after_lock() {
        let mut state = GameState::with_source(4, 4, SequencePieceSource::new([PieceKind::O]));
        let first = state.hard_drop().unwrap();
        assert!(!first.is_game_over());
        let second = state.hard_drop().unwrap();
        assert!(second.is_game_over());
        assert!(state.is_game_over());
        assert_eq!(state.try_move(Direction::Left), Err(PieceCollisionError));
        assert_eq!(state.try_rotate(), Err(PieceCollisionError));
        assert_eq!(state.hard_drop(), Err(PieceCollisionError));
    }

    #[test]
    #[should_panic(expected = "advance called after game over")]
    fn test_advance_after_game_over_panics() {
        let mut rows = vec!["...."; 4];
        rows[1] = "yy..";
        let mut state = state_with(&rows, &[PieceKind::O]);
        state.advance();
    }

    #[test]
    #[should_panic(expected = "smaller than the largest piece")]
    fn test_tiny_grid_panics() {
        let _ = GameState::with_source(3, 10, SequencePieceSource::new([PieceKind::O]));
    }

    #[test]
    fn test_score_never_decreases() {
        let mut state = GameState::with_seed(20, 10, PieceSeed::from_bytes([1; 16]));
        let mut last = 0;
        while !state.is_game_over() {
            if let TickReport::Locked(report) = state.advance() {
                assert_eq!(state.score(), last + report.score_gained());
            }
            assert!(state.score() >= last);
            last = state.score();
        }
        assert!(state.stats().locked_pieces() > 0);
    }
}
