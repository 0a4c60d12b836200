use std::time::Duration;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    PieceCollisionError,
    core::piece::{Direction, Piece},
};

use super::{
    GameStats,
    chain::ChainTrigger,
    game_state::{GameState, LockReport, TickReport},
    piece_source::PieceSeed,
    score_sink::ScoreSink,
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// Parameters shared by every game of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    /// Frames per second of [`GameSession::increment_frame`] calls.
    pub fps: u64,
    /// Time between automatic descents.
    pub drop_interval: Duration,
    pub chain_trigger: ChainTrigger,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 10,
            fps: 60,
            drop_interval: Duration::from_millis(700),
            chain_trigger: ChainTrigger::default(),
        }
    }
}

impl SessionConfig {
    fn drop_frames(&self) -> u64 {
        let millis = u64::try_from(self.drop_interval.as_millis()).unwrap_or(u64::MAX);
        (millis.saturating_mul(self.fps) / 1000).max(1)
    }
}

/// A sequence of games driven by a frame clock.
///
/// Wraps a [`GameState`] with pause, restart, a best score kept across
/// restarts, and the final-score submission to a [`ScoreSink`].
///
/// Every restart draws a fresh [`PieceSeed`] from a generator seeded by the
/// session seed, so a whole session replays from one seed.
#[derive(Debug)]
pub struct GameSession<K>
where
    K: ScoreSink,
{
    config: SessionConfig,
    state: GameState,
    session_state: SessionState,
    seed_rng: Pcg32,
    total_frames: u64,
    drop_frames: u64,
    best_score: usize,
    last_lock: Option<LockReport>,
    sink: K,
    submission: Option<Result<K::Receipt, K::Error>>,
}

impl<K> GameSession<K>
where
    K: ScoreSink,
{
    /// # Panics
    ///
    /// Panics if `config.fps` is zero or the grid is smaller than the largest
    /// piece.
    #[must_use]
    pub fn new(config: SessionConfig, seed: PieceSeed, sink: K) -> Self {
        assert!(config.fps > 0, "fps must be positive");
        let mut seed_rng = Pcg32::from_seed(*seed.as_bytes());
        let state = new_game(&config, seed_rng.random());
        let drop_frames = config.drop_frames();
        let mut this = Self {
            config,
            state,
            session_state: SessionState::Playing,
            seed_rng,
            total_frames: 0,
            drop_frames,
            best_score: 0,
            last_lock: None,
            sink,
            submission: None,
        };
        if this.state.is_game_over() {
            this.finish();
        }
        this
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        self.state.stats()
    }

    #[must_use]
    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    /// Seed of the current game's piece sequence.
    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.state.source().seed()
    }

    /// Highest score of any game in this session, including the current one.
    #[must_use]
    pub fn best_score(&self) -> usize {
        self.best_score.max(self.state.score())
    }

    #[must_use]
    pub fn falling_piece(&self) -> Option<&Piece> {
        self.state.active_piece()
    }

    #[must_use]
    pub fn drop_preview(&self) -> Option<Piece> {
        self.state.drop_preview()
    }

    /// The most recent lock of the current game.
    #[must_use]
    pub fn last_lock(&self) -> Option<&LockReport> {
        self.last_lock.as_ref()
    }

    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Takes the result of the final-score submission, once it has happened.
    pub fn take_submission(&mut self) -> Option<Result<K::Receipt, K::Error>> {
        self.submission.take()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        const NANOS_PER_SEC: u64 = 1_000_000_000;
        let fps = self.config.fps;
        let secs = self.total_frames / fps;
        let nanos = (self.total_frames % fps) * NANOS_PER_SEC / fps;
        Duration::new(secs, u32::try_from(nanos).unwrap_or(0))
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    /// Abandons the current game and starts a new one with the next seed.
    pub fn restart(&mut self) {
        self.best_score = self.best_score();
        self.state = new_game(&self.config, self.seed_rng.random());
        self.session_state = SessionState::Playing;
        self.total_frames = 0;
        self.drop_frames = self.config.drop_frames();
        self.last_lock = None;
        if self.state.is_game_over() {
            self.finish();
        }
    }

    /// Advances the frame clock; every drop interval the game advances once.
    pub fn increment_frame(&mut self) {
        if !self.session_state.is_playing() {
            return;
        }
        self.total_frames += 1;
        self.drop_frames = self.drop_frames.saturating_sub(1);
        if self.drop_frames == 0 {
            self.drop_frames = self.config.drop_frames();
            self.tick();
        }
    }

    /// Advances the game by one step regardless of the frame clock.
    pub fn tick(&mut self) {
        if !self.session_state.is_playing() {
            return;
        }
        if let TickReport::Locked(report) = self.state.advance() {
            self.record_lock(report);
        }
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move(Direction::Left)
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move(Direction::Right)
    }

    pub fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move(Direction::Down)
    }

    fn try_move(&mut self, direction: Direction) -> Result<(), PieceCollisionError> {
        if !self.session_state.is_playing() {
            return Err(PieceCollisionError);
        }
        self.state.try_move(direction)
    }

    pub fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        if !self.session_state.is_playing() {
            return Err(PieceCollisionError);
        }
        self.state.try_rotate()
    }

    pub fn hard_drop_and_complete(&mut self) {
        if !self.session_state.is_playing() {
            return;
        }
        if let Ok(report) = self.state.hard_drop() {
            self.record_lock(report);
        }
    }

    fn record_lock(&mut self, report: LockReport) {
        let game_over = report.is_game_over();
        self.last_lock = Some(report);
        if game_over {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.session_state = SessionState::GameOver;
        self.best_score = self.best_score();
        self.submission = Some(self.sink.submit(self.state.score()));
    }
}

fn new_game(config: &SessionConfig, seed: PieceSeed) -> GameState {
    GameState::with_seed(config.rows, config.cols, seed).with_chain_trigger(config.chain_trigger)
}
