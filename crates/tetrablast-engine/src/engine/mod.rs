//! Game rules on top of the core grid operators.
//!
//! - [`run_chain`] - Explosion/gravity cascade with an escalating combo
//! - [`GameState`] - Tick state machine: spawn, descent, lock, clear, chain
//! - [`GameSession`] - Frame clock, pause, restart and final-score submission
//! - [`GameStats`] - Score and chain statistics
//! - [`PieceSource`] - Injected piece selection ([`UniformPieceSource`], [`SequencePieceSource`])
//! - [`ScoreSink`] - Receiver of the final score
//!
//! # Example
//!
//! ```
//! use tetrablast_engine::{GameState, PieceSeed, TickReport};
//!
//! let mut state = GameState::with_seed(20, 10, PieceSeed::from_bytes([0; 16]));
//! while !state.is_game_over() {
//!     if let TickReport::Locked(report) = state.advance() {
//!         if report.max_combo() > 1 {
//!             println!("{}x combo!", report.max_combo());
//!         }
//!     }
//! }
//! println!("final score: {}", state.score());
//! ```

pub use self::{
    chain::*, game_session::*, game_state::*, game_stats::*, piece_source::*, score_sink::*,
};

mod chain;
mod game_session;
mod game_state;
mod game_stats;
mod piece_source;
mod score_sink;
