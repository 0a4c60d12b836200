use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tetrablast_engine::{ChainTrigger, GameSession, GameStats, Grid, PieceSeed, SessionConfig};

use crate::{
    command::RulesArg,
    receipt::{ReceiptLog, ScoreReceipt},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    rules: RulesArg,
    /// Number of games to play
    #[clap(long, default_value_t = 10)]
    games: usize,
    /// Seed for the bot and the pieces as 32 hex digits; random if omitted
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Ticks after which an unfinished game is abandoned
    #[clap(long, default_value_t = 100_000)]
    max_ticks: usize,
    /// Output file path; stdout if omitted
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    seed: PieceSeed,
    rows: usize,
    cols: usize,
    chain_trigger: ChainTrigger,
    generated_at: DateTime<Utc>,
    games: Vec<GameReport>,
    aggregate: AggregateReport,
}

#[derive(Debug, Serialize)]
struct GameReport {
    game: usize,
    seed: PieceSeed,
    score: usize,
    ticks: usize,
    truncated: bool,
    stats: GameStats,
    final_grid: Grid,
    receipt: Option<ScoreReceipt>,
}

#[derive(Debug, Default, Serialize)]
struct AggregateReport {
    games: usize,
    best_score: usize,
    mean_score: f64,
    total_exploded_cells: usize,
    total_chains: usize,
    longest_chain: usize,
    max_combo: usize,
}

impl AggregateReport {
    #[expect(clippy::cast_precision_loss)]
    fn from_games(games: &[GameReport]) -> Self {
        let total_score: usize = games.iter().map(|game| game.score).sum();
        Self {
            games: games.len(),
            best_score: games.iter().map(|game| game.score).max().unwrap_or(0),
            mean_score: if games.is_empty() {
                0.0
            } else {
                total_score as f64 / games.len() as f64
            },
            total_exploded_cells: games.iter().map(|game| game.stats.exploded_cells()).sum(),
            total_chains: games.iter().map(|game| game.stats.chains()).sum(),
            longest_chain: games
                .iter()
                .map(|game| game.stats.longest_chain())
                .max()
                .unwrap_or(0),
            max_combo: games
                .iter()
                .map(|game| game.stats.max_combo())
                .max()
                .unwrap_or(0),
        }
    }
}

/// One random input per tick.
#[derive(Debug, Clone, Copy)]
enum BotInput {
    Idle,
    Left,
    Right,
    Rotate,
    SoftDrop,
    HardDrop,
}

impl BotInput {
    fn random(rng: &mut Pcg32) -> Self {
        match rng.random_range(0..16) {
            0..=3 => BotInput::Left,
            4..=7 => BotInput::Right,
            8..=9 => BotInput::Rotate,
            10..=11 => BotInput::SoftDrop,
            12 => BotInput::HardDrop,
            _ => BotInput::Idle,
        }
    }

    fn apply(self, session: &mut GameSession<ReceiptLog>) {
        match self {
            BotInput::Idle => {}
            BotInput::Left => _ = session.try_move_left(),
            BotInput::Right => _ = session.try_move_right(),
            BotInput::Rotate => _ = session.try_rotate(),
            BotInput::SoftDrop => _ = session.try_soft_drop(),
            BotInput::HardDrop => session.hard_drop_and_complete(),
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        rules,
        games,
        seed,
        max_ticks,
        output,
    } = arg;

    let seed = seed.unwrap_or_else(rand::random);
    let mut bot_rng = Pcg32::from_seed(*seed.as_bytes());
    let config = SessionConfig {
        rows: rules.rows(),
        cols: rules.cols(),
        chain_trigger: rules.chain_trigger(),
        ..SessionConfig::default()
    };
    let mut session = GameSession::new(config, bot_rng.random(), ReceiptLog::new());

    eprintln!("Simulating {games} games with seed {seed}...");
    let mut reports = Vec::with_capacity(*games);
    for game in 0..*games {
        if game > 0 {
            session.restart();
        }
        let report = play_game(&mut session, &mut bot_rng, game, *max_ticks);
        eprintln!(
            "Game {}/{}: score {} in {} ticks{}",
            game + 1,
            games,
            report.score,
            report.ticks,
            if report.truncated { " (truncated)" } else { "" }
        );
        reports.push(report);
    }

    let aggregate = AggregateReport::from_games(&reports);
    eprintln!(
        "Best score {}, mean {:.1}",
        aggregate.best_score, aggregate.mean_score
    );

    let report = SimulationReport {
        seed,
        rows: rules.rows(),
        cols: rules.cols(),
        chain_trigger: rules.chain_trigger(),
        generated_at: Utc::now(),
        games: reports,
        aggregate,
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}

fn play_game(
    session: &mut GameSession<ReceiptLog>,
    bot_rng: &mut Pcg32,
    game: usize,
    max_ticks: usize,
) -> GameReport {
    let game_seed = session.seed();
    let mut ticks = 0;
    while !session.session_state().is_game_over() && ticks < max_ticks {
        BotInput::random(bot_rng).apply(session);
        session.tick();
        ticks += 1;
    }
    let receipt = match session.take_submission() {
        Some(Ok(receipt)) => Some(receipt),
        Some(Err(err)) => match err {},
        None => None,
    };
    GameReport {
        game,
        seed: game_seed,
        score: session.stats().score(),
        ticks,
        truncated: receipt.is_none(),
        stats: session.stats().clone(),
        final_grid: session.state().grid().clone(),
        receipt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(seed: &PieceSeed) -> (GameSession<ReceiptLog>, Pcg32) {
        let mut bot_rng = Pcg32::from_seed(*seed.as_bytes());
        let config = SessionConfig {
            rows: 10,
            cols: 6,
            ..SessionConfig::default()
        };
        let session = GameSession::new(config, bot_rng.random(), ReceiptLog::new());
        (session, bot_rng)
    }

    #[test]
    fn test_game_runs_to_completion() {
        let seed = PieceSeed::from_bytes([3; 16]);
        let (mut session, mut bot_rng) = session(&seed);
        let report = play_game(&mut session, &mut bot_rng, 0, 1_000_000);
        assert!(!report.truncated);
        assert_eq!(report.receipt.as_ref().map(|r| r.score), Some(report.score));
        assert!(report.stats.locked_pieces() > 0);
    }

    #[test]
    fn test_tick_limit_truncates() {
        let seed = PieceSeed::from_bytes([3; 16]);
        let (mut session, mut bot_rng) = session(&seed);
        let report = play_game(&mut session, &mut bot_rng, 0, 1);
        assert!(report.truncated);
        assert_eq!(report.ticks, 1);
        assert!(report.receipt.is_none());
    }

    #[test]
    fn test_same_seed_same_games() {
        let seed = PieceSeed::from_bytes([9; 16]);
        let (mut a, mut rng_a) = session(&seed);
        let (mut b, mut rng_b) = session(&seed);
        let report_a = play_game(&mut a, &mut rng_a, 0, 1_000_000);
        let report_b = play_game(&mut b, &mut rng_b, 0, 1_000_000);
        assert_eq!(report_a.score, report_b.score);
        assert_eq!(report_a.ticks, report_b.ticks);
        assert_eq!(report_a.final_grid, report_b.final_grid);
    }

    #[test]
    fn test_aggregate() {
        let empty = AggregateReport::from_games(&[]);
        assert_eq!(empty.games, 0);
        assert!(empty.mean_score.abs() < f64::EPSILON);

        let grid = Grid::new(4, 4);
        let game = |score| GameReport {
            game: 0,
            seed: PieceSeed::from_bytes([0; 16]),
            score,
            ticks: 0,
            truncated: false,
            stats: GameStats::new(),
            final_grid: grid.clone(),
            receipt: None,
        };
        let aggregate = AggregateReport::from_games(&[game(100), game(300)]);
        assert_eq!(aggregate.best_score, 300);
        assert!((aggregate.mean_score - 200.0).abs() < f64::EPSILON);
    }
}
