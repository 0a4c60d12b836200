use std::time::Duration;

use tetrablast_engine::{GameSession, PieceSeed, SessionConfig};

use crate::{
    command::{RulesArg, play::app::PlayApp},
    receipt::ReceiptLog,
    tui,
    util::Output,
};

mod app;

const FPS: u32 = 60;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    rules: RulesArg,
    /// Session seed as 32 hex digits; random if omitted
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Milliseconds between automatic descents
    #[clap(long, default_value_t = 700)]
    tick_ms: u64,
    /// Hide the landing preview of the falling piece
    #[clap(long)]
    no_ghost: bool,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            rules: RulesArg::default(),
            seed: None,
            tick_ms: 700,
            no_ghost: false,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        rules,
        seed,
        tick_ms,
        no_ghost,
    } = arg;

    let seed = seed.unwrap_or_else(rand::random);
    let config = SessionConfig {
        rows: rules.rows(),
        cols: rules.cols(),
        fps: u64::from(FPS),
        drop_interval: Duration::from_millis(*tick_ms),
        chain_trigger: rules.chain_trigger(),
    };
    let session = GameSession::new(config, seed, ReceiptLog::new());
    let mut app = PlayApp::new(session, !*no_ghost);

    tui::run(&mut app)?;

    let session = app.into_session();
    eprintln!("Session seed: {seed}");
    eprintln!("Best score: {}", session.best_score());

    let receipts = session.into_sink().into_receipts();
    if !receipts.is_empty() {
        let mut output = Output::stdout();
        for receipt in &receipts {
            output.write_json_line(receipt)?;
        }
    }
    Ok(())
}
