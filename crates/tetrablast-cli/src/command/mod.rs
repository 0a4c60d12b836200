use clap::{Parser, Subcommand};
use tetrablast_engine::ChainTrigger;

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run headless games with a random-input bot and report the results as JSON
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Grid and rule options shared by every mode.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RulesArg {
    /// Number of rows of the grid
    #[clap(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(4..=64))]
    rows: u16,
    /// Number of columns of the grid
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(4..=64))]
    cols: u16,
    /// Run the explosion chain after every lock, not only after a row clear
    #[clap(long)]
    chain_on_every_lock: bool,
}

impl Default for RulesArg {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 10,
            chain_on_every_lock: false,
        }
    }
}

impl RulesArg {
    fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    fn cols(&self) -> usize {
        usize::from(self.cols)
    }

    fn chain_trigger(&self) -> ChainTrigger {
        if self.chain_on_every_lock {
            ChainTrigger::EveryLock
        } else {
            ChainTrigger::RowClear
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
