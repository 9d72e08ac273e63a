//! CLI module graph.

pub mod check;
pub mod command;
pub mod odds;
pub mod output;
pub mod run;

use crate::error::Result;
use command::{CheckCommand, Cli, Commands};

/// Dispatch a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Odds(args) => odds::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => check::config::execute(&args.config),
        Commands::Check(CheckCommand::Memory(args)) => check::memory::execute(&args.config),
    }
}
