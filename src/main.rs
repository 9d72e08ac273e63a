use clap::Parser;

use oddswatch::adapter::inbound::cli::command::Cli;
use oddswatch::adapter::inbound::cli::output::{self, OutputConfig};
use oddswatch::adapter::inbound::cli::dispatch;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = dispatch(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
