//! Command-line interface definitions.
//!
//! The default command runs the long-lived service. The remaining
//! subcommands are one-shot helpers for operators.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Live football odds change monitor
#[derive(Parser, Debug)]
#[command(name = "oddswatch")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor service in the foreground
    Run(ConfigPathArg),

    /// Fetch the current odds once and print them
    Odds(OddsArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `oddswatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file and environment overrides.
    Config(ConfigPathArg),
    /// Sample process memory against the configured limits.
    Memory(ConfigPathArg),
}

/// Shared argument struct for commands that only need a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct OddsArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Show at most this many matches.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_defaults() {
        let cli = Cli::try_parse_from(["oddswatch", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["oddswatch", "odds", "--json", "-vv", "--limit", "5"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        let Commands::Odds(args) = cli.command else {
            panic!("expected odds");
        };
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn parse_check_subcommands() {
        let cli = Cli::try_parse_from(["oddswatch", "check", "config", "-c", "prod.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check(CheckCommand::Config(ref a)) if a.config == PathBuf::from("prod.toml")
        ));

        let cli = Cli::try_parse_from(["oddswatch", "check", "memory"]).unwrap();
        assert!(matches!(cli.command, Commands::Check(CheckCommand::Memory(_))));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["oddswatch"]).is_err());
    }
}
