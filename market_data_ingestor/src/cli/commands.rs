use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (ingestor.toml); built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the CSV files are written to (overrides the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch intraday bars, resample them and write one CSV per timeframe
    Bars {
        /// Comma-separated list of symbols (e.g. "AAPL,MSFT"); overrides the config file
        #[arg(long)]
        symbols: Option<String>,

        /// Ask the language model for a short summary of each symbol
        #[arg(long)]
        summarize: bool,
    },

    /// Fetch crypto spot prices into CRYPTO_PRICES.csv
    Crypto,

    /// Run `bars` and then `crypto`
    All {
        #[arg(long)]
        summarize: bool,
    },
}

impl Commands {
    pub fn summarize(&self) -> bool {
        match self {
            Commands::Bars { summarize, .. } | Commands::All { summarize } => *summarize,
            Commands::Crypto => false,
        }
    }

    pub fn runs_bars(&self) -> bool {
        !matches!(self, Commands::Crypto)
    }

    pub fn runs_crypto(&self) -> bool {
        !matches!(self, Commands::Bars { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bars_with_overrides() {
        let cli = Cli::try_parse_from([
            "market-data-ingestor",
            "--output-dir",
            "/tmp/out",
            "bars",
            "--symbols",
            "AAPL, msft",
            "--summarize",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(cli.config.is_none());
        assert!(cli.command.summarize());
        assert!(cli.command.runs_bars());
        assert!(!cli.command.runs_crypto());
    }

    #[test]
    fn all_runs_both_stages() {
        let cli = Cli::try_parse_from(["market-data-ingestor", "all"]).unwrap();
        assert!(cli.command.runs_bars());
        assert!(cli.command.runs_crypto());
        assert!(!cli.command.summarize());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["market-data-ingestor"]).is_err());
    }
}
