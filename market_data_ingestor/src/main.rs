use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use market_data_ingestor::{
    cli::{
        commands::{Cli, Commands},
        params::apply_overrides,
    },
    config::{IngestConfig, load_config_path},
    io::csv_sink::CsvSink,
    providers::{build_http_client, coingecko::CoinGeckoProvider, polygon::PolygonProvider},
    runner::{CryptoOutcome, Ingestor, SymbolOutcome, run_crypto},
    summarize::openai::OpenAiSummarizer,
};
use shared_utils::logging::init_tracing;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    init_tracing("info");

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IngestConfig::default(),
    };
    let symbols = match &cli.command {
        Commands::Bars { symbols, .. } => symbols.as_deref(),
        _ => None,
    };
    let config = apply_overrides(
        config,
        cli.output_dir.clone(),
        symbols,
        cli.command.summarize(),
    )?;

    let client = build_http_client(config.http.timeout)?;
    let sink = CsvSink::new(config.output_dir.clone());

    if cli.command.runs_bars() {
        // Credentials are checked before any request goes out.
        let provider = PolygonProvider::from_env(client.clone(), &config.http.polygon_base_url)?;
        let summarizer = if config.summary.enabled {
            Some(OpenAiSummarizer::from_env(
                client.clone(),
                &config.http.openai_base_url,
                &config.summary.model,
            )?)
        } else {
            None
        };

        let mut ingestor = Ingestor::new(&provider, &sink, &config);
        if let Some(summarizer) = &summarizer {
            ingestor = ingestor.with_summarizer(summarizer);
        }

        let window = ingestor.window(Utc::now());
        info!(start = %window.start, end = %window.end, "fetching bars");
        let report = ingestor.run_bars(&window).await;
        for symbol in &report.symbols {
            match &symbol.result {
                Ok(SymbolOutcome::Written { files, rows }) => {
                    info!(symbol = %symbol.symbol, rows, files = files.len(), "written")
                }
                Ok(SymbolOutcome::Skipped(reason)) => {
                    warn!(symbol = %symbol.symbol, ?reason, "skipped")
                }
                Err(e) => error!(symbol = %symbol.symbol, error = %e, "failed"),
            }
        }
    }

    if cli.command.runs_crypto() {
        let provider = CoinGeckoProvider::new(client.clone(), &config.http.coingecko_base_url);
        match run_crypto(&provider, &sink, &config.crypto).await {
            Ok(CryptoOutcome::Written { path, quotes }) => {
                info!(path = %path.display(), quotes, "spot prices written")
            }
            Ok(CryptoOutcome::Skipped) => warn!("spot prices skipped"),
            Err(e) => error!(error = %e, "spot prices failed"),
        }
    }

    info!("Done.");
    Ok(())
}
