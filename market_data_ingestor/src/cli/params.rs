use std::path::PathBuf;

use crate::config::{ConfigError, IngestConfig, normalize_symbols};

/// Split a comma-separated symbol list. Same rules as the `symbols` key of the
/// config file: trimmed, non-empty, no duplicates.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, ConfigError> {
    let symbols = normalize_symbols(input.split(',').map(str::to_string).collect(), "symbol")?;
    if symbols.is_empty() {
        return Err(ConfigError::Invalid(format!("no symbols in '{input}'")));
    }
    Ok(symbols)
}

/// Apply command-line overrides on top of a loaded config.
pub fn apply_overrides(
    mut config: IngestConfig,
    output_dir: Option<PathBuf>,
    symbols: Option<&str>,
    summarize: bool,
) -> Result<IngestConfig, ConfigError> {
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(list) = symbols {
        config.symbols = parse_symbols(list)?;
    }
    if summarize {
        config.summary.enabled = true;
    }
    Ok(config)
}
