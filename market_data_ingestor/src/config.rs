//! Run configuration: parsing, validation, and defaults.
//!
//! The TOML file is deserialized into raw `*Cfg` structs (every table rejects
//! unknown keys) and then validated into an [`IngestConfig`]:
//! - symbols are trimmed, non-empty and unique (order preserved)
//! - timeframe labels are unique and differ from the base label
//! - widths tile a day (see [`Timeframe::bucket`])
//! - the time zone is a known IANA name
//!
//! Every key is optional; an empty file yields [`IngestConfig::default`].
//!
//! ```toml
//! output_dir = "data"
//! timezone = "America/New_York"
//! window_minutes = 1440
//! symbols = ["SPY", "QQQ"]
//!
//! [[timeframes]]
//! label = "1h"
//! width = "60m"
//!
//! [[crypto]]
//! symbol = "BTC"
//! provider_id = "bitcoin"
//!
//! [summary]
//! enabled = true
//! bars = 5
//! ```

use std::{
    collections::HashSet,
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    models::{
        spot::{CryptoAsset, default_crypto_assets},
        timeframe::{Timeframe, TimeframeSpec, default_timeframes},
    },
    pipeline::tz::{TzError, parse_tz},
    providers::{coingecko, polygon},
    summarize::openai,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    TimeZone(#[from] TzError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Raw file shape.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestCfg {
    pub output_dir: Option<PathBuf>,
    pub timezone: Option<String>,
    pub window_minutes: Option<u32>,
    pub symbols: Option<Vec<String>>,
    pub base_label: Option<String>,
    pub timeframes: Option<Vec<TimeframeCfg>>,
    pub crypto: Option<Vec<CryptoCfg>>,
    #[serde(default)]
    pub summary: SummaryCfg,
    #[serde(default)]
    pub http: HttpCfg,
}

/// One resampling target; `width` is `<n>m`, `<n>h` or `1d`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeframeCfg {
    pub label: String,
    pub width: Timeframe,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CryptoCfg {
    pub symbol: String,
    pub provider_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryCfg {
    pub enabled: Option<bool>,
    pub model: Option<String>,
    pub bars: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpCfg {
    pub timeout_secs: Option<u64>,
    pub polygon_base_url: Option<String>,
    pub coingecko_base_url: Option<String>,
    pub openai_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryConfig {
    pub enabled: bool,
    pub model: String,
    /// How many of the most recent bars go into the prompt.
    pub bars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub polygon_base_url: String,
    pub coingecko_base_url: String,
    pub openai_base_url: String,
}

/// Validated configuration of one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub output_dir: PathBuf,
    pub timezone: Tz,
    pub window_minutes: NonZeroU32,
    pub symbols: Vec<String>,
    /// Label of the untouched base-resolution file (`SPY_1m.csv`).
    pub base_label: String,
    pub timeframes: Vec<TimeframeSpec>,
    pub crypto: Vec<CryptoAsset>,
    pub summary: SummaryConfig,
    pub http: HttpConfig,
}

const DEFAULT_WINDOW_MINUTES: NonZeroU32 = match NonZeroU32::new(24 * 60) {
    Some(nz) => nz,
    None => unreachable!(),
};

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            timezone: chrono_tz::America::New_York,
            window_minutes: DEFAULT_WINDOW_MINUTES,
            symbols: vec!["SPY".to_string(), "QQQ".to_string()],
            base_label: "1m".to_string(),
            timeframes: default_timeframes(),
            crypto: default_crypto_assets(),
            summary: SummaryConfig {
                enabled: false,
                model: openai::DEFAULT_MODEL.to_string(),
                bars: 5,
            },
            http: HttpConfig {
                timeout: Duration::from_secs(60),
                polygon_base_url: polygon::DEFAULT_BASE_URL.to_string(),
                coingecko_base_url: coingecko::DEFAULT_BASE_URL.to_string(),
                openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            },
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Symbols and labels become part of output file names
/// (`{symbol}_{label}.csv`), so they must stay a single path component.
fn check_file_component(s: &str, what: &str) -> Result<(), ConfigError> {
    if s.contains(['/', '\\', '\0']) || s.contains("..") {
        return Err(invalid(format!(
            "{what} {s:?} must not contain path separators or '..'"
        )));
    }
    Ok(())
}

/// Trim, reject empties, duplicates and path-like values, keep first-seen order.
pub(crate) fn normalize_symbols(raw: Vec<String>, what: &str) -> Result<Vec<String>, ConfigError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for s in raw {
        let s = s.trim().to_string();
        if s.is_empty() {
            return Err(invalid(format!("{what} cannot be empty after trimming")));
        }
        check_file_component(&s, what)?;
        if !seen.insert(s.clone()) {
            return Err(invalid(format!("duplicate {what}: {s}")));
        }
        out.push(s);
    }
    Ok(out)
}

impl IngestCfg {
    /// Validate into an [`IngestConfig`], filling unset keys from the defaults.
    pub fn validate(self) -> Result<IngestConfig, ConfigError> {
        let defaults = IngestConfig::default();

        let timezone = match self.timezone {
            Some(name) => parse_tz(&name)?,
            None => defaults.timezone,
        };

        let window_minutes = match self.window_minutes {
            Some(m) => NonZeroU32::new(m).ok_or_else(|| invalid("window_minutes must be > 0"))?,
            None => defaults.window_minutes,
        };

        let symbols = match self.symbols {
            Some(list) => normalize_symbols(list, "symbol")?,
            None => defaults.symbols,
        };

        let base_label = match self.base_label {
            Some(label) if label.trim().is_empty() => {
                return Err(invalid("base_label cannot be empty"));
            }
            Some(label) => {
                let label = label.trim().to_string();
                check_file_component(&label, "base_label")?;
                label
            }
            None => defaults.base_label,
        };

        let timeframes = match self.timeframes {
            Some(list) => {
                let labels = normalize_symbols(
                    list.iter().map(|t| t.label.clone()).collect(),
                    "timeframe label",
                )?;
                if labels.contains(&base_label) {
                    return Err(invalid(format!(
                        "timeframe label {base_label} collides with base_label"
                    )));
                }
                labels
                    .into_iter()
                    .zip(list)
                    .map(|(label, t)| TimeframeSpec::new(label, t.width))
                    .collect()
            }
            None => defaults.timeframes,
        };

        let crypto = match self.crypto {
            Some(list) => {
                let symbols =
                    normalize_symbols(list.iter().map(|c| c.symbol.clone()).collect(), "crypto symbol")?;
                symbols
                    .into_iter()
                    .zip(list)
                    .map(|(symbol, c)| {
                        let id = c.provider_id.trim();
                        if id.is_empty() {
                            Err(invalid(format!("crypto {symbol}: provider_id cannot be empty")))
                        } else {
                            Ok(CryptoAsset::new(symbol, id))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => defaults.crypto,
        };

        let summary = SummaryConfig {
            enabled: self.summary.enabled.unwrap_or(defaults.summary.enabled),
            model: self.summary.model.unwrap_or(defaults.summary.model),
            bars: match self.summary.bars {
                Some(0) => return Err(invalid("summary.bars must be > 0")),
                Some(n) => n,
                None => defaults.summary.bars,
            },
        };

        let http = HttpConfig {
            timeout: match self.http.timeout_secs {
                Some(0) => return Err(invalid("http.timeout_secs must be > 0")),
                Some(secs) => Duration::from_secs(secs),
                None => defaults.http.timeout,
            },
            polygon_base_url: self
                .http
                .polygon_base_url
                .unwrap_or(defaults.http.polygon_base_url),
            coingecko_base_url: self
                .http
                .coingecko_base_url
                .unwrap_or(defaults.http.coingecko_base_url),
            openai_base_url: self
                .http
                .openai_base_url
                .unwrap_or(defaults.http.openai_base_url),
        };

        Ok(IngestConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            timezone,
            window_minutes,
            symbols,
            base_label,
            timeframes,
            crypto,
            summary,
            http,
        })
    }
}

/// Parse and validate a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> Result<IngestConfig, ConfigError> {
    let raw: IngestCfg = toml::from_str(toml_str)?;
    raw.validate()
}

/// Read a configuration TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<Path>) -> Result<IngestConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_the_default_run() {
        let cfg = load_config_str("").unwrap();
        assert_eq!(cfg, IngestConfig::default());
        assert_eq!(cfg.window_minutes.get(), 1440);
        assert_eq!(cfg.symbols, ["SPY", "QQQ"]);
        assert_eq!(cfg.timeframes.len(), 8);
        assert_eq!(cfg.http.timeout, Duration::from_secs(60));
    }

    #[test]
    fn full_file() {
        let cfg = load_config_str(
            r#"
            output_dir = "out"
            timezone = "Europe/London"
            window_minutes = 390
            symbols = [" AAPL ", "MSFT"]
            base_label = "1min"

            [[timeframes]]
            label = "10m"
            width = "10m"

            [[timeframes]]
            label = "2h"
            width = "120m"

            [[crypto]]
            symbol = "DOGE"
            provider_id = "dogecoin"

            [summary]
            enabled = true
            bars = 10

            [http]
            timeout_secs = 5
            polygon_base_url = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.timezone, chrono_tz::Europe::London);
        assert_eq!(cfg.window_minutes.get(), 390);
        assert_eq!(cfg.symbols, ["AAPL", "MSFT"]);
        assert_eq!(cfg.base_label, "1min");
        let labels: Vec<_> = cfg.timeframes.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["10m", "2h"]);
        assert_eq!(cfg.timeframes[1].timeframe.secs(), 7200);
        assert_eq!(cfg.crypto, [CryptoAsset::new("DOGE", "dogecoin")]);
        assert!(cfg.summary.enabled);
        assert_eq!(cfg.summary.bars, 10);
        assert_eq!(cfg.summary.model, "gpt-3.5-turbo");
        assert_eq!(cfg.http.timeout, Duration::from_secs(5));
        assert_eq!(cfg.http.polygon_base_url, "http://localhost:9000");
        assert_eq!(cfg.http.openai_base_url, openai::DEFAULT_BASE_URL);
    }

    #[test]
    fn unknown_keys_are_errors() {
        let err = load_config_str("symbls = [\"SPY\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = load_config_str("[[timeframes]]\nlabel = \"5m\"\nwidth = \"5m\"\nrule = \"5T\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_widths_fail_at_load() {
        let err = load_config_str("[[timeframes]]\nlabel = \"7m\"\nwidth = \"7m\"").unwrap_err();
        assert!(err.to_string().contains("does not divide a day"));
    }

    #[test]
    fn duplicate_symbols_and_labels_are_rejected() {
        let err = load_config_str(r#"symbols = ["SPY", " SPY"]"#).unwrap_err();
        assert!(err.to_string().contains("duplicate symbol"));

        let err = load_config_str(
            "[[timeframes]]\nlabel = \"1m\"\nwidth = \"1m\"",
        )
        .unwrap_err();
        assert!(err.to_string().contains("collides with base_label"));
    }

    #[test]
    fn path_like_symbols_and_labels_are_rejected() {
        for bad in [
            r#"symbols = ["../x"]"#,
            r#"symbols = ["A/B"]"#,
            r#"symbols = ['A\B']"#,
            r#"base_label = "../1m""#,
            "[[timeframes]]\nlabel = \"sub/5m\"\nwidth = \"5m\"",
        ] {
            let err = load_config_str(bad).unwrap_err();
            assert!(
                err.to_string().contains("path separators"),
                "{bad}: {err}"
            );
        }
        // Dotted tickers are fine.
        let cfg = load_config_str(r#"symbols = ["BRK.B"]"#).unwrap();
        assert_eq!(cfg.symbols, ["BRK.B"]);
    }

    #[test]
    fn zero_window_and_unknown_zone_are_rejected() {
        assert!(matches!(
            load_config_str("window_minutes = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_config_str(r#"timezone = "Nowhere/Special""#),
            Err(ConfigError::TimeZone(_))
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_config_path("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
