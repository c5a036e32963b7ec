//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait for intraday bar vendors and
//! the [`SpotPriceProvider`] trait for current-price snapshots. Concrete
//! implementations ([`polygon::PolygonProvider`], [`coingecko::CoinGeckoProvider`])
//! handle vendor-specific URLs, pagination and validation, and hand back
//! vendor-neutral records.
//!
//! Both traits are async and object safe, so the runner takes `&dyn` providers
//! and tests substitute in-memory fakes.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{bar::RawBar, request_params::BarsRequestParams};
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<RawBar>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod coingecko;
pub mod polygon;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::models::{
    bar::RawBar,
    request_params::BarsRequestParams,
    spot::{CryptoAsset, SpotQuote},
};

/// Trait for fetching time-series bar data from a market data provider.
#[async_trait]
pub trait DataProvider {
    /// Fetches the bars of one symbol for the given request parameters.
    ///
    /// Records come back in whatever order the vendor uses and may contain
    /// duplicates across pages; normalization is the caller's job.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<RawBar>, ProviderError>;
}

/// Trait for fetching current prices of a batch of assets.
#[async_trait]
pub trait SpotPriceProvider {
    /// One quote per asset the provider knows, in the order of `assets`.
    /// Unknown assets are left out rather than failing the batch.
    async fn fetch_quotes(&self, assets: &[CryptoAsset]) -> Result<Vec<SpotQuote>, ProviderError>;
}

/// Build the HTTP client shared by every provider of a run.
pub fn build_http_client(timeout: Duration) -> Result<Client, ProviderInitError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("market_data_ingestor/", env!("CARGO_PKG_VERSION")))
        .build()
        .context(ClientBuildSnafu)
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a provider implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout, undecodable body).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with an error (non-2xx status or error payload).
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// Pagination did not finish within the page limit; the partial result is
    /// discarded rather than written.
    #[snafu(display("Pagination did not finish after {pages} pages"))]
    PageLimit { pages: usize, backtrace: Backtrace },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },
}

impl ProviderError {
    /// Read the body of a failed response into an [`ProviderError::Api`].
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .ok()
            .filter(|body| !body.trim().is_empty())
            .unwrap_or_else(|| "Unknown API error".to_string());
        ApiSnafu { status, message }.build()
    }
}
