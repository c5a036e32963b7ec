//! Polygon.io aggregate bars.

pub mod params;
pub mod response;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_secret_env_var;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::{bar::RawBar, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, DataProvider, MissingEnvVarSnafu, PageLimitSnafu, ProviderError,
        ProviderInitError, ReqwestSnafu,
        polygon::{
            params::{AggsParams, aggregates_path, validate_request},
            response::AggsResponse,
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

/// Default upper bound on pages for a single request; a day of minute bars
/// fits in one page, so hitting this means the cursor is looping.
pub const DEFAULT_MAX_PAGES: usize = 100;

pub struct PolygonProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    query: AggsParams,
    max_pages: usize,
}

impl PolygonProvider {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            query: AggsParams::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Creates a provider with the key read from `POLYGON_API_KEY`.
    pub fn from_env(client: Client, base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let api_key = get_secret_env_var(API_KEY_ENV).context(MissingEnvVarSnafu)?;
        Ok(Self::new(client, base_url, api_key))
    }

    pub fn with_query(mut self, query: AggsParams) -> Self {
        self.query = query;
        self
    }

    /// Fail a request that needs more than `max_pages` pages (at least 1).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    async fn fetch_page(
        &self,
        url: &str,
        first_page: bool,
    ) -> Result<AggsResponse, ProviderError> {
        let mut request = self.client.get(url);
        // `next_url` already carries the original query plus a cursor.
        if first_page {
            request = request.query(&self.query);
        }
        let response = request
            .query(&[("apiKey", self.api_key.expose_secret())])
            .send()
            .await
            .context(ReqwestSnafu)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let status = response.status().as_u16();
        let page = response.json::<AggsResponse>().await.context(ReqwestSnafu)?;
        if let Some(message) = page.error_message() {
            return ApiSnafu { status, message }.fail();
        }
        Ok(page)
    }
}

#[async_trait]
impl DataProvider for PolygonProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<RawBar>, ProviderError> {
        validate_request(&params)?;

        let mut url = format!("{}{}", self.base_url, aggregates_path(&params));
        let mut records = Vec::new();

        for page_no in 0..self.max_pages {
            let page = self.fetch_page(&url, page_no == 0).await?;
            debug!(
                symbol = %params.symbol,
                page = page_no,
                rows = page.results.len(),
                "fetched aggregates page"
            );
            records.extend(page.results.into_iter().map(RawBar::from));

            match page.next_url {
                Some(next) => url = next,
                None => return Ok(records),
            }
        }

        warn!(
            symbol = %params.symbol,
            pages = self.max_pages,
            rows = records.len(),
            "next_url still set at page limit; discarding partial result"
        );
        PageLimitSnafu {
            pages: self.max_pages,
        }
        .fail()
    }
}
