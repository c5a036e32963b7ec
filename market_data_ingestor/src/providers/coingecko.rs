//! CoinGecko `simple/price` spot quotes. No credential required.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use snafu::ResultExt;
use tracing::warn;

use crate::{
    models::spot::{CryptoAsset, SpotQuote},
    providers::{ProviderError, ReqwestSnafu, SpotPriceProvider},
};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

#[derive(Deserialize, Debug)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SpotPriceProvider for CoinGeckoProvider {
    async fn fetch_quotes(&self, assets: &[CryptoAsset]) -> Result<Vec<SpotQuote>, ProviderError> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let ids = assets
            .iter()
            .map(|a| a.provider_id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .client
            .get(format!("{}/api/v3/simple/price", self.base_url))
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await
            .context(ReqwestSnafu)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let prices = response
            .json::<HashMap<String, SimplePrice>>()
            .await
            .context(ReqwestSnafu)?;

        let quotes = assets
            .iter()
            .filter_map(|asset| match prices.get(&asset.provider_id) {
                Some(SimplePrice {
                    usd: Some(usd),
                    usd_24h_change,
                }) => Some(SpotQuote {
                    symbol: asset.symbol.clone(),
                    price_usd: *usd,
                    change_24h_pct: *usd_24h_change,
                }),
                _ => {
                    warn!(symbol = %asset.symbol, id = %asset.provider_id, "no USD price returned; skipping");
                    None
                }
            })
            .collect();
        Ok(quotes)
    }
}
