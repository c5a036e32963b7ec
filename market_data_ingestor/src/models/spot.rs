//! Spot price snapshots for crypto assets.

/// An asset tracked on the spot-price path: the ticker used in output files
/// and the identifier the price API knows it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoAsset {
    /// Output ticker, e.g. `"BTC"`.
    pub symbol: String,
    /// Provider identifier, e.g. `"bitcoin"`.
    pub provider_id: String,
}

impl CryptoAsset {
    pub fn new(symbol: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            provider_id: provider_id.into(),
        }
    }
}

/// Current USD price and 24-hour change of one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    pub symbol: String,
    pub price_usd: f64,
    /// Percentage change over the last 24 hours, when the provider reports it.
    pub change_24h_pct: Option<f64>,
}

pub fn default_crypto_assets() -> Vec<CryptoAsset> {
    vec![
        CryptoAsset::new("BTC", "bitcoin"),
        CryptoAsset::new("ETH", "ethereum"),
        CryptoAsset::new("SOL", "solana"),
    ]
}
