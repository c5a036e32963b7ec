use serde::Serialize;
use snafu::ensure;

use crate::{
    models::request_params::BarsRequestParams,
    providers::{ProviderError, ValidationSnafu},
};

/// Largest page the aggregates endpoint serves.
pub const MAX_LIMIT: u32 = 50_000;

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

/// Query parameters of the aggregates endpoint, minus the credential.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AggsParams {
    /// Split-adjusted prices.
    pub adjusted: bool,
    pub sort: Sort,
    pub limit: u32,
}

impl Default for AggsParams {
    fn default() -> Self {
        Self {
            adjusted: true,
            sort: Sort::Asc,
            limit: MAX_LIMIT,
        }
    }
}

/// Reject requests the endpoint cannot answer.
pub fn validate_request(params: &BarsRequestParams) -> Result<(), ProviderError> {
    ensure!(
        !params.symbol.trim().is_empty(),
        ValidationSnafu {
            message: "symbol must not be empty"
        }
    );
    ensure!(
        params.start <= params.end,
        ValidationSnafu {
            message: format!("start {} is after end {}", params.start, params.end)
        }
    );
    Ok(())
}

/// `/v2/aggs/ticker/{symbol}/range/{amount}/{unit}/{from}/{to}`
pub fn aggregates_path(params: &BarsRequestParams) -> String {
    format!(
        "/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
        params.symbol.trim(),
        params.timeframe.amount(),
        params.timeframe.unit().as_api_str(),
        params.start_date().format("%Y-%m-%d"),
        params.end_date().format("%Y-%m-%d"),
    )
}
