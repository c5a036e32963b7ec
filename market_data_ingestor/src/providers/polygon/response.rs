use serde::Deserialize;

use crate::models::bar::RawBar;

#[derive(Deserialize, Debug)]
pub struct PolygonAgg {
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

#[derive(Deserialize, Debug)]
pub struct AggsResponse {
    pub status: Option<String>,
    /// Absent when the range has no bars.
    #[serde(default)]
    pub results: Vec<PolygonAgg>,
    pub next_url: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl AggsResponse {
    /// The error text of an `"ERROR"` payload delivered with a 2xx status.
    pub fn error_message(&self) -> Option<String> {
        match self.status.as_deref() {
            Some("ERROR") => Some(
                self.error
                    .clone()
                    .or_else(|| self.message.clone())
                    .unwrap_or_else(|| "unspecified error".to_string()),
            ),
            _ => None,
        }
    }
}

impl From<PolygonAgg> for RawBar {
    fn from(agg: PolygonAgg) -> Self {
        RawBar {
            timestamp_ms: agg.timestamp_ms,
            open: agg.open,
            high: agg.high,
            low: agg.low,
            close: agg.close,
            volume: agg.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_page_with_results() {
        let body = r#"{
            "ticker": "SPY", "status": "OK", "resultsCount": 1, "adjusted": true,
            "results": [{"v": 1200, "vw": 580.1, "o": 580.0, "c": 580.2,
                         "h": 580.3, "l": 579.9, "t": 1729171860000, "n": 40}],
            "next_url": "https://api.polygon.io/v2/aggs/next?cursor=abc"
        }"#;
        let page: AggsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].volume, 1200.0);
        assert!(page.next_url.is_some());
        assert_eq!(page.error_message(), None);
    }

    #[test]
    fn missing_results_means_no_rows() {
        let page: AggsResponse =
            serde_json::from_str(r#"{"status": "OK", "resultsCount": 0}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn error_payload_is_surfaced() {
        let page: AggsResponse =
            serde_json::from_str(r#"{"status": "ERROR", "error": "Unknown API Key"}"#).unwrap();
        assert_eq!(page.error_message().as_deref(), Some("Unknown API Key"));
    }
}
