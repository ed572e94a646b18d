use thiserror::Error;

/// Failures at the market-data fetch boundary.
///
/// Chart endpoints recover from any of these by substituting a synthetic
/// series; listing endpoints surface them to the page handler.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rate limited by upstream on {endpoint}")]
    RateLimited { endpoint: String },

    #[error("unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed payload from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty payload from {endpoint}")]
    EmptyPayload { endpoint: String },
}
