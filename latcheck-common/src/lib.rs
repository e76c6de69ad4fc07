use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message carried by `InvalidRequest` when the region list is empty.
pub const EMPTY_REGIONS_MESSAGE: &str = "regions must be a non-empty list";

/// Header used to correlate a client call with the server's log lines.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Error types for LatCheck operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatCheckError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// JSON error envelope returned by the server for all error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result type for LatCheck operations
pub type Result<T> = std::result::Result<T, LatCheckError>;

/// Body of `POST /check-latency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyQuery {
    /// Region names as the caller spelled them. Matching is case-insensitive,
    /// but the report is keyed by these exact strings.
    pub regions: Vec<String>,
    pub threshold_ms: f64,
}

impl LatencyQuery {
    pub fn new<I, S>(regions: I, threshold_ms: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { regions: regions.into_iter().map(Into::into).collect(), threshold_ms }
    }

    /// Rejects an empty region list; any threshold is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(LatCheckError::InvalidRequest(EMPTY_REGIONS_MESSAGE.to_string()));
        }
        Ok(())
    }
}

/// Per-region statistics. Stats are `None` (serialized as `null`) when the
/// region has no samples for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub avg_uptime: Option<f64>,
    pub breaches: u64,
    pub samples: u64,
}

/// Response envelope: one summary per requested region name, in the order the
/// names were first requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyReport {
    pub regions: IndexMap<String, RegionSummary>,
}
