use latcheck_common::{ErrorResponse, LatCheckError, LatencyQuery, LatencyReport, Result, REQUEST_ID_HEADER};
use uuid::Uuid;

/// LatCheck client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address as `host:port`.
    pub address: String,
}

/// LatCheck Client
pub struct Client {
    pub config: ClientConfig,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self { config, http_client: reqwest::Client::new() }
    }

    /// Build the URL of the latency-check endpoint.
    pub fn build_check_url(&self) -> String {
        format!("http://{}/check-latency", self.config.address)
    }

    /// Summarize telemetry for each region in `query`.
    /// An empty region list is rejected locally with `InvalidRequest`, without a round trip.
    pub async fn check_latency(&self, query: &LatencyQuery) -> Result<LatencyReport> {
        query.validate()?;

        let response = self
            .http_client
            .post(self.build_check_url())
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .json(query)
            .send()
            .await
            .map_err(|e| LatCheckError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LatCheckError::NetworkError(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| LatCheckError::MalformedResponse(e.to_string()))
    }

    /// Convenience wrapper building the query from region names and a threshold.
    pub async fn check_regions<I, S>(&self, regions: I, threshold_ms: f64) -> Result<LatencyReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_latency(&LatencyQuery::new(regions, threshold_ms)).await
    }
}

async fn parse_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> LatCheckError {
    let error_msg = response
        .json::<ErrorResponse>()
        .await
        .map(|r| r.error)
        .unwrap_or_else(|_| format!("Server returned status: {}", status));

    if status == reqwest::StatusCode::BAD_REQUEST {
        return LatCheckError::InvalidRequest(error_msg);
    }

    LatCheckError::HttpError(status.as_u16(), error_msg)
}
