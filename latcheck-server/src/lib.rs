use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::HeaderName, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use latcheck_common::{ErrorResponse, LatCheckError, LatencyQuery, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};

pub mod aggregate;
pub mod config;
pub mod stats;
pub mod telemetry;

use aggregate::RegionAggregator;
use config::CHECK_LATENCY_PATH;
use telemetry::TelemetrySet;

#[derive(Clone)]
pub struct AppState {
    pub telemetry: TelemetrySet,
}

impl AppState {
    pub fn new(telemetry: TelemetrySet) -> Self {
        Self { telemetry }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Telemetry served for the lifetime of the process.
    pub telemetry: TelemetrySet,
}

/// LatCheck Server
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route(CHECK_LATENCY_PATH, post(handle_check_latency))
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(self, ready_tx: tokio::sync::oneshot::Sender<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
        let records = self.config.telemetry.len();
        let app = Self::create_router(AppState::new(self.config.telemetry));
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, records, "serving latency checks");
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Any origin may POST; preflight OPTIONS is answered by the layer itself.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

/// Handler for POST /check-latency — summarizes telemetry for each requested region.
/// Returns 400 for an empty region list and the extractor's status (400/415/422)
/// for a body that is not a `LatencyQuery`. Echoes `X-Request-Id` when present.
pub async fn handle_check_latency(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LatencyQuery>, JsonRejection>,
) -> Response {
    let request_id = headers.get(REQUEST_ID_HEADER).cloned();
    let span = info_span!(
        "check_latency",
        request_id = request_id.as_ref().and_then(|v| v.to_str().ok()).unwrap_or("-"),
    );

    let mut response = match payload {
        Err(rejection) => {
            span.in_scope(|| warn!(error = %rejection.body_text(), "rejected latency query"));
            error_response(rejection.status(), rejection.body_text())
        }
        Ok(Json(query)) => {
            let aggregator = RegionAggregator::new(state.telemetry.records());
            match span.in_scope(|| aggregator.aggregate(&query)) {
                Ok(report) => (StatusCode::OK, Json(report)).into_response(),
                Err(LatCheckError::InvalidRequest(message)) => {
                    error_response(StatusCode::BAD_REQUEST, message)
                }
                Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            }
        }
    };

    if let Some(id) = request_id {
        response.headers_mut().insert(REQUEST_ID_HEADER, id);
    }
    response
}
