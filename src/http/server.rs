//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener
//! - Dispatch search requests to the gateway

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::{ClientError, GatewayError, SearchGateway, SearchParams, SearchQuery};
use crate::http::request::{request_id, MakeUuidRequestId};
use crate::http::response::ErrorBody;
use crate::observability::metrics;
use crate::resilience::BreakerSnapshot;
use crate::security::headers::{preflight, with_cors};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SearchGateway>,
}

/// HTTP server for the search gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    gateway: Arc<SearchGateway>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ClientError> {
        let gateway = Arc::new(SearchGateway::new(&config)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Create a server around an existing gateway instance.
    pub fn with_gateway(config: GatewayConfig, gateway: Arc<SearchGateway>) -> Self {
        let state = AppState {
            gateway: gateway.clone(),
        };
        let router = Self::build_router(state);
        Self {
            router,
            config,
            gateway,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `timeouts.request_secs` is enforced by the gateway, not by a layer here.
    fn build_router(state: AppState) -> Router {
        let routes = Router::new()
            .route("/", get(search_handler).options(preflight))
            .route("/search", get(search_handler).options(preflight))
            .route("/health", get(health_handler).options(preflight))
            .route("/status", get(status_handler).options(preflight))
            .fallback(fallback_handler)
            .with_state(state);

        with_cors(routes).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request_id(request),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn gateway(&self) -> &Arc<SearchGateway> {
        &self.gateway
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Business-entity search. Takes `search-term` or `entity-number`.
async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let start_time = Instant::now();

    let query = match params
        .map_err(|e| GatewayError::InvalidRequest(e.body_text()))
        .and_then(|Query(params)| SearchQuery::from_params(params))
    {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected search request");
            metrics::record_request("invalid", StatusCode::BAD_REQUEST.as_u16(), start_time);
            return e.into_response();
        }
    };

    let response = match state.gateway.search(&query).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            if e.is_temporary() {
                tracing::warn!(kind = query.kind(), error = %e, "Search temporarily unavailable");
            } else {
                tracing::error!(kind = query.kind(), error = %e, "Search failed");
            }
            e.into_response()
        }
    };

    metrics::record_request(query.kind(), response.status().as_u16(), start_time);
    response
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Liveness of the gateway itself; never touches the upstream.
async fn health_handler() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub version: &'static str,
    pub circuit_breaker: BreakerSnapshot,
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        version: env!("CARGO_PKG_VERSION"),
        circuit_breaker: state.gateway.breaker().snapshot(),
    })
}

async fn fallback_handler(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Not found", false)),
    )
        .into_response()
}
