//! The resilient search gateway.

use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::config::GatewayConfig;
use crate::gateway::client::{ClientError, UpstreamClient};
use crate::gateway::error::GatewayError;
use crate::gateway::normalize::{normalize_entity, normalize_search};
use crate::gateway::types::{SearchQuery, SearchResponse};
use crate::resilience::{CircuitBreaker, RetryExecutor};

/// Owns the upstream client and the breaker shared by every request it serves.
#[derive(Debug)]
pub struct SearchGateway {
    client: UpstreamClient,
    breaker: CircuitBreaker,
    retry: RetryExecutor,
    request_timeout: Duration,
}

impl SearchGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: UpstreamClient::new(&config.upstream, &config.timeouts)?,
            breaker: CircuitBreaker::new(&config.circuit_breaker),
            retry: RetryExecutor::new(&config.retries),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Look up entities by keyword or by entity number.
    ///
    /// The upstream status endpoint is checked first; if it is unreachable
    /// the lookup is never attempted. Both calls share one deadline of
    /// `timeouts.request_secs`.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, GatewayError> {
        let deadline = Instant::now() + self.request_timeout;
        self.call("status", self.client.status_url(), deadline).await?;

        let (call, url) = match query {
            SearchQuery::Term(term) => ("search", self.client.search_url(term)),
            SearchQuery::EntityNumber(number) => ("entity", self.client.entity_url(number)),
        };
        let body = self.call(call, url, deadline).await?;

        let payload: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            GatewayError::UpstreamError(format!("Registry returned invalid JSON: {}", e))
        })?;

        let response = match query {
            SearchQuery::Term(_) => normalize_search(&payload)?,
            SearchQuery::EntityNumber(_) => normalize_entity(&payload)?,
        };

        tracing::debug!(
            kind = query.kind(),
            results = response.results.len(),
            total_results = response.total_results,
            "Search completed"
        );
        Ok(response)
    }

    async fn call(
        &self,
        call: &'static str,
        url: Result<Url, url::ParseError>,
        deadline: Instant,
    ) -> Result<String, GatewayError> {
        let url = url.map_err(|e| {
            GatewayError::UpstreamError(format!("Could not build {} URL: {}", call, e))
        })?;
        let client = &self.client;

        self.retry
            .execute(&self.breaker, call, deadline, move || client.get(url.clone()))
            .await
            .map_err(|e| GatewayError::from_retry(call, e))
    }
}
