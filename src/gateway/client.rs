//! Outbound HTTP client for the business-registry API.
//!
//! # Responsibilities
//! - Build endpoint URLs from the configured base URL and paths
//! - Attach the API key and user agent to every request
//! - Turn transport errors and non-2xx statuses into [`AttemptError`]

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::resilience::AttemptOutcome;

/// A single failed upstream attempt. Always retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(StatusCode),
}

impl AttemptOutcome for AttemptError {
    fn outcome(&self) -> &'static str {
        match self {
            AttemptError::Transport(e) if e.is_timeout() => "timeout",
            AttemptError::Transport(_) => "transport_error",
            AttemptError::Status(_) => "bad_status",
        }
    }
}

/// Errors building the client at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid upstream base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid API key header: {0}")]
    InvalidHeader(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Thin wrapper over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    status_path: String,
    search_path: String,
    entity_path: String,
}

impl UpstreamClient {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, ClientError> {
        // Fail at startup rather than on first request.
        Url::parse(&upstream.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &upstream.api_key {
            let name = HeaderName::from_bytes(upstream.api_key_header.as_bytes())
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            let mut value =
                HeaderValue::from_str(key).map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(upstream.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs));
        if let Some(secs) = timeouts.attempt_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if !upstream.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            http: builder.build()?,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            status_path: upstream.status_path.clone(),
            search_path: upstream.search_path.clone(),
            entity_path: upstream.entity_path.clone(),
        })
    }

    fn endpoint(&self, path: &str, query: Option<(&str, &str)>) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    pub fn status_url(&self) -> Result<Url, url::ParseError> {
        self.endpoint(&self.status_path, None)
    }

    pub fn search_url(&self, term: &str) -> Result<Url, url::ParseError> {
        self.endpoint(&self.search_path, Some(("search-term", term)))
    }

    pub fn entity_url(&self, entity_number: &str) -> Result<Url, url::ParseError> {
        self.endpoint(&self.entity_path, Some(("entity-number", entity_number)))
    }

    /// Perform one GET attempt and return the response body.
    pub async fn get(&self, url: Url) -> Result<String, AttemptError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }
        Ok(response.text().await?)
    }
}
