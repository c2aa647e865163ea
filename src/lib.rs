//! Resilient Entity-Search Gateway
//!
//! An HTTP front for a government business-registry API. Every outbound
//! call goes through a shared circuit breaker and an exponential-backoff
//! retry loop; upstream payloads are normalized into a stable JSON
//! contract for browser clients.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  SEARCH GATEWAY                  │
//!   GET /search       │  ┌─────────┐    ┌───────────┐    ┌────────────┐  │
//!  ───────────────────┼─▶│  http   │───▶│  gateway  │───▶│ resilience │  │
//!                     │  │ server  │    │  service  │    │ breaker +  │  │
//!                     │  └─────────┘    └─────┬─────┘    │  retries   │  │
//!                     │       ▲               │          └─────┬──────┘  │
//!   JSON response     │       │         ┌─────▼─────┐    ┌─────▼──────┐  │    Registry
//!  ◀──────────────────┼───────┴─────────│ normalize │◀───│   client   │◀─┼──── API
//!                     │                 └───────────┘    └────────────┘  │
//!                     │  config · observability · security · lifecycle   │
//!                     └──────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::GatewayConfig;
pub use gateway::{GatewayError, SearchGateway, SearchQuery, SearchResponse, SearchResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
