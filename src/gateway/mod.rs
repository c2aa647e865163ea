//! Resilient gateway to the business-registry API.
//!
//! # Data Flow
//! ```text
//! SearchQuery
//!     → service.rs (status check, then keyword or entity lookup)
//!     → resilience (breaker + retries around each call)
//!     → client.rs (one HTTP GET per attempt)
//!     → normalize.rs (upstream payload → SearchResponse)
//! ```

pub mod client;
pub mod error;
pub mod normalize;
pub mod service;
pub mod types;

pub use client::{AttemptError, ClientError, UpstreamClient};
pub use error::GatewayError;
pub use service::SearchGateway;
pub use types::{SearchParams, SearchQuery, SearchResponse, SearchResult};
