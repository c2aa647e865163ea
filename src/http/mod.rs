//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → search handler → gateway
//!     → response.rs (error → status + JSON body)
//!     → security::headers (CORS on every response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeUuidRequestId, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::{AppState, HttpServer};
