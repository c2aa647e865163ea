//! Security-related response handling.
//!
//! # Design Decisions
//! - No authentication: the gateway fronts public registry data
//! - CORS is fully permissive; the endpoint is read-only

pub mod headers;
