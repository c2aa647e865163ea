//! Response handling.
//!
//! # Responsibilities
//! - Map gateway errors to HTTP status codes
//! - Render every failure as `{"error": ..., "isTemporary": ...}`
//!
//! # Status Mapping
//! - `InvalidRequest` → 400
//! - `CircuitOpen`, `UpstreamUnavailable` → 503 (with `Retry-After` when known)
//! - `UpstreamError` → 500

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub is_temporary: bool,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, is_temporary: bool) -> Self {
        Self {
            error: error.into(),
            is_temporary,
        }
    }
}

pub fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GatewayError::CircuitOpen { .. } | GatewayError::UpstreamUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        GatewayError::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let retry_after = match &self {
            GatewayError::CircuitOpen { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response =
            (status, Json(ErrorBody::new(self.to_string(), self.is_temporary()))).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&GatewayError::InvalidRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&GatewayError::UpstreamUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&GatewayError::UpstreamError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_circuit_open_sets_retry_after() {
        let response = GatewayError::CircuitOpen { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
