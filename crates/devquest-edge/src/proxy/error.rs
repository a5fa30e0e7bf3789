//! Error responses produced by the relay itself
//!
//! Anything the backend returns, including 4xx/5xx and redirects, is relayed
//! verbatim and never becomes a `ProxyError`. These variants cover the cases
//! where no upstream response exists to relay.

use axum::{
    body::Body,
    http::{Response, StatusCode, header},
    response::IntoResponse,
};
use thiserror::Error;

/// Errors that end a relayed request without an upstream response
#[derive(Error, Debug, Clone)]
pub enum ProxyError {
    /// The request path is not handled by the relay
    #[error("Not found: {0}")]
    NotFound(String),

    /// The computed backend URL could not be parsed
    #[error("Invalid upstream URL: {0}")]
    InvalidTarget(String),

    /// The inbound request body could not be read
    #[error("Request error: {0}")]
    Request(String),

    /// Connection to the backend failed or timed out
    #[error("Upstream unreachable: {0}")]
    Network(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::InvalidTarget(_) | ProxyError::Request(_) => StatusCode::BAD_REQUEST,
            ProxyError::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable error type placed in the JSON body
    pub fn category(&self) -> &'static str {
        match self {
            ProxyError::NotFound(_) => "not_found",
            ProxyError::InvalidTarget(_) => "invalid_url",
            ProxyError::Request(_) => "invalid_request",
            ProxyError::Network(_) => "upstream_unreachable",
        }
    }

    /// Classify a failed upstream call
    pub fn from_upstream(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            ProxyError::Network(format!("Request timed out: {error}"))
        } else if error.is_connect() {
            ProxyError::Network(format!("Failed to connect to upstream: {error}"))
        } else {
            ProxyError::Network(format!("Request failed: {error}"))
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response<Body> {
        let body = serde_json::json!({
            "error": {
                "type": self.category(),
                "message": self.to_string(),
            }
        });

        let mut response = Response::new(Body::from(body.to_string()));
        *response.status_mut() = self.status();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::InvalidTarget("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::Request("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::Network("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_network_error_is_bad_gateway_json() {
        let response = ProxyError::Network("connection refused".into()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "upstream_unreachable");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("connection refused")
        );
    }

    #[tokio::test]
    async fn test_invalid_target_body() {
        let json = body_json(ProxyError::InvalidTarget("bad".into()).into_response()).await;
        assert_eq!(json["error"]["type"], "invalid_url");
    }
}
