//! Edge relay HTTP server
//!
//! Relays every request under the configured prefix to a single backend
//! origin, so the SPA and its API appear to share one origin:
//! - `{query_route}?path=...` reads the backend path from a query parameter
//! - any other path under `{route_prefix}` has the prefix stripped
//! - `/health` answers locally
//!
//! Each inbound request produces exactly one upstream request. Redirects are
//! relayed, not followed, and upstream bodies are streamed back unbuffered.

use axum::{
    Json, Router,
    body::Body,
    extract::{RawQuery, Request, State},
    http::{HeaderMap, Method, Response, header},
    response::IntoResponse,
    routing::{any, get},
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{BackendOrigin, EdgeConfig};
use crate::error::{EdgeError, Result};

use super::error::ProxyError;
use super::headers::{HeaderPolicy, response_headers};
use super::target::{BackendTarget, TargetResolver};

/// Shared, read-only state for all handlers
pub struct AppState {
    /// Edge configuration
    pub config: EdgeConfig,
    /// Maps inbound paths onto backend URLs
    pub resolver: TargetResolver,
    /// Request header forwarding policy
    pub policy: HeaderPolicy,
    /// HTTP client for upstream requests (redirects disabled)
    pub client: reqwest::Client,
}

impl AppState {
    /// Build the handler state for an already-resolved backend origin
    pub fn new(config: EdgeConfig, origin: BackendOrigin) -> Result<Self> {
        config.validate()?;
        let policy = HeaderPolicy::from_config(&config)?;
        let client = build_client(config.timeout_secs)?;
        let resolver = TargetResolver::from_config(origin, &config);

        Ok(Self {
            config,
            resolver,
            policy,
            client,
        })
    }
}

/// Build the upstream HTTP client
///
/// Redirect following is disabled so 3xx responses reach the caller as-is.
pub fn build_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| EdgeError::Proxy(format!("Failed to create HTTP client: {e}")))
}

/// The edge relay server
pub struct EdgeServer {
    config: EdgeConfig,
    origin: BackendOrigin,
}

impl EdgeServer {
    pub fn new(config: EdgeConfig, origin: BackendOrigin) -> Self {
        Self { config, origin }
    }

    /// Start the server and relay requests until a shutdown signal arrives
    pub async fn serve(&self) -> Result<()> {
        let state = Arc::new(AppState::new(self.config.clone(), self.origin.clone())?);
        tracing::info!("Backend origin: {}", self.origin);
        tracing::info!(
            "Relaying {}/* and {}?path=...",
            state.config.route_prefix.trim_end_matches('/'),
            state.config.query_route
        );
        tracing::info!("Forwarded request headers: {}", state.policy.describe());

        let app = create_router(state);

        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| EdgeError::Config(format!("Invalid listen address: {e}")))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EdgeError::Proxy(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!("Edge relay listening on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| EdgeError::Proxy(format!("Server error: {e}")))?;

        tracing::info!("Edge relay shut down gracefully");
        Ok(())
    }
}

/// Create the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let query_route = state.config.query_route.clone();

    Router::new()
        .route("/health", get(health_handler))
        .route(&query_route, any(query_proxy_handler))
        .fallback(path_proxy_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Health check endpoint - returns JSON status
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Relay `{query_route}?path={sub_path}&...`
async fn query_proxy_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response<Body> {
    let target = state.resolver.resolve_query(query.as_deref());
    relay(&state, target, method, headers, body).await
}

/// Relay `{route_prefix}/{sub_path}?{query}`; everything else is a 404
async fn path_proxy_handler(State(state): State<Arc<AppState>>, request: Request) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let target = state
        .resolver
        .resolve_path(parts.uri.path(), parts.uri.query());
    relay(&state, target, parts.method, parts.headers, body).await
}

async fn relay(
    state: &AppState,
    target: std::result::Result<BackendTarget, ProxyError>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response<Body> {
    let result = match target {
        Ok(target) => forward_request(state, &target, method, headers, body).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ProxyError::Network(_) => tracing::warn!("{e}"),
                _ => tracing::debug!("{e}"),
            }
            e.into_response()
        }
    }
}

/// GET and HEAD never carry a body upstream
pub fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Send one request upstream and stream its response back
async fn forward_request(
    state: &AppState,
    target: &BackendTarget,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> std::result::Result<Response<Body>, ProxyError> {
    let mut outbound_headers = state.policy.request_headers(&headers);

    let body_bytes: Option<Bytes> = if carries_body(&method) {
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ProxyError::Request(format!("Failed to read request body: {e}")))?;
        Some(bytes).filter(|b| !b.is_empty())
    } else {
        None
    };

    // A forwarded content-length would describe a body that is not sent
    if body_bytes.is_none() {
        outbound_headers.remove(header::CONTENT_LENGTH);
    }

    tracing::debug!("Relaying {method} to {}", target.url);

    let mut request = state
        .client
        .request(method, target.url.clone())
        .headers(outbound_headers);
    if let Some(bytes) = body_bytes {
        request = request.body(bytes);
    }

    let upstream = request
        .send()
        .await
        .map_err(|e| ProxyError::from_upstream(&e))?;

    let status = upstream.status();
    let relayed_headers = response_headers(upstream.headers());
    tracing::debug!("Upstream responded {status} for {}", target.url);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = relayed_headers;
    Ok(response)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
