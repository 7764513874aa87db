//! HTTP front door for imob-mcp.
//!
//! Health probes are answered here without touching the [`LazyRuntime`]; every
//! other request is handed to the runtime's entry point, which is built on
//! first use. Dispatch failures become an opaque `500` at exactly one place.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::uri::{PathAndQuery, Uri};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use tower::ServiceExt;
use tracing::{error, info};

use crate::runtime::{LazyRuntime, MCP_ROUTE, RuntimeConfig, RuntimeError};

/// Paths a liveness or readiness prober may use.
pub const HEALTH_PATHS: [&str; 5] = ["/", "/health", "/healthz", "/ready", "/readyz"];
pub const HEALTH_BODY: &str = "ok";

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub runtime: RuntimeConfig,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr, runtime: RuntimeConfig) -> Self {
        Self { addr, runtime }
    }
}

#[derive(Debug)]
pub enum DispatchError {
    Runtime(RuntimeError),
    InvalidUri(String),
    Panicked(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(err) => write!(f, "{err}"),
            Self::InvalidUri(message) => write!(f, "invalid request URI: {message}"),
            Self::Panicked(message) => write!(f, "request handling panicked: {message}"),
        }
    }
}

impl Error for DispatchError {}

impl From<RuntimeError> for DispatchError {
    fn from(err: RuntimeError) -> Self {
        Self::Runtime(err)
    }
}

impl DispatchError {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::Panicked(message)
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        error!(error = %self, "request dispatch failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Internal Server Error",
        )
            .into_response()
    }
}

/// Strips the query string and trailing slashes; an empty path becomes `/`.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or_default().trim_end_matches('/');
    if path.is_empty() { "/" } else { path }
}

#[must_use]
pub fn is_health_probe(method: &Method, path: &str) -> bool {
    (method == Method::GET || method == Method::HEAD) && HEALTH_PATHS.contains(&path)
}

/// The tool-call route, tolerating a missing leading slash.
#[must_use]
pub fn is_mcp_route(path: &str) -> bool {
    path == MCP_ROUTE || path == MCP_ROUTE.trim_start_matches('/')
}

fn health_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain"),
            (header::CONTENT_LENGTH, "2"),
        ],
        HEALTH_BODY,
    )
        .into_response()
}

fn with_path(request: Request, path: &str) -> Result<Request, DispatchError> {
    let (mut parts, body) = request.into_parts();
    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query.as_str())
            .map_err(|err| DispatchError::InvalidUri(err.to_string()))?,
    );
    parts.uri =
        Uri::from_parts(uri_parts).map_err(|err| DispatchError::InvalidUri(err.to_string()))?;
    Ok(Request::from_parts(parts, body))
}

/// Hands a request to the runtime entry point, building it if needed.
async fn delegate(runtime: &LazyRuntime, request: Request) -> Result<Response, DispatchError> {
    let served = AssertUnwindSafe(async {
        let router = runtime.entry_point().await?;
        let response = match router.oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        Ok::<_, DispatchError>(response)
    })
    .catch_unwind()
    .await;

    match served {
        Ok(result) => result,
        Err(payload) => Err(DispatchError::from_panic(payload.as_ref())),
    }
}

/// Routes one inbound request.
///
/// # Errors
/// Returns a [`DispatchError`] when the runtime cannot be built, the request
/// URI cannot be rewritten, or serving the request panics.
pub async fn dispatch(runtime: &LazyRuntime, request: Request) -> Result<Response, DispatchError> {
    // Upgrades are not health probes.
    if request.headers().contains_key(header::UPGRADE) {
        return delegate(runtime, request).await;
    }

    let path = normalize_path(request.uri().path()).to_string();
    if is_health_probe(request.method(), &path) {
        return Ok(health_response());
    }

    let request = if is_mcp_route(&path) {
        with_path(request, MCP_ROUTE)?
    } else {
        request
    };
    delegate(runtime, request).await
}

async fn front_door(State(runtime): State<Arc<LazyRuntime>>, request: Request) -> Response {
    match dispatch(&runtime, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Builds the front door router around a lazily built runtime.
#[must_use]
pub fn build_router(runtime: Arc<LazyRuntime>) -> Router {
    Router::new().fallback(front_door).with_state(runtime)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// The protocol runtime is not built here; the first non-health request builds it.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let runtime = Arc::new(LazyRuntime::from_config(config.runtime));
    let app = build_router(runtime);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("imob-mcp listening on {}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::{get, post};
    use http_body_util::BodyExt;
    use imob_core::backend::BackendConfig;
    use serde_json::{Value, json};
    use std::time::Duration;

    use crate::helpers::NOT_CONFIGURED;

    async fn exploding() -> &'static str {
        panic!("runtime exploded")
    }

    fn test_runtime() -> Arc<LazyRuntime> {
        Arc::new(LazyRuntime::new(Arc::new(|| {
            Ok::<_, RuntimeError>(
                Router::new()
                    .route(MCP_ROUTE, post(|request: Request| async move {
                        format!("mcp {}", request.uri())
                    }))
                    .route("/panic", get(exploding)),
            )
        })))
    }

    fn failing_runtime() -> Arc<LazyRuntime> {
        Arc::new(LazyRuntime::new(Arc::new(|| {
            Err::<Router, _>(RuntimeError::Build("no client".to_string()))
        })))
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    async fn send(runtime: &Arc<LazyRuntime>, request: Request) -> (StatusCode, String) {
        let response = build_router(runtime.clone())
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn normalizes_paths() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/healthz/"), "/healthz");
        assert_eq!(normalize_path("/mcp//"), "/mcp");
        assert_eq!(normalize_path("/ready?probe=1"), "/ready");
    }

    #[test]
    fn recognizes_mcp_route_variants() {
        assert!(is_mcp_route("/mcp"));
        assert!(is_mcp_route("mcp"));
        assert!(!is_mcp_route("/mcpx"));
        assert!(!is_mcp_route("/"));
    }

    #[test]
    fn health_requires_read_method() {
        assert!(is_health_probe(&Method::GET, "/health"));
        assert!(is_health_probe(&Method::HEAD, "/"));
        assert!(!is_health_probe(&Method::POST, "/health"));
        assert!(!is_health_probe(&Method::GET, "/mcp"));
    }

    #[tokio::test]
    async fn health_aliases_never_build_the_runtime() {
        let runtime = failing_runtime();
        for alias in ["/", "/health", "/healthz/", "/ready", "/readyz"] {
            let response = build_router(runtime.clone())
                .oneshot(request(Method::GET, alias))
                .await
                .expect("router is infallible");
            assert_eq!(response.status(), StatusCode::OK, "alias {alias}");
            assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
            assert_eq!(response.headers()[header::CONTENT_LENGTH], "2");
            let body = response.into_body().collect().await.expect("body").to_bytes();
            assert_eq!(&body[..], b"ok");
        }
        assert_eq!(runtime.build_count(), 0);
        assert!(!runtime.is_ready());
    }

    #[tokio::test]
    async fn mcp_request_builds_runtime_once_and_rewrites_path() {
        let runtime = test_runtime();

        let (status, body) = send(&runtime, request(Method::POST, "/mcp/?session=a")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "mcp /mcp?session=a");

        let (status, _) = send(&runtime, request(Method::POST, "/mcp")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(runtime.build_count(), 1);
    }

    #[tokio::test]
    async fn health_path_with_other_method_goes_to_runtime() {
        let runtime = test_runtime();
        let (status, _) = send(&runtime, request(Method::POST, "/health")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(runtime.is_ready());
    }

    #[tokio::test]
    async fn upgrade_requests_skip_the_health_fast_path() {
        let runtime = test_runtime();
        let upgrade = Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(header::UPGRADE, "websocket")
            .body(Body::empty())
            .expect("valid request");

        let (status, _) = send(&runtime, upgrade).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(runtime.build_count(), 1);
    }

    #[tokio::test]
    async fn build_failure_becomes_opaque_500() {
        let runtime = failing_runtime();
        let (status, body) = send(&runtime, request(Method::POST, "/mcp")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
        assert!(!body.contains("no client"));
    }

    #[tokio::test]
    async fn panic_while_serving_becomes_500() {
        let runtime = test_runtime();
        let (status, body) = send(&runtime, request(Method::GET, "/panic")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");

        let (status, _) = send(&runtime, request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn real_runtime_rejects_non_mcp_paths() {
        let runtime = Arc::new(LazyRuntime::from_config(RuntimeConfig::new(
            BackendConfig::default(),
        )));
        let (status, _) = send(&runtime, request(Method::GET, "/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(runtime.is_ready());
    }

    fn rpc(uri: &str, message: &Value) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json, text/event-stream")
            .body(Body::from(message.to_string()))
            .expect("valid request")
    }

    /// Reads the body until `needle` shows up; streamed replies may stay open.
    async fn read_until(response: Response, needle: &str) -> String {
        let mut body = response.into_body();
        let mut text = String::new();
        let read = async {
            while let Some(frame) = body.frame().await {
                let frame = frame.expect("body frame");
                if let Some(data) = frame.data_ref() {
                    text.push_str(&String::from_utf8_lossy(data));
                }
                if text.contains(needle) {
                    break;
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), read)
            .await
            .expect("reply within timeout");
        text
    }

    async fn call_real(
        runtime: &Arc<LazyRuntime>,
        uri: &str,
        message: &Value,
        needle: &str,
    ) -> String {
        let response = build_router(runtime.clone())
            .oneshot(rpc(uri, message))
            .await
            .expect("router is infallible");
        assert_eq!(response.status(), StatusCode::OK, "{uri} {message}");
        read_until(response, needle).await
    }

    #[tokio::test]
    async fn real_runtime_serves_tools_at_mcp_route() {
        let runtime = Arc::new(LazyRuntime::from_config(RuntimeConfig::new(
            BackendConfig::default(),
        )));

        let initialize = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "front-door-test", "version": "0.0.0" }
            }
        });
        let reply = call_real(&runtime, "/mcp/", &initialize, "serverInfo").await;
        assert!(reply.contains("serverInfo"), "{reply}");

        let list = json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {} });
        let reply = call_real(&runtime, "/mcp", &list, "complete_task").await;
        for tool in [
            "search_properties",
            "get_property",
            "list_contacts",
            "get_contact",
            "list_tasks",
            "create_task",
            "complete_task",
        ] {
            assert!(reply.contains(tool), "missing {tool} in {reply}");
        }

        let call = json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "list_tasks", "arguments": {} }
        });
        let reply = call_real(&runtime, "/mcp", &call, "BACKEND_INTERNAL_KEY").await;
        assert!(reply.contains(NOT_CONFIGURED), "{reply}");
        assert_eq!(runtime.build_count(), 1);
    }
}
