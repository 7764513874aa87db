//! Lazily built MCP protocol runtime.
//!
//! The runtime is an axum router nesting rmcp's streamable HTTP service at
//! [`MCP_ROUTE`]. It is built at most once, on the first request that needs it,
//! and then shared by every later request.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::Router;
use imob_core::backend::{BackendClient, BackendConfig, BackendError};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tokio::sync::OnceCell;
use tracing::info;

use crate::ImobMcp;

/// Canonical route of the tool-call surface.
pub const MCP_ROUTE: &str = "/mcp";

pub type BuildRuntimeFn = Arc<dyn Fn() -> Result<Router, RuntimeError> + Send + Sync + 'static>;

#[derive(Debug)]
pub enum RuntimeError {
    Build(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(message) => write!(f, "failed to build MCP runtime: {message}"),
        }
    }
}

impl Error for RuntimeError {}

impl From<BackendError> for RuntimeError {
    fn from(err: BackendError) -> Self {
        Self::Build(err.to_string())
    }
}

/// Settings for the protocol runtime and the backend its tools call.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub backend: BackendConfig,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl RuntimeConfig {
    #[must_use]
    pub const fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            stateful_mode: false,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }
}

/// Builds the MCP router: the tool registry served over streamable HTTP.
///
/// # Errors
/// Returns [`RuntimeError::Build`] if the backend client cannot be constructed.
pub fn build_mcp_router(config: &RuntimeConfig) -> Result<Router, RuntimeError> {
    let backend = Arc::new(BackendClient::new(config.backend.clone())?);
    let service: StreamableHttpService<ImobMcp, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(ImobMcp::with_backend(backend.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );
    Ok(Router::new().nest_service(MCP_ROUTE, service))
}

/// Single-assignment holder for the runtime entry point.
///
/// Uninitialized until the first successful [`LazyRuntime::entry_point`]
/// call, ready forever after. Concurrent first callers wait on one build.
pub struct LazyRuntime {
    entry: OnceCell<Router>,
    build: BuildRuntimeFn,
    builds: AtomicUsize,
}

impl LazyRuntime {
    #[must_use]
    pub fn new(build: BuildRuntimeFn) -> Self {
        Self {
            entry: OnceCell::new(),
            build,
            builds: AtomicUsize::new(0),
        }
    }

    /// Runtime that serves the tool registry against the configured backend.
    #[must_use]
    pub fn from_config(config: RuntimeConfig) -> Self {
        Self::new(Arc::new(move || build_mcp_router(&config)))
    }

    /// Returns the entry point, building it on first use.
    ///
    /// A failed build leaves the runtime uninitialized so a later request retries.
    ///
    /// # Errors
    /// Returns the build error of this attempt.
    pub async fn entry_point(&self) -> Result<Router, RuntimeError> {
        let router = self
            .entry
            .get_or_try_init(|| async {
                let started = Instant::now();
                self.builds.fetch_add(1, Ordering::SeqCst);
                let router = (self.build)()?;
                info!(elapsed = ?started.elapsed(), "MCP runtime ready");
                Ok::<_, RuntimeError>(router)
            })
            .await?;
        Ok(router.clone())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.entry.initialized()
    }

    /// Number of build attempts so far.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for LazyRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRuntime")
            .field("ready", &self.is_ready())
            .field("builds", &self.build_count())
            .finish_non_exhaustive()
    }
}
