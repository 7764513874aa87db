//! Client for the internal backend REST interface.
//!
//! Every call returns a [`BackendResponse`]. Transport failures never escape
//! this module: they collapse into the sentinel status `0`, which is also what
//! an unconfigured client returns without touching the network.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::fields::Record;

/// Header carrying the pre-shared key.
pub const INTERNAL_KEY_HEADER: &str = "X-Internal-Key";

/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Reserved status meaning "no call happened or it failed in transport".
pub const UNREACHABLE_STATUS: u16 = 0;

/// Connection settings for the backend.
#[derive(Clone)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub internal_key: Option<String>,
    pub timeout: Duration,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: Option<String>, internal_key: Option<String>) -> Self {
        Self {
            base_url: base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            internal_key: internal_key.filter(|key| !key.trim().is_empty()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Both the base URL and the key are required to reach the backend.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.internal_key.is_some()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("internal_key", &self.internal_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub enum BackendError {
    ClientBuild(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild(message) => write!(f, "failed to build backend HTTP client: {message}"),
        }
    }
}

impl Error for BackendError {}

/// Status code and decoded body of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Value,
}

impl BackendResponse {
    /// The sentinel result: status `0` with an empty object body.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            status: UNREACHABLE_STATUS,
            body: Value::Object(Map::new()),
        }
    }

    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        self.status == UNREACHABLE_STATUS
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Body as a list, when the backend returned a JSON array.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        self.body.as_array().map(Vec::as_slice)
    }

    /// Body as a single record, when the backend returned a JSON object.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        self.body.as_object()
    }
}

/// HTTP client for `/api/internal/*` routes.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Builds a client; an unconfigured backend is accepted and degrades every call.
    ///
    /// # Errors
    /// Returns [`BackendError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BackendError::ClientBuild(err.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub async fn get(&self, path: &str, params: &Record) -> BackendResponse {
        self.call(Method::GET, path, params).await
    }

    pub async fn post(&self, path: &str, body: &Record) -> BackendResponse {
        self.call(Method::POST, path, body).await
    }

    pub async fn patch(&self, path: &str, body: &Record) -> BackendResponse {
        self.call(Method::PATCH, path, body).await
    }

    /// Issues one request against the backend.
    ///
    /// For `GET` the mapping becomes query parameters; for every other method
    /// it is sent as the JSON body. The call is attempted once.
    pub async fn call(&self, method: Method, path: &str, params: &Record) -> BackendResponse {
        let (Some(base_url), Some(key)) = (&self.config.base_url, &self.config.internal_key) else {
            return BackendResponse::unreachable();
        };

        let url = format!("{base_url}{path}");
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(INTERNAL_KEY_HEADER, key);
        request = if method == Method::GET {
            request.query(&query_pairs(params))
        } else {
            request.json(params)
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, path, error = %err, "backend request failed");
                return BackendResponse::unreachable();
            }
        };

        let status = response.status().as_u16();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%method, path, status, error = %err, "backend response body unreadable");
                return BackendResponse::unreachable();
            }
        };
        debug!(%method, path, status, "backend call finished");

        if bytes.is_empty() {
            return BackendResponse {
                status,
                body: Value::Object(Map::new()),
            };
        }
        match serde_json::from_slice(&bytes) {
            Ok(body) => BackendResponse { status, body },
            Err(err) => {
                warn!(%method, path, status, error = %err, "backend response is not JSON");
                BackendResponse::unreachable()
            }
        }
    }
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn query_pairs(params: &Record) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(value) => value.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), rendered))
        })
        .collect()
}
