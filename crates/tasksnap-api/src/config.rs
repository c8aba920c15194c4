//! Server configuration

use axum::http::{header, HeaderName, HeaderValue, Method};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tasksnap_core::errors::{ExError, ExErrorKind};
use tasksnap_core::DEFAULT_USER_ID;
use tasksnap_store::PoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Response header carrying the id assigned to a saved revision
pub const REVISION_ID_HEADER: HeaderName = HeaderName::from_static("x-revision-id");

/// What `POST /save` returns on success
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveResponseMode {
    /// The submitted snapshot, unchanged
    #[default]
    Echo,
    /// The stored revision, including its assigned id and timestamp
    Revision,
}

impl FromStr for SaveResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "echo" => Ok(SaveResponseMode::Echo),
            "revision" => Ok(SaveResponseMode::Revision),
            other => Err(format!(
                "unknown save response mode '{}' (expected 'echo' or 'revision')",
                other
            )),
        }
    }
}

impl std::fmt::Display for SaveResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveResponseMode::Echo => f.write_str("echo"),
            SaveResponseMode::Revision => f.write_str("revision"),
        }
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// No CORS headers; browsers only allow same-origin callers
    #[default]
    SameOrigin,
    /// Any origin, method and header
    Permissive,
    /// Only the listed origins, for `GET`/`POST` with `Content-Type`
    AllowList(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// Build a policy from configured origin strings
    ///
    /// No origins means same-origin only; `*` anywhere means permissive.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if an origin is not a valid header value.
    pub fn from_origins<S: AsRef<str>>(origins: &[S]) -> Result<Self, ExError> {
        let origins: Vec<&str> = origins
            .iter()
            .map(|o| o.as_ref().trim())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() {
            return Ok(CorsPolicy::SameOrigin);
        }
        if origins.contains(&"*") {
            return Ok(CorsPolicy::Permissive);
        }

        let values = origins
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|e| {
                    ExError::new(ExErrorKind::InvalidInput)
                        .with_op("cors_config")
                        .with_entity_id(origin)
                        .with_message(format!("invalid CORS origin: {}", e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsPolicy::AllowList(values))
    }

    /// The tower-http layer enforcing this policy, if any
    pub fn layer(&self) -> Option<CorsLayer> {
        match self {
            CorsPolicy::SameOrigin => None,
            CorsPolicy::Permissive => Some(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
                    .expose_headers(Any),
            ),
            CorsPolicy::AllowList(origins) => Some(
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins.clone()))
                    .allow_methods([Method::GET, Method::POST])
                    .allow_headers([header::CONTENT_TYPE])
                    .expose_headers([REVISION_ID_HEADER]),
            ),
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,
    /// SQLite database file
    pub db_path: PathBuf,
    /// The single user id recorded on every revision
    pub user_id: String,
    /// Connection pool sizing and timeouts
    pub pool: PoolOptions,
    /// Upper bound on handling one request
    pub request_timeout: Duration,
    /// Largest accepted request body
    pub body_limit_bytes: usize,
    pub save_response: SaveResponseMode,
    pub cors: CorsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            db_path: PathBuf::from("snapshots.db"),
            user_id: DEFAULT_USER_ID.to_string(),
            pool: PoolOptions::default(),
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 16 * 1024 * 1024,
            save_response: SaveResponseMode::Echo,
            cors: CorsPolicy::SameOrigin,
        }
    }
}
