//! Router assembly and the serve loop

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tasksnap_core::errors::{ExError, ExErrorKind};
use tasksnap_core::log_op_error;
use tasksnap_core_types::correlation::REQUEST_ID_HEADER;
use tasksnap_core_types::RequestId;
use tasksnap_store::{Pool, SnapshotStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{SaveResponseMode, ServerConfig};
use crate::error::ApiError;
use crate::handlers;

/// Shared application state
pub struct AppState {
    pub store: SnapshotStore,
    pub save_response: SaveResponseMode,
}

/// Build the application router
///
/// `/save` and `/load` are served at the root and again under `/api`.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let routes: Router<Arc<AppState>> = Router::new()
        .route("/save", post(handlers::save))
        .route("/load", get(handlers::load));

    let mut app = Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(middleware::from_fn_with_state(
            config.request_timeout,
            request_deadline,
        ))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = config.cors.layer() {
        app = app.layer(cors);
    }

    app.with_state(Arc::new(state))
}

/// Pin a request id on the request and bound its handling by `timeout`
///
/// The id is written back into the request headers so the handler logs and
/// reports the same one. A request that runs out of time gets an
/// `ERR_TIMEOUT` envelope; a save cut off this way may still have committed.
async fn request_deadline(
    State(timeout): State<Duration>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = RequestId::from_header_or_new(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            let err = ExError::new(ExErrorKind::Timeout)
                .with_op("request")
                .with_message(format!("request did not complete within {} ms", timeout_ms));
            log_op_error!(
                "http_request",
                err.clone(),
                duration_ms = timeout_ms,
                request_id = %request_id
            );
            ApiError::new(err, &request_id).into_response()
        }
    }
}

/// Open the store, bind, and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// - `StorageUnavailable` / `Persistence` if the database cannot be opened
///   or migrated
/// - `Io` if the address cannot be bound or the server fails
pub async fn serve(config: ServerConfig) -> Result<(), ExError> {
    let db_path = config.db_path.clone();
    let pool_options = config.pool.clone();
    let pool = tokio::task::spawn_blocking(move || Pool::open(db_path, pool_options))
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("serve")
                .with_message(format!("pool setup task failed: {}", e))
        })??;

    let state = AppState {
        store: SnapshotStore::new(pool, config.user_id.clone()),
        save_response: config.save_response,
    };
    let app = router(state, &config);

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| io_error("bind", e))?;

    info!(
        addr = %config.bind,
        db_path = %config.db_path.display(),
        save_response = %config.save_response,
        "Snapshot service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| io_error("serve", e))?;

    info!("Snapshot service stopped");
    Ok(())
}

fn io_error(op: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(op)
        .with_message(err.to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
