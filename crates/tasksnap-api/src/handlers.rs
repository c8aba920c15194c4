//! Route handlers for `/save` and `/load`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;
use std::time::Instant;
use tasksnap_core::errors::{ExError, SnapError};
use tasksnap_core::{log_op_end, log_op_error, log_op_start, Snapshot};
use tasksnap_core_types::correlation::REQUEST_ID_HEADER;
use tasksnap_core_types::RequestId;

use crate::config::{SaveResponseMode, REVISION_ID_HEADER};
use crate::error::ApiError;
use crate::server::AppState;

/// Append the submitted snapshot as a new revision
///
/// Responds with the snapshot as received (`echo` mode) or with the stored
/// revision (`revision` mode). The assigned id is always in `X-Revision-Id`.
pub async fn save(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Snapshot>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = request_id_from(&headers);
    let started = Instant::now();
    log_op_start!("http_save", request_id = %request_id);

    let Json(snapshot) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            let err = ApiError::rejected(rejection, &request_id);
            log_op_error!(
                "http_save",
                err.error().clone(),
                duration_ms = elapsed_ms(started),
                request_id = %request_id
            );
            return Err(err);
        }
    };

    let revision = match state.store.insert(snapshot).await {
        Ok(revision) => revision,
        Err(err) => return Err(fail("http_save", err, &request_id, started)),
    };
    let revision_id = revision.id;

    let mut response = match state.save_response {
        SaveResponseMode::Echo => Json(revision.into_snapshot()).into_response(),
        SaveResponseMode::Revision => Json(revision).into_response(),
    };
    response
        .headers_mut()
        .insert(REVISION_ID_HEADER, HeaderValue::from(revision_id));
    tag_request_id(&mut response, &request_id);

    log_op_end!(
        "http_save",
        duration_ms = elapsed_ms(started),
        request_id = %request_id,
        revision_id = revision_id
    );
    Ok(response)
}

/// Return the latest stored revision, or 404 if nothing was ever saved
pub async fn load(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let request_id = request_id_from(&headers);
    let started = Instant::now();
    log_op_start!("http_load", request_id = %request_id);

    let revision = match state.store.get_latest().await {
        Ok(Some(revision)) => revision,
        Ok(None) => {
            let err = ExError::from(SnapError::EmptyStore).with_op("load");
            return Err(fail("http_load", err, &request_id, started));
        }
        Err(err) => return Err(fail("http_load", err, &request_id, started)),
    };
    let revision_id = revision.id;

    let mut response = Json(revision).into_response();
    tag_request_id(&mut response, &request_id);

    log_op_end!(
        "http_load",
        duration_ms = elapsed_ms(started),
        request_id = %request_id,
        revision_id = revision_id
    );
    Ok(response)
}

fn fail(op: &'static str, err: ExError, request_id: &RequestId, started: Instant) -> ApiError {
    log_op_error!(
        op,
        err.clone(),
        duration_ms = elapsed_ms(started),
        request_id = %request_id,
        message = %err
    );
    ApiError::new(err, request_id)
}

fn request_id_from(headers: &HeaderMap) -> RequestId {
    RequestId::from_header_or_new(
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    )
}

fn tag_request_id(response: &mut Response, request_id: &RequestId) {
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
