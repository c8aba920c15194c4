//! Error to HTTP response mapping

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tasksnap_core::errors::{ExError, ExErrorKind, SnapError};
use tasksnap_core_types::correlation::REQUEST_ID_HEADER;
use tasksnap_core_types::RequestId;

/// An `ExError` on its way to becoming an HTTP response
#[derive(Debug)]
pub struct ApiError {
    error: ExError,
    status: StatusCode,
}

impl ApiError {
    /// Wrap `error`, tagging it with the request it failed
    pub fn new(error: ExError, request_id: &RequestId) -> Self {
        let error = error.with_request_id(request_id.clone());
        let status = status_for(error.kind());
        Self { error, status }
    }

    /// A request body that could not be read as a Snapshot
    ///
    /// Oversized bodies keep their 413; every other rejection is a 422.
    pub fn rejected(rejection: JsonRejection, request_id: &RequestId) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let error = ExError::from(SnapError::InvalidSnapshot {
            reason: rejection.body_text(),
        })
        .with_op("save")
        .with_request_id(request_id.clone());
        Self { error, status }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error(&self) -> &ExError {
        &self.error
    }
}

/// HTTP status for each error kind
pub fn status_for(kind: ExErrorKind) -> StatusCode {
    match kind {
        ExErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ExErrorKind::EmptyStore => StatusCode::NOT_FOUND,
        ExErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ExErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ExErrorKind::Persistence
        | ExErrorKind::Serialization
        | ExErrorKind::ConstraintViolation
        | ExErrorKind::Io
        | ExErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Storage details stay in the logs
        let kind = self.error.kind();
        let message = if kind.is_storage_failure()
            || matches!(kind, ExErrorKind::Io | ExErrorKind::Internal)
        {
            "the snapshot store failed to complete the request"
        } else {
            self.error.message()
        };

        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.error.code(),
                message,
                request_id: self.error.request_id().map(RequestId::as_str),
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(value) = self
            .error
            .request_id()
            .and_then(|id| HeaderValue::from_str(id.as_str()).ok())
        {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        response
    }
}
