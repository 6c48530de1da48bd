//! HTTP error envelope.
//!
//! # Responsibility
//! - Map core `ServiceError` values and extractor rejections to status codes.
//! - Render every failure as `{"ok": false, "code", "error", "field"}`.
//!
//! # Invariants
//! - Missing path resources are 404, refused requests are 400, everything
//!   else is 500.
//! - Internal failure details go to the log, never to the client.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::Serialize;
use spycat_core::{RepoError, ServiceError};

const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    code: &'static str,
    error: String,
    field: Option<&'static str>,
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<&'static str>,
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>, field: Option<&'static str>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: VALIDATION_ERROR,
            message: message.into(),
            field,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let status = match &value {
            ServiceError::CatNotFound(_)
            | ServiceError::MissionNotFound(_)
            | ServiceError::TargetNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Repo(_) | ServiceError::InconsistentState(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            code: value.code(),
            message: value.to_string(),
            field: value.field(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::validation(value.body_text(), None)
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::validation(value.body_text(), Some("id"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(
                "event=http_response module=api status=error http_status={} error_code={} error={}",
                self.status.as_u16(),
                self.code,
                self.message
            );
            "internal server error".to_string()
        } else {
            self.message
        };

        let code = if self.status.is_server_error() {
            INTERNAL_ERROR
        } else {
            self.code
        };

        (
            self.status,
            Json(ApiErrorBody {
                ok: false,
                code,
                error: message,
                field: self.field,
            }),
        )
            .into_response()
    }
}
