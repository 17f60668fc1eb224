//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndvi_common::NdviError;
use renderer::RenderError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ndvi(#[from] NdviError),

    #[error("load {generation} was superseded by load {latest}")]
    Superseded { generation: u64, latest: u64 },

    #[error("Failed to render image: {0}")]
    Render(#[from] RenderError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ndvi(e) => StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY),
            ApiError::Superseded { .. } => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Render(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable identifier placed in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Ndvi(e) => e.kind().as_str(),
            ApiError::Superseded { .. } => "superseded",
            ApiError::Render(_) => "render",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
