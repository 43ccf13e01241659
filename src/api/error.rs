use crate::pagination::PaginationError;
use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// Errors surfaced by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidParameter(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidParameter(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pagination(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Pagination(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Pagination(e) => e.code(),
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::NotFound(_) => "not_found",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let error = match self {
            // Internal details stay in the logs
            Self::Pagination(e) if !e.is_client_error() => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorBody { error, code: self.code() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), "Request failed: {}", self);
        } else {
            warn!(code = self.code(), "Rejected request: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
