use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contracts::snapshot::SnapshotError;
use contracts::{ContractError, FailureKind};
use serde_json::json;
use thiserror::Error;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unverifiable credentials
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Contract(#[from] ContractError),

    /// The call committed but its snapshot could not be written
    #[error("Snapshot error: {0}")]
    Persistence(#[from] SnapshotError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Contract(e) => match e.kind() {
                FailureKind::Unauthorized => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
                FailureKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                FailureKind::DuplicateId => (StatusCode::CONFLICT, "DUPLICATE_ID"),
                FailureKind::InvalidState => (StatusCode::CONFLICT, "INVALID_STATE"),
                FailureKind::PaymentMismatch => (StatusCode::PAYMENT_REQUIRED, "PAYMENT_MISMATCH"),
                FailureKind::InvalidArgument => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
                FailureKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            AppError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
            AppError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": code,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
