//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    ValidationError(String),

    #[error("missing or non-numeric features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ValidationError(_) | AppError::MissingFeatures(_) => StatusCode::BAD_REQUEST,
        };
        tracing::debug!("Rejected request: {}", self);

        let error_message = self.to_string();

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
