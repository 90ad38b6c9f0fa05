// Service-level error type shared by the HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::db::StoreError;
use crate::recommend::RecommendError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database Error: {0}")]
    Database(#[from] StoreError),

    #[error("Error generating recommendations: {0}")]
    Recommendation(StoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Recommendation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}
