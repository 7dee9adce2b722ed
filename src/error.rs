use crate::core::publisher::PublishError;
use crate::domain::ValidationFailure;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit complaint. Please try again later.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(failure) => {
                tracing::debug!(error = %failure, "Validation failed");
                let body = Json(json!({
                    "error": "Validation failed",
                    "details": failure.errors,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            Self::Publish(e) => {
                // Cause and fault class are logged by the publisher; callers get a generic message.
                tracing::debug!(error = %e, "Failed to submit complaint");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": SUBMIT_FAILED_MESSAGE }))).into_response()
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal server error" }))).into_response()
            }
        }
    }
}
