use crate::api::AppState;
use crate::api::schemas::complaints::ComplaintResponse;
use crate::domain::validation::parse_payload;
use crate::error::Result;
use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};

/// Submits a complaint for a booking and forwards it to the queue.
///
/// The body is read as raw bytes so undecodable JSON is reported like any
/// other validation failure.
///
/// # Errors
/// Returns `AppError::Validation` (422) for malformed input.
/// Returns `AppError::Publish` (500) if the queue did not accept the message.
pub async fn create_complaint(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let raw = parse_payload(&body)?;
    let complaint = state.complaint_service.submit(&raw).await?;

    tracing::info!(booking_id = %complaint.booking_id, "Complaint submitted");

    Ok((StatusCode::CREATED, Json(ComplaintResponse::from(complaint))))
}
