use crate::api::AppState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State};

/// Liveness only: reports static identity and never touches the queue.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(&state.health_service))
}
