use crate::api::AppState;
use crate::error::{AppError, Result};
use axum::{
    extract::State,
    http::{Response, header},
    response::{IntoResponse, Redirect},
};

/// Returns the `OpenAPI` specification in YAML format, stamped with the running version.
///
/// # Errors
/// Returns `AppError::Internal` if the response cannot be constructed.
pub async fn openapi_yaml(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let spec = include_str!("../../openapi.yaml");
    let stamped = spec.replace("version: 0.0.0", &format!("version: {}", state.health_service.version()));

    Response::builder().header(header::CONTENT_TYPE, "text/yaml").body(stamped).map_err(|_| AppError::Internal)
}

pub async fn root() -> Redirect {
    Redirect::temporary("/openapi.yaml")
}
