use crate::core::health_service::HealthService;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy(health: &HealthService) -> Self {
        Self { status: "healthy".to_string(), service: health.service().to_string(), version: health.version().to_string() }
    }
}
