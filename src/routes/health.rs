//! Liveness and database health endpoints.

use crate::config::ServiceConfig;
use crate::connection::ConnectionProvider;
use crate::error::ApiError;
use crate::models::ServiceStatus;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Service identity.
#[openapi(tag = "Health")]
#[get("/")]
pub fn service_status(config: &State<ServiceConfig>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        service: config.service_id.clone(),
        status: "running".to_string(),
    })
}

/// Process liveness; never touches the database.
#[openapi(tag = "Health")]
#[get("/health/live")]
pub fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Opens a CMWeb connection (for `apikey` if given) and runs `SELECT 1`.
#[openapi(tag = "Health")]
#[get("/health?<apikey>")]
pub async fn database_health(
    apikey: Option<String>,
    provider: &State<ConnectionProvider>,
) -> Result<Json<HealthResponse>, ApiError> {
    provider.validate(apikey.as_deref()).await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
    }))
}
