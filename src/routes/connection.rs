use crate::connection::ConnectionProvider;
use crate::error::ApiError;
use crate::models::{ApiResponse, ConnectionStatus};
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Resolve the tenant connection for `apikey` and check it answers.
#[openapi(tag = "CMWeb")]
#[post("/cmweb/connection/validate?<apikey>")]
pub async fn validate_connection(
    apikey: Option<String>,
    provider: &State<ConnectionProvider>,
) -> Result<Json<ApiResponse<ConnectionStatus>>, ApiError> {
    let apikey = apikey.filter(|key| !key.trim().is_empty());
    provider.validate(apikey.as_deref()).await?;

    let source = if apikey.is_some() { "api_key" } else { "default" };
    Ok(Json(ApiResponse::new(ConnectionStatus {
        status: "connected".to_string(),
        source: source.to_string(),
    })))
}
