use crate::schemas::ApiResponse;
use axum::response::Json;
use common::{app_config, AppConfig};
use tracing::instrument;

/// Get the application role and tenancy configuration
#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Application configuration retrieved successfully", body = ApiResponse<AppConfig>)
    )
)]
#[instrument]
pub async fn get_app_config() -> Json<ApiResponse<AppConfig>> {
    let response = ApiResponse {
        data: app_config(),
        message: "Application configuration retrieved successfully".to_string(),
        success: true,
    };
    Json(response)
}
