use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role and tenancy configuration for the application shell.
///
/// Mirrors the generated application descriptor: which roles own the
/// platform, which belong to a tenant, and which are customers of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppConfig {
    pub owner_roles: Vec<String>,
    pub customer_roles: Vec<String>,
    pub tenant_roles: Vec<String>,
    /// Display name of the tenant entity.
    pub tenant_name: String,
    pub application_name: String,
    pub add_ons: Vec<String>,
}

/// The configuration for this deployment.
pub fn app_config() -> AppConfig {
    AppConfig {
        owner_roles: vec!["School Administrator".to_string()],
        customer_roles: vec!["Student".to_string()],
        tenant_roles: vec![
            "School Administrator".to_string(),
            "Teacher".to_string(),
            "IT Staff".to_string(),
        ],
        tenant_name: "School".to_string(),
        application_name: "school".to_string(),
        add_ons: vec![
            "file upload".to_string(),
            "chat".to_string(),
            "notifications".to_string(),
            "file".to_string(),
        ],
    }
}
