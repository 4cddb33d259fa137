use common::{
    AppConfig, FieldErrors, ItStaffRecord, SchoolCounts, SchoolRecord, StudentRecord,
    TeacherRecord, UserRecord,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Counts(SchoolCounts),
}

/// API response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Field-keyed messages, present when a payload was rejected field by
    /// field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
            errors: None,
        }
    }

    pub fn with_fields(errors: FieldErrors) -> Self {
        Self {
            error: "Request payload failed validation".to_string(),
            code: "VALIDATION_ERROR".to_string(),
            success: false,
            errors: Some(errors),
        }
    }

    /// Flatten `validator` output to one message per field.
    pub fn from_validator(errors: &validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .collect();
        Self::with_fields(fields)
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::config::get_app_config,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::schools::create_school,
        crate::handlers::schools::get_schools,
        crate::handlers::schools::get_school,
        crate::handlers::schools::update_school,
        crate::handlers::schools::delete_school,
        crate::handlers::students::create_student,
        crate::handlers::students::get_students,
        crate::handlers::students::get_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::teachers::create_teacher,
        crate::handlers::teachers::get_teachers,
        crate::handlers::teachers::get_teacher,
        crate::handlers::teachers::update_teacher,
        crate::handlers::teachers::delete_teacher,
        crate::handlers::it_staffs::create_it_staff,
        crate::handlers::it_staffs::get_it_staffs,
        crate::handlers::it_staffs::get_it_staff,
        crate::handlers::it_staffs::update_it_staff,
        crate::handlers::it_staffs::delete_it_staff,
    ),
    components(
        schemas(
            ApiResponse<UserRecord>,
            ApiResponse<SchoolRecord>,
            ApiResponse<StudentRecord>,
            ApiResponse<TeacherRecord>,
            ApiResponse<ItStaffRecord>,
            ApiResponse<Vec<UserRecord>>,
            ApiResponse<Vec<SchoolRecord>>,
            ApiResponse<Vec<StudentRecord>>,
            ApiResponse<Vec<TeacherRecord>>,
            ApiResponse<Vec<ItStaffRecord>>,
            ApiResponse<AppConfig>,
            ErrorResponse,
            HealthResponse,
            AppConfig,
            UserRecord,
            SchoolRecord,
            SchoolCounts,
            StudentRecord,
            TeacherRecord,
            ItStaffRecord,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "config", description = "Application configuration endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "schools", description = "School management endpoints"),
        (name = "students", description = "Student management endpoints"),
        (name = "teachers", description = "Teacher management endpoints"),
        (name = "it-staffs", description = "IT staff management endpoints"),
    ),
    info(
        title = "School Administration API",
        description = "Multi-tenant school administration backend covering schools, students, teachers and IT staff",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
