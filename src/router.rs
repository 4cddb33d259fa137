use crate::handlers::{
    config::get_app_config,
    health::health_check,
    it_staffs::{create_it_staff, delete_it_staff, get_it_staff, get_it_staffs, update_it_staff},
    schools::{create_school, delete_school, get_school, get_schools, update_school},
    students::{create_student, delete_student, get_student, get_students, update_student},
    teachers::{create_teacher, delete_teacher, get_teacher, get_teachers, update_teacher},
    users::{create_user, delete_user, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Application configuration
        .route("/api/v1/config", get(get_app_config))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        // School CRUD routes
        .route("/api/v1/schools", post(create_school))
        .route("/api/v1/schools", get(get_schools))
        .route("/api/v1/schools/:school_id", get(get_school))
        .route("/api/v1/schools/:school_id", put(update_school))
        .route("/api/v1/schools/:school_id", delete(delete_school))
        // Student CRUD routes
        .route("/api/v1/students", post(create_student))
        .route("/api/v1/students", get(get_students))
        .route("/api/v1/students/:student_id", get(get_student))
        .route("/api/v1/students/:student_id", put(update_student))
        .route("/api/v1/students/:student_id", delete(delete_student))
        // Teacher CRUD routes
        .route("/api/v1/teachers", post(create_teacher))
        .route("/api/v1/teachers", get(get_teachers))
        .route("/api/v1/teachers/:teacher_id", get(get_teacher))
        .route("/api/v1/teachers/:teacher_id", put(update_teacher))
        .route("/api/v1/teachers/:teacher_id", delete(delete_teacher))
        // IT staff CRUD routes
        .route("/api/v1/it-staffs", post(create_it_staff))
        .route("/api/v1/it-staffs", get(get_it_staffs))
        .route("/api/v1/it-staffs/:it_staff_id", get(get_it_staff))
        .route("/api/v1/it-staffs/:it_staff_id", put(update_it_staff))
        .route("/api/v1/it-staffs/:it_staff_id", delete(delete_it_staff))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
