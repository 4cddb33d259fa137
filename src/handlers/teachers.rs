use crate::helpers::converters::{school_record, teacher_record, user_record};
use crate::helpers::counts::invalidate_school_counts;
use crate::helpers::scope::ensure_tenant_scope;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::TeacherRecord;
use model::entities::{school, teacher, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating or replacing a teacher
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct TeacherRequest {
    /// Teacher name
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    /// Linked platform user
    pub user_id: Option<String>,
    /// School the teacher works at
    pub school_id: Option<String>,
}

/// Equality filters for teacher list queries
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct TeacherListQuery {
    #[validate(length(min = 1, message = "required"))]
    pub id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub school_id: Option<String>,
}

/// Create a new teacher
#[utoipa::path(
    post,
    path = "/api/v1/teachers",
    tag = "teachers",
    request_body = TeacherRequest,
    responses(
        (status = 201, description = "Teacher created successfully", body = ApiResponse<TeacherRecord>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_teacher(
    State(state): State<AppState>,
    Json(request): Json<TeacherRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeacherRecord>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_teacher function");
    debug!("Creating teacher with name: {}", request.name);

    if let Err(validation_errors) = request.validate() {
        warn!("Teacher payload failed validation: {}", validation_errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::from_validator(&validation_errors)),
        ));
    }
    ensure_tenant_scope(
        &state.db,
        request.user_id.as_deref(),
        request.school_id.as_deref(),
    )
    .await?;

    let new_teacher = teacher::ActiveModel {
        name: Set(request.name.clone()),
        user_id: Set(request.user_id.clone()),
        school_id: Set(request.school_id.clone()),
        ..Default::default()
    };

    trace!("Attempting to insert new teacher into database");
    match new_teacher.insert(&state.db).await {
        Ok(teacher_model) => {
            invalidate_school_counts(&state, teacher_model.school_id.as_deref()).await;
            info!(
                "Teacher created successfully with ID: {}, name: {}",
                teacher_model.id, teacher_model.name
            );
            let response = ApiResponse {
                data: teacher_record(teacher_model),
                message: "Teacher created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create teacher '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while creating teacher",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get all teachers, optionally narrowed by equality filters
#[utoipa::path(
    get,
    path = "/api/v1/teachers",
    tag = "teachers",
    params(TeacherListQuery),
    responses(
        (status = 200, description = "Teachers retrieved successfully", body = ApiResponse<Vec<TeacherRecord>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_teachers(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<TeacherListQuery>>,
) -> Result<Json<ApiResponse<Vec<TeacherRecord>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_teachers function");
    debug!("Fetching teachers with filters: {:?}", query);

    let mut find = teacher::Entity::find();
    if let Some(id) = &query.id {
        find = find.filter(teacher::Column::Id.eq(id));
    }
    if let Some(name) = &query.name {
        find = find.filter(teacher::Column::Name.eq(name));
    }
    if let Some(user_id) = &query.user_id {
        find = find.filter(teacher::Column::UserId.eq(user_id));
    }
    if let Some(school_id) = &query.school_id {
        find = find.filter(teacher::Column::SchoolId.eq(school_id));
    }

    match find.all(&state.db).await {
        Ok(teachers) => {
            let teacher_count = teachers.len();
            debug!("Retrieved {} teachers from database", teacher_count);

            let records: Vec<TeacherRecord> =
                teachers.into_iter().map(teacher_record).collect();

            info!("Successfully retrieved {} teachers", teacher_count);
            let response = ApiResponse {
                data: records,
                message: "Teachers retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve teachers from database: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while listing teachers",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get a specific teacher by ID, with linked user and school expanded
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = String, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Teacher retrieved successfully", body = ApiResponse<TeacherRecord>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_teacher(
    Path(teacher_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TeacherRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_teacher function for teacher_id: {}", teacher_id);

    let teacher_model = match teacher::Entity::find_by_id(&teacher_id).one(&state.db).await {
        Ok(Some(teacher)) => teacher,
        Ok(None) => {
            warn!("Teacher with ID {} not found", teacher_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Teacher not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve teacher with ID {}: {}",
                teacher_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving teacher",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let linked_user = match teacher_model.find_related(user::Entity).one(&state.db).await {
        Ok(user) => user,
        Err(db_error) => {
            error!(
                "Failed to load linked user for teacher {}: {}",
                teacher_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving teacher",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };
    let linked_school = match teacher_model
        .find_related(school::Entity)
        .one(&state.db)
        .await
    {
        Ok(school) => school,
        Err(db_error) => {
            error!(
                "Failed to load linked school for teacher {}: {}",
                teacher_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving teacher",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    info!("Successfully retrieved teacher with ID: {}", teacher_id);
    let mut record = teacher_record(teacher_model);
    record.user = linked_user.map(|user| Box::new(user_record(user)));
    record.school = linked_school.map(|school| Box::new(school_record(school)));
    let response = ApiResponse {
        data: record,
        message: "Teacher retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a teacher
#[utoipa::path(
    put,
    path = "/api/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = String, Path, description = "Teacher ID"),
    ),
    request_body = TeacherRequest,
    responses(
        (status = 200, description = "Teacher updated successfully", body = ApiResponse<TeacherRecord>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_teacher(
    Path(teacher_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<TeacherRequest>,
) -> Result<Json<ApiResponse<TeacherRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_teacher function for teacher_id: {}", teacher_id);

    if let Err(validation_errors) = request.validate() {
        warn!("Teacher payload failed validation: {}", validation_errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::from_validator(&validation_errors)),
        ));
    }
    ensure_tenant_scope(
        &state.db,
        request.user_id.as_deref(),
        request.school_id.as_deref(),
    )
    .await?;

    trace!("Looking up existing teacher with ID: {}", teacher_id);
    let existing = match teacher::Entity::find_by_id(&teacher_id).one(&state.db).await {
        Ok(Some(teacher)) => teacher,
        Ok(None) => {
            warn!("Teacher with ID {} not found for update", teacher_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Teacher not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup teacher with ID {} for update: {}",
                teacher_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating teacher",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let previous_school = existing.school_id.clone();

    let mut teacher_active: teacher::ActiveModel = existing.into();
    teacher_active.name = Set(request.name);
    teacher_active.user_id = Set(request.user_id);
    teacher_active.school_id = Set(request.school_id);

    trace!("Attempting to update teacher in database");
    match teacher_active.update(&state.db).await {
        Ok(updated_teacher) => {
            invalidate_school_counts(&state, previous_school.as_deref()).await;
            invalidate_school_counts(&state, updated_teacher.school_id.as_deref()).await;
            info!("Teacher with ID {} updated successfully", teacher_id);
            let response = ApiResponse {
                data: teacher_record(updated_teacher),
                message: "Teacher updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update teacher with ID {}: {}",
                teacher_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating teacher",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Delete a teacher
#[utoipa::path(
    delete,
    path = "/api/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = String, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Teacher deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_teacher(
    Path(teacher_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_teacher function for teacher_id: {}", teacher_id);
    debug!("Attempting to delete teacher with ID: {}", teacher_id);

    let existing = match teacher::Entity::find_by_id(&teacher_id).one(&state.db).await {
        Ok(Some(teacher)) => teacher,
        Ok(None) => {
            warn!("Teacher with ID {} not found for deletion", teacher_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Teacher not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup teacher with ID {} for deletion: {}",
                teacher_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting teacher",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let school_id = existing.school_id.clone();
    match existing.delete(&state.db).await {
        Ok(delete_result) => {
            debug!(
                "Delete operation completed. Rows affected: {}",
                delete_result.rows_affected
            );
            invalidate_school_counts(&state, school_id.as_deref()).await;
            info!("Teacher with ID {} deleted successfully", teacher_id);
            let response = ApiResponse {
                data: format!("Teacher {} deleted", teacher_id),
                message: "Teacher deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to delete teacher with ID {}: {}",
                teacher_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting teacher",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}
