use crate::helpers::converters::{school_record, student_record, user_record};
use crate::helpers::counts::invalidate_school_counts;
use crate::helpers::scope::ensure_tenant_scope;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::StudentRecord;
use model::entities::{school, student, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating or replacing a student
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct StudentRequest {
    /// Student name
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    /// Attendance record, unconstrained integer
    pub attendance: Option<i64>,
    /// Academic record, unconstrained integer
    pub academic_record: Option<i64>,
    /// Behavior record, unconstrained integer
    pub behavior_record: Option<i64>,
    /// Health record, unconstrained integer
    pub health_record: Option<i64>,
    /// Linked platform user
    pub user_id: Option<String>,
    /// School the student is enrolled at
    pub school_id: Option<String>,
}

/// Equality filters for student list queries
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct StudentListQuery {
    #[validate(length(min = 1, message = "required"))]
    pub id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub school_id: Option<String>,
}

/// Create a new student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "students",
    request_body = StudentRequest,
    responses(
        (status = 201, description = "Student created successfully", body = ApiResponse<StudentRecord>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<StudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StudentRecord>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_student function");
    debug!("Creating student with name: {}", request.name);

    if let Err(validation_errors) = request.validate() {
        warn!("Student payload failed validation: {}", validation_errors);
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

    let new_student = student::ActiveModel {
        name: Set(request.name.clone()),
        attendance: Set(request.attendance),
        academic_record: Set(request.academic_record),
        behavior_record: Set(request.behavior_record),
        health_record: Set(request.health_record),
        user_id: Set(request.user_id.clone()),
        school_id: Set(request.school_id.clone()),
        ..Default::default()
    };

    trace!("Attempting to insert new student into database");
    match new_student.insert(&state.db).await {
        Ok(student_model) => {
            invalidate_school_counts(&state, student_model.school_id.as_deref()).await;
            info!(
                "Student created successfully with ID: {}, name: {}",
                student_model.id, student_model.name
            );
            let response = ApiResponse {
                data: student_record(student_model),
                message: "Student created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create student '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while creating student",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get all students, optionally narrowed by equality filters
#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "students",
    params(StudentListQuery),
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<StudentRecord>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_students(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<StudentListQuery>>,
) -> Result<Json<ApiResponse<Vec<StudentRecord>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_students function");
    debug!("Fetching students with filters: {:?}", query);

    let mut find = student::Entity::find();
    if let Some(id) = &query.id {
        find = find.filter(student::Column::Id.eq(id));
    }
    if let Some(name) = &query.name {
        find = find.filter(student::Column::Name.eq(name));
    }
    if let Some(user_id) = &query.user_id {
        find = find.filter(student::Column::UserId.eq(user_id));
    }
    if let Some(school_id) = &query.school_id {
        find = find.filter(student::Column::SchoolId.eq(school_id));
    }

    match find.all(&state.db).await {
        Ok(students) => {
            let student_count = students.len();
            debug!("Retrieved {} students from database", student_count);

            let records: Vec<StudentRecord> =
                students.into_iter().map(student_record).collect();

            info!("Successfully retrieved {} students", student_count);
            let response = ApiResponse {
                data: records,
                message: "Students retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve students from database: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while listing students",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get a specific student by ID, with linked user and school expanded
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<StudentRecord>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StudentRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_student function for student_id: {}", student_id);

    let student_model = match student::Entity::find_by_id(&student_id).one(&state.db).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            warn!("Student with ID {} not found", student_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Student not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve student with ID {}: {}",
                student_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving student",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let linked_user = match student_model.find_related(user::Entity).one(&state.db).await {
        Ok(user) => user,
        Err(db_error) => {
            error!(
                "Failed to load linked user for student {}: {}",
                student_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving student",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };
    let linked_school = match student_model
        .find_related(school::Entity)
        .one(&state.db)
        .await
    {
        Ok(school) => school,
        Err(db_error) => {
            error!(
                "Failed to load linked school for student {}: {}",
                student_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving student",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    info!("Successfully retrieved student with ID: {}", student_id);
    let mut record = student_record(student_model);
    record.user = linked_user.map(|user| Box::new(user_record(user)));
    record.school = linked_school.map(|school| Box::new(school_record(school)));
    let response = ApiResponse {
        data: record,
        message: "Student retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student ID"),
    ),
    request_body = StudentRequest,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<StudentRecord>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<StudentRequest>,
) -> Result<Json<ApiResponse<StudentRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_student function for student_id: {}", student_id);

    if let Err(validation_errors) = request.validate() {
        warn!("Student payload failed validation: {}", validation_errors);
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

    trace!("Looking up existing student with ID: {}", student_id);
    let existing = match student::Entity::find_by_id(&student_id).one(&state.db).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            warn!("Student with ID {} not found for update", student_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Student not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup student with ID {} for update: {}",
                student_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating student",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    // The record may move between schools; both sides lose their cached
    // counts.
    let previous_school = existing.school_id.clone();

    let mut student_active: student::ActiveModel = existing.into();
    student_active.name = Set(request.name);
    student_active.attendance = Set(request.attendance);
    student_active.academic_record = Set(request.academic_record);
    student_active.behavior_record = Set(request.behavior_record);
    student_active.health_record = Set(request.health_record);
    student_active.user_id = Set(request.user_id);
    student_active.school_id = Set(request.school_id);

    trace!("Attempting to update student in database");
    match student_active.update(&state.db).await {
        Ok(updated_student) => {
            invalidate_school_counts(&state, previous_school.as_deref()).await;
            invalidate_school_counts(&state, updated_student.school_id.as_deref()).await;
            info!("Student with ID {} updated successfully", student_id);
            let response = ApiResponse {
                data: student_record(updated_student),
                message: "Student updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update student with ID {}: {}",
                student_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating student",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_student function for student_id: {}", student_id);
    debug!("Attempting to delete student with ID: {}", student_id);

    // Fetch first so the school whose counts change is known.
    let existing = match student::Entity::find_by_id(&student_id).one(&state.db).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            warn!("Student with ID {} not found for deletion", student_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Student not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup student with ID {} for deletion: {}",
                student_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting student",
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
            info!("Student with ID {} deleted successfully", student_id);
            let response = ApiResponse {
                data: format!("Student {} deleted", student_id),
                message: "Student deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to delete student with ID {}: {}",
                student_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting student",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}
