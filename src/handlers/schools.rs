use crate::helpers::converters::{school_record, user_record};
use crate::helpers::counts::{invalidate_school_counts, school_counts};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::SchoolRecord;
use model::entities::{school, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating or replacing a school
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct SchoolRequest {
    /// School name
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Owning user
    #[validate(length(min = 1, message = "required"))]
    pub user_id: String,
    /// Tenant the school belongs to
    #[validate(length(min = 1, message = "required"))]
    pub tenant_id: String,
}

/// Equality filters for school list queries
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct SchoolListQuery {
    #[validate(length(min = 1, message = "required"))]
    pub id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// The owning user must exist and live in the tenant the school claims.
async fn check_owner(
    state: &AppState,
    request: &SchoolRequest,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    trace!("Validating school owner: {}", request.user_id);
    let owner = match user::Entity::find_by_id(&request.user_id).one(&state.db).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            warn!("Referenced user {} does not exist", request.user_id);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "Referenced user does not exist",
                    "UNKNOWN_USER",
                )),
            ));
        }
        Err(db_error) => {
            error!("Failed to look up user {}: {}", request.user_id, db_error);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    if owner.tenant_id.as_deref() != Some(request.tenant_id.as_str()) {
        warn!(
            "Tenant mismatch: user {} is in {:?}, school claims {}",
            owner.id, owner.tenant_id, request.tenant_id
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "User and school belong to different tenants",
                "TENANT_MISMATCH",
            )),
        ));
    }
    Ok(())
}

/// Create a new school
#[utoipa::path(
    post,
    path = "/api/v1/schools",
    tag = "schools",
    request_body = SchoolRequest,
    responses(
        (status = 201, description = "School created successfully", body = ApiResponse<SchoolRecord>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_school(
    State(state): State<AppState>,
    Json(request): Json<SchoolRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SchoolRecord>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_school function");
    debug!("Creating school with name: {}", request.name);

    if let Err(validation_errors) = request.validate() {
        warn!("School payload failed validation: {}", validation_errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::from_validator(&validation_errors)),
        ));
    }
    check_owner(&state, &request).await?;

    let new_school = school::ActiveModel {
        name: Set(request.name.clone()),
        description: Set(request.description.clone()),
        user_id: Set(request.user_id.clone()),
        tenant_id: Set(request.tenant_id.clone()),
        ..Default::default()
    };

    trace!("Attempting to insert new school into database");
    match new_school.insert(&state.db).await {
        Ok(school_model) => {
            info!(
                "School created successfully with ID: {}, name: {}",
                school_model.id, school_model.name
            );
            let response = ApiResponse {
                data: school_record(school_model),
                message: "School created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create school '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while creating school",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get all schools, with owner and relation counts attached
#[utoipa::path(
    get,
    path = "/api/v1/schools",
    tag = "schools",
    params(SchoolListQuery),
    responses(
        (status = 200, description = "Schools retrieved successfully", body = ApiResponse<Vec<SchoolRecord>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_schools(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<SchoolListQuery>>,
) -> Result<Json<ApiResponse<Vec<SchoolRecord>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_schools function");
    debug!("Fetching schools with filters: {:?}", query);

    let mut find = school::Entity::find();
    if let Some(id) = &query.id {
        find = find.filter(school::Column::Id.eq(id));
    }
    if let Some(name) = &query.name {
        find = find.filter(school::Column::Name.eq(name));
    }
    if let Some(user_id) = &query.user_id {
        find = find.filter(school::Column::UserId.eq(user_id));
    }
    if let Some(tenant_id) = &query.tenant_id {
        find = find.filter(school::Column::TenantId.eq(tenant_id));
    }

    let schools = match find.find_also_related(user::Entity).all(&state.db).await {
        Ok(schools) => schools,
        Err(db_error) => {
            error!("Failed to retrieve schools from database: {}", db_error);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while listing schools",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let school_count = schools.len();
    debug!("Retrieved {} schools from database", school_count);

    let mut records = Vec::with_capacity(school_count);
    for (school_model, owner) in schools {
        let counts = match school_counts(&state, &school_model.id).await {
            Ok(counts) => counts,
            Err(db_error) => {
                error!(
                    "Failed to count relations for school {}: {}",
                    school_model.id, db_error
                );
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "Internal server error while listing schools",
                        "DATABASE_ERROR",
                    )),
                ));
            }
        };
        let mut record = school_record(school_model);
        record.user = owner.map(|owner| Box::new(user_record(owner)));
        record.count = Some(counts);
        records.push(record);
    }

    info!("Successfully retrieved {} schools", school_count);
    let response = ApiResponse {
        data: records,
        message: "Schools retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific school by ID
#[utoipa::path(
    get,
    path = "/api/v1/schools/{school_id}",
    tag = "schools",
    params(
        ("school_id" = String, Path, description = "School ID"),
    ),
    responses(
        (status = 200, description = "School retrieved successfully", body = ApiResponse<SchoolRecord>),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_school(
    Path(school_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SchoolRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_school function for school_id: {}", school_id);

    let found = school::Entity::find_by_id(&school_id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await;
    match found {
        Ok(Some((school_model, owner))) => {
            let counts = match school_counts(&state, &school_model.id).await {
                Ok(counts) => counts,
                Err(db_error) => {
                    error!(
                        "Failed to count relations for school {}: {}",
                        school_model.id, db_error
                    );
                    return Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse::new(
                            "Internal server error while retrieving school",
                            "DATABASE_ERROR",
                        )),
                    ));
                }
            };
            info!("Successfully retrieved school with ID: {}", school_id);
            let mut record = school_record(school_model);
            record.user = owner.map(|owner| Box::new(user_record(owner)));
            record.count = Some(counts);
            let response = ApiResponse {
                data: record,
                message: "School retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("School with ID {} not found", school_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("School not found", "NOT_FOUND")),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve school with ID {}: {}",
                school_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving school",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Update a school
#[utoipa::path(
    put,
    path = "/api/v1/schools/{school_id}",
    tag = "schools",
    params(
        ("school_id" = String, Path, description = "School ID"),
    ),
    request_body = SchoolRequest,
    responses(
        (status = 200, description = "School updated successfully", body = ApiResponse<SchoolRecord>),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_school(
    Path(school_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SchoolRequest>,
) -> Result<Json<ApiResponse<SchoolRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_school function for school_id: {}", school_id);

    if let Err(validation_errors) = request.validate() {
        warn!("School payload failed validation: {}", validation_errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::from_validator(&validation_errors)),
        ));
    }
    check_owner(&state, &request).await?;

    trace!("Looking up existing school with ID: {}", school_id);
    let existing = match school::Entity::find_by_id(&school_id).one(&state.db).await {
        Ok(Some(school)) => school,
        Ok(None) => {
            warn!("School with ID {} not found for update", school_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("School not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup school with ID {} for update: {}",
                school_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating school",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let mut school_active: school::ActiveModel = existing.into();
    school_active.name = Set(request.name);
    school_active.description = Set(request.description);
    school_active.user_id = Set(request.user_id);
    school_active.tenant_id = Set(request.tenant_id);

    trace!("Attempting to update school in database");
    match school_active.update(&state.db).await {
        Ok(updated_school) => {
            info!("School with ID {} updated successfully", school_id);
            let response = ApiResponse {
                data: school_record(updated_school),
                message: "School updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update school with ID {}: {}",
                school_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating school",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Delete a school
#[utoipa::path(
    delete,
    path = "/api/v1/schools/{school_id}",
    tag = "schools",
    params(
        ("school_id" = String, Path, description = "School ID"),
    ),
    responses(
        (status = 200, description = "School deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_school(
    Path(school_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_school function for school_id: {}", school_id);
    debug!("Attempting to delete school with ID: {}", school_id);

    match school::Entity::delete_by_id(&school_id).exec(&state.db).await {
        Ok(delete_result) => {
            debug!(
                "Delete operation completed. Rows affected: {}",
                delete_result.rows_affected
            );
            if delete_result.rows_affected > 0 {
                invalidate_school_counts(&state, Some(&school_id)).await;
                info!("School with ID {} deleted successfully", school_id);
                let response = ApiResponse {
                    data: format!("School {} deleted", school_id),
                    message: "School deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("School with ID {} not found for deletion", school_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new("School not found", "NOT_FOUND")),
                ))
            }
        }
        Err(db_error) => {
            error!(
                "Failed to delete school with ID {}: {}",
                school_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting school",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}
