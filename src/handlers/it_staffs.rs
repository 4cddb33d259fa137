use crate::helpers::converters::{it_staff_record, school_record, user_record};
use crate::helpers::counts::invalidate_school_counts;
use crate::helpers::scope::ensure_tenant_scope;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::ItStaffRecord;
use model::entities::{it_staff, school, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating or replacing an IT staff member
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ItStaffRequest {
    /// Staff member name
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    /// Linked platform user
    pub user_id: Option<String>,
    /// School the staff member works at
    pub school_id: Option<String>,
}

/// Equality filters for IT staff list queries
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ItStaffListQuery {
    #[validate(length(min = 1, message = "required"))]
    pub id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub school_id: Option<String>,
}

/// Create a new IT staff member
#[utoipa::path(
    post,
    path = "/api/v1/it-staffs",
    tag = "it-staffs",
    request_body = ItStaffRequest,
    responses(
        (status = 201, description = "IT staff member created successfully", body = ApiResponse<ItStaffRecord>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_it_staff(
    State(state): State<AppState>,
    Json(request): Json<ItStaffRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ItStaffRecord>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_it_staff function");
    debug!("Creating IT staff member with name: {}", request.name);

    if let Err(validation_errors) = request.validate() {
        warn!("IT staff payload failed validation: {}", validation_errors);
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

    let new_it_staff = it_staff::ActiveModel {
        name: Set(request.name.clone()),
        user_id: Set(request.user_id.clone()),
        school_id: Set(request.school_id.clone()),
        ..Default::default()
    };

    trace!("Attempting to insert new IT staff member into database");
    match new_it_staff.insert(&state.db).await {
        Ok(it_staff_model) => {
            invalidate_school_counts(&state, it_staff_model.school_id.as_deref()).await;
            info!(
                "IT staff member created successfully with ID: {}, name: {}",
                it_staff_model.id, it_staff_model.name
            );
            let response = ApiResponse {
                data: it_staff_record(it_staff_model),
                message: "IT staff member created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to create IT staff member '{}': {}",
                request.name, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while creating IT staff member",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get all IT staff members, optionally narrowed by equality filters
#[utoipa::path(
    get,
    path = "/api/v1/it-staffs",
    tag = "it-staffs",
    params(ItStaffListQuery),
    responses(
        (status = 200, description = "IT staff retrieved successfully", body = ApiResponse<Vec<ItStaffRecord>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_it_staffs(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ItStaffListQuery>>,
) -> Result<Json<ApiResponse<Vec<ItStaffRecord>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_it_staffs function");
    debug!("Fetching IT staff with filters: {:?}", query);

    let mut find = it_staff::Entity::find();
    if let Some(id) = &query.id {
        find = find.filter(it_staff::Column::Id.eq(id));
    }
    if let Some(name) = &query.name {
        find = find.filter(it_staff::Column::Name.eq(name));
    }
    if let Some(user_id) = &query.user_id {
        find = find.filter(it_staff::Column::UserId.eq(user_id));
    }
    if let Some(school_id) = &query.school_id {
        find = find.filter(it_staff::Column::SchoolId.eq(school_id));
    }

    match find.all(&state.db).await {
        Ok(members) => {
            let member_count = members.len();
            debug!("Retrieved {} IT staff members from database", member_count);

            let records: Vec<ItStaffRecord> =
                members.into_iter().map(it_staff_record).collect();

            info!("Successfully retrieved {} IT staff members", member_count);
            let response = ApiResponse {
                data: records,
                message: "IT staff retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve IT staff from database: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while listing IT staff",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Get a specific IT staff member by ID, with linked user and school expanded
#[utoipa::path(
    get,
    path = "/api/v1/it-staffs/{it_staff_id}",
    tag = "it-staffs",
    params(
        ("it_staff_id" = String, Path, description = "IT staff member ID"),
    ),
    responses(
        (status = 200, description = "IT staff member retrieved successfully", body = ApiResponse<ItStaffRecord>),
        (status = 404, description = "IT staff member not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_it_staff(
    Path(it_staff_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ItStaffRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_it_staff function for it_staff_id: {}", it_staff_id);

    let it_staff_model = match it_staff::Entity::find_by_id(&it_staff_id).one(&state.db).await {
        Ok(Some(member)) => member,
        Ok(None) => {
            warn!("IT staff member with ID {} not found", it_staff_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("IT staff member not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve IT staff member with ID {}: {}",
                it_staff_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving IT staff member",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let linked_user = match it_staff_model
        .find_related(user::Entity)
        .one(&state.db)
        .await
    {
        Ok(user) => user,
        Err(db_error) => {
            error!(
                "Failed to load linked user for IT staff member {}: {}",
                it_staff_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving IT staff member",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };
    let linked_school = match it_staff_model
        .find_related(school::Entity)
        .one(&state.db)
        .await
    {
        Ok(school) => school,
        Err(db_error) => {
            error!(
                "Failed to load linked school for IT staff member {}: {}",
                it_staff_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while retrieving IT staff member",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    info!("Successfully retrieved IT staff member with ID: {}", it_staff_id);
    let mut record = it_staff_record(it_staff_model);
    record.user = linked_user.map(|user| Box::new(user_record(user)));
    record.school = linked_school.map(|school| Box::new(school_record(school)));
    let response = ApiResponse {
        data: record,
        message: "IT staff member retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update an IT staff member
#[utoipa::path(
    put,
    path = "/api/v1/it-staffs/{it_staff_id}",
    tag = "it-staffs",
    params(
        ("it_staff_id" = String, Path, description = "IT staff member ID"),
    ),
    request_body = ItStaffRequest,
    responses(
        (status = 200, description = "IT staff member updated successfully", body = ApiResponse<ItStaffRecord>),
        (status = 404, description = "IT staff member not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_it_staff(
    Path(it_staff_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<ItStaffRequest>,
) -> Result<Json<ApiResponse<ItStaffRecord>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_it_staff function for it_staff_id: {}", it_staff_id);

    if let Err(validation_errors) = request.validate() {
        warn!("IT staff payload failed validation: {}", validation_errors);
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

    trace!("Looking up existing IT staff member with ID: {}", it_staff_id);
    let existing = match it_staff::Entity::find_by_id(&it_staff_id).one(&state.db).await {
        Ok(Some(member)) => member,
        Ok(None) => {
            warn!("IT staff member with ID {} not found for update", it_staff_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("IT staff member not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup IT staff member with ID {} for update: {}",
                it_staff_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating IT staff member",
                    "DATABASE_ERROR",
                )),
            ));
        }
    };

    let previous_school = existing.school_id.clone();

    let mut it_staff_active: it_staff::ActiveModel = existing.into();
    it_staff_active.name = Set(request.name);
    it_staff_active.user_id = Set(request.user_id);
    it_staff_active.school_id = Set(request.school_id);

    trace!("Attempting to update IT staff member in database");
    match it_staff_active.update(&state.db).await {
        Ok(updated_member) => {
            invalidate_school_counts(&state, previous_school.as_deref()).await;
            invalidate_school_counts(&state, updated_member.school_id.as_deref()).await;
            info!("IT staff member with ID {} updated successfully", it_staff_id);
            let response = ApiResponse {
                data: it_staff_record(updated_member),
                message: "IT staff member updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update IT staff member with ID {}: {}",
                it_staff_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while updating IT staff member",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}

/// Delete an IT staff member
#[utoipa::path(
    delete,
    path = "/api/v1/it-staffs/{it_staff_id}",
    tag = "it-staffs",
    params(
        ("it_staff_id" = String, Path, description = "IT staff member ID"),
    ),
    responses(
        (status = 200, description = "IT staff member deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "IT staff member not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_it_staff(
    Path(it_staff_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_it_staff function for it_staff_id: {}", it_staff_id);
    debug!("Attempting to delete IT staff member with ID: {}", it_staff_id);

    let existing = match it_staff::Entity::find_by_id(&it_staff_id).one(&state.db).await {
        Ok(Some(member)) => member,
        Ok(None) => {
            warn!("IT staff member with ID {} not found for deletion", it_staff_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("IT staff member not found", "NOT_FOUND")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup IT staff member with ID {} for deletion: {}",
                it_staff_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting IT staff member",
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
            info!("IT staff member with ID {} deleted successfully", it_staff_id);
            let response = ApiResponse {
                data: format!("IT staff member {} deleted", it_staff_id),
                message: "IT staff member deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to delete IT staff member with ID {}: {}",
                it_staff_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Internal server error while deleting IT staff member",
                    "DATABASE_ERROR",
                )),
            ))
        }
    }
}
