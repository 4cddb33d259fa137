//! Referential and tenant-isolation checks shared by the write handlers.

use crate::schemas::ErrorResponse;
use axum::{http::StatusCode, response::Json};
use model::entities::{school, user};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::{debug, error, warn};

type ScopeRejection = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: &str, code: &str) -> ScopeRejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(error, code)),
    )
}

/// Verify the foreign keys of a school-scoped record.
///
/// Each referenced user or school must exist, and when both are set the
/// school must belong to the same tenant as the user. Cross-tenant links
/// are rejected before anything touches the table.
pub async fn ensure_tenant_scope(
    db: &DatabaseConnection,
    user_id: Option<&str>,
    school_id: Option<&str>,
) -> Result<(), ScopeRejection> {
    let user = match user_id {
        Some(user_id) => match user::Entity::find_by_id(user_id).one(db).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!("Referenced user {} does not exist", user_id);
                return Err(bad_request(
                    "Referenced user does not exist",
                    "UNKNOWN_USER",
                ));
            }
            Err(db_error) => {
                error!("Failed to look up user {}: {}", user_id, db_error);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "Internal server error",
                        "DATABASE_ERROR",
                    )),
                ));
            }
        },
        None => None,
    };

    let school = match school_id {
        Some(school_id) => match school::Entity::find_by_id(school_id).one(db).await {
            Ok(Some(school)) => Some(school),
            Ok(None) => {
                warn!("Referenced school {} does not exist", school_id);
                return Err(bad_request(
                    "Referenced school does not exist",
                    "UNKNOWN_SCHOOL",
                ));
            }
            Err(db_error) => {
                error!("Failed to look up school {}: {}", school_id, db_error);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "Internal server error",
                        "DATABASE_ERROR",
                    )),
                ));
            }
        },
        None => None,
    };

    if let (Some(user), Some(school)) = (&user, &school) {
        if user.tenant_id.as_deref() != Some(school.tenant_id.as_str()) {
            warn!(
                "Tenant mismatch: user {} is in {:?}, school {} is in {}",
                user.id, user.tenant_id, school.id, school.tenant_id
            );
            return Err(bad_request(
                "User and school belong to different tenants",
                "TENANT_MISMATCH",
            ));
        }
        debug!(
            "Scope check passed for user {} and school {}",
            user.id, school.id
        );
    }

    Ok(())
}
