//! Cached per-school relation counts.
//!
//! School list and detail views attach a `_count` block with the number of
//! students, teachers and IT staff. Counting three tables per school on
//! every list render is the expensive part, so the result is cached and
//! invalidated whenever a scoped record is written.

use crate::schemas::{AppState, CachedData};
use common::SchoolCounts;
use model::entities::{it_staff, student, teacher};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::{debug, trace};

fn cache_key(school_id: &str) -> String {
    format!("school_counts_{school_id}")
}

/// Relation counts for one school, from cache when fresh.
pub async fn school_counts(state: &AppState, school_id: &str) -> Result<SchoolCounts, DbErr> {
    let key = cache_key(school_id);
    if let Some(CachedData::Counts(counts)) = state.cache.get(&key).await {
        trace!("Counts for school {} served from cache", school_id);
        return Ok(counts);
    }

    let student = student::Entity::find()
        .filter(student::Column::SchoolId.eq(school_id))
        .count(&state.db)
        .await?;
    let teacher = teacher::Entity::find()
        .filter(teacher::Column::SchoolId.eq(school_id))
        .count(&state.db)
        .await?;
    let it_staff = it_staff::Entity::find()
        .filter(it_staff::Column::SchoolId.eq(school_id))
        .count(&state.db)
        .await?;

    let counts = SchoolCounts {
        it_staff: Some(it_staff),
        student: Some(student),
        teacher: Some(teacher),
    };
    debug!(
        "Counted school {}: {} students, {} teachers, {} IT staff",
        school_id, student, teacher, it_staff
    );
    state
        .cache
        .insert(key, CachedData::Counts(counts.clone()))
        .await;
    Ok(counts)
}

/// Drop the cached counts for a school after one of its scoped records
/// changed. A `None` school id is a record without a school; nothing to
/// invalidate.
pub async fn invalidate_school_counts(state: &AppState, school_id: Option<&str>) {
    if let Some(school_id) = school_id {
        trace!("Invalidating cached counts for school {}", school_id);
        state.cache.invalidate(&cache_key(school_id)).await;
    }
}
