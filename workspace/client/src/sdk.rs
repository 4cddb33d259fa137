//! Typed per-entity helpers over a [`RecordTransport`].
//!
//! The form core works with raw JSON values; everything else in an
//! application wants the typed records from `common`. These helpers do the
//! (de)serialization at the seam so callers never touch `serde_json::Value`.

use crate::transport::{RecordTransport, TransportError};
use common::{
    EntityKind, ItStaffQuery, ItStaffRecord, SchoolQuery, SchoolRecord, StudentQuery,
    StudentRecord, TeacherQuery, TeacherRecord, UserQuery, UserRecord,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Protocol(e.to_string()))
}

fn encode<T: Serialize>(record: &T) -> Result<Value, TransportError> {
    serde_json::to_value(record).map_err(|e| TransportError::Protocol(e.to_string()))
}

/// An all-`None` query serializes to an empty object; send no filter at all
/// in that case.
fn filter_of<Q: Serialize>(query: &Q) -> Result<Option<Value>, TransportError> {
    let value = encode(query)?;
    match &value {
        Value::Object(fields) if fields.is_empty() => Ok(None),
        _ => Ok(Some(value)),
    }
}

async fn list<T: DeserializeOwned, Q: Serialize>(
    transport: &dyn RecordTransport,
    entity: EntityKind,
    query: &Q,
) -> Result<Vec<T>, TransportError> {
    let filter = filter_of(query)?;
    let candidates = transport.fetch_candidates(entity, filter.as_ref()).await?;
    candidates.into_iter().map(decode).collect()
}

async fn get_by_id<T: DeserializeOwned>(
    transport: &dyn RecordTransport,
    entity: EntityKind,
    id: &str,
) -> Result<T, TransportError> {
    decode(transport.fetch_record(entity, id).await?)
}

async fn create<T: DeserializeOwned, P: Serialize>(
    transport: &dyn RecordTransport,
    entity: EntityKind,
    payload: &P,
) -> Result<T, TransportError> {
    decode(transport.create_record(entity, encode(payload)?).await?)
}

async fn update_by_id<T: DeserializeOwned, P: Serialize>(
    transport: &dyn RecordTransport,
    entity: EntityKind,
    id: &str,
    payload: &P,
) -> Result<T, TransportError> {
    decode(transport.update_record(entity, id, encode(payload)?).await?)
}

pub async fn get_schools(
    transport: &dyn RecordTransport,
    query: &SchoolQuery,
) -> Result<Vec<SchoolRecord>, TransportError> {
    list(transport, EntityKind::School, query).await
}

pub async fn get_school_by_id(
    transport: &dyn RecordTransport,
    id: &str,
) -> Result<SchoolRecord, TransportError> {
    get_by_id(transport, EntityKind::School, id).await
}

pub async fn create_school(
    transport: &dyn RecordTransport,
    school: &SchoolRecord,
) -> Result<SchoolRecord, TransportError> {
    create(transport, EntityKind::School, school).await
}

pub async fn update_school_by_id(
    transport: &dyn RecordTransport,
    id: &str,
    school: &SchoolRecord,
) -> Result<SchoolRecord, TransportError> {
    update_by_id(transport, EntityKind::School, id, school).await
}

pub async fn get_students(
    transport: &dyn RecordTransport,
    query: &StudentQuery,
) -> Result<Vec<StudentRecord>, TransportError> {
    list(transport, EntityKind::Student, query).await
}

pub async fn get_student_by_id(
    transport: &dyn RecordTransport,
    id: &str,
) -> Result<StudentRecord, TransportError> {
    get_by_id(transport, EntityKind::Student, id).await
}

pub async fn create_student(
    transport: &dyn RecordTransport,
    student: &StudentRecord,
) -> Result<StudentRecord, TransportError> {
    create(transport, EntityKind::Student, student).await
}

pub async fn update_student_by_id(
    transport: &dyn RecordTransport,
    id: &str,
    student: &StudentRecord,
) -> Result<StudentRecord, TransportError> {
    update_by_id(transport, EntityKind::Student, id, student).await
}

pub async fn get_teachers(
    transport: &dyn RecordTransport,
    query: &TeacherQuery,
) -> Result<Vec<TeacherRecord>, TransportError> {
    list(transport, EntityKind::Teacher, query).await
}

pub async fn get_teacher_by_id(
    transport: &dyn RecordTransport,
    id: &str,
) -> Result<TeacherRecord, TransportError> {
    get_by_id(transport, EntityKind::Teacher, id).await
}

pub async fn create_teacher(
    transport: &dyn RecordTransport,
    teacher: &TeacherRecord,
) -> Result<TeacherRecord, TransportError> {
    create(transport, EntityKind::Teacher, teacher).await
}

pub async fn update_teacher_by_id(
    transport: &dyn RecordTransport,
    id: &str,
    teacher: &TeacherRecord,
) -> Result<TeacherRecord, TransportError> {
    update_by_id(transport, EntityKind::Teacher, id, teacher).await
}

pub async fn get_it_staff(
    transport: &dyn RecordTransport,
    query: &ItStaffQuery,
) -> Result<Vec<ItStaffRecord>, TransportError> {
    list(transport, EntityKind::ItStaff, query).await
}

pub async fn get_it_staff_by_id(
    transport: &dyn RecordTransport,
    id: &str,
) -> Result<ItStaffRecord, TransportError> {
    get_by_id(transport, EntityKind::ItStaff, id).await
}

pub async fn create_it_staff(
    transport: &dyn RecordTransport,
    it_staff: &ItStaffRecord,
) -> Result<ItStaffRecord, TransportError> {
    create(transport, EntityKind::ItStaff, it_staff).await
}

pub async fn update_it_staff_by_id(
    transport: &dyn RecordTransport,
    id: &str,
    it_staff: &ItStaffRecord,
) -> Result<ItStaffRecord, TransportError> {
    update_by_id(transport, EntityKind::ItStaff, id, it_staff).await
}

pub async fn get_users(
    transport: &dyn RecordTransport,
    query: &UserQuery,
) -> Result<Vec<UserRecord>, TransportError> {
    list(transport, EntityKind::User, query).await
}

pub async fn get_user_by_id(
    transport: &dyn RecordTransport,
    id: &str,
) -> Result<UserRecord, TransportError> {
    get_by_id(transport, EntityKind::User, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn typed_records_round_the_seam() {
        let transport = MockTransport::new();
        transport.put(
            EntityKind::Student,
            "ST1",
            json!({
                "id": "ST1",
                "name": "Marty McFly",
                "attendance": 88,
                "school_id": "S1"
            }),
        );

        let student = get_student_by_id(&transport, "ST1").await.unwrap();
        assert_eq!(student.name, "Marty McFly");
        assert_eq!(student.attendance, Some(88));
        assert_eq!(student.academic_record, None);
    }

    #[tokio::test]
    async fn empty_queries_send_no_filter() {
        let transport = MockTransport::new();
        get_students(&transport, &StudentQuery::default())
            .await
            .unwrap();

        assert!(matches!(
            transport.calls()[0],
            Call::Candidates(EntityKind::Student, None)
        ));
    }

    #[tokio::test]
    async fn populated_queries_become_equality_filters() {
        let transport = MockTransport::new();
        let query = TeacherQuery {
            school_id: Some("S1".to_string()),
            ..Default::default()
        };
        get_teachers(&transport, &query).await.unwrap();

        assert!(transport.calls().iter().any(|c| matches!(
            c,
            Call::Candidates(EntityKind::Teacher, Some(filter)) if filter["school_id"] == "S1"
        )));
    }

    #[tokio::test]
    async fn malformed_records_surface_as_protocol_errors() {
        let transport = MockTransport::new();
        transport.put(EntityKind::User, "U1", json!({ "id": "U1" }));

        let result = get_user_by_id(&transport, "U1").await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }
}
