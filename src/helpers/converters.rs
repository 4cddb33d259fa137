//! Model-to-wire conversions.
//!
//! Handlers return the shared record types from `common`; these helpers
//! lift database models into them. Relations and counts start out empty
//! and are filled in by the handler that expanded them.

use common::{ItStaffRecord, SchoolRecord, StudentRecord, TeacherRecord, UserRecord};
use model::entities::{it_staff, school, student, teacher, user};

pub fn user_record(model: user::Model) -> UserRecord {
    UserRecord {
        id: Some(model.id),
        email: model.email,
        tenant_id: model.tenant_id,
        created_at: Some(model.created_at),
        updated_at: Some(model.updated_at),
    }
}

pub fn school_record(model: school::Model) -> SchoolRecord {
    SchoolRecord {
        id: Some(model.id),
        name: model.name,
        description: model.description,
        user_id: model.user_id,
        tenant_id: model.tenant_id,
        created_at: Some(model.created_at),
        updated_at: Some(model.updated_at),
        it_staff: None,
        student: None,
        teacher: None,
        user: None,
        count: None,
    }
}

pub fn student_record(model: student::Model) -> StudentRecord {
    StudentRecord {
        id: Some(model.id),
        name: model.name,
        attendance: model.attendance,
        academic_record: model.academic_record,
        behavior_record: model.behavior_record,
        health_record: model.health_record,
        user_id: model.user_id,
        school_id: model.school_id,
        created_at: Some(model.created_at),
        updated_at: Some(model.updated_at),
        user: None,
        school: None,
    }
}

pub fn teacher_record(model: teacher::Model) -> TeacherRecord {
    TeacherRecord {
        id: Some(model.id),
        name: model.name,
        user_id: model.user_id,
        school_id: model.school_id,
        created_at: Some(model.created_at),
        updated_at: Some(model.updated_at),
        user: None,
        school: None,
    }
}

pub fn it_staff_record(model: it_staff::Model) -> ItStaffRecord {
    ItStaffRecord {
        id: Some(model.id),
        name: model.name,
        user_id: model.user_id,
        school_id: model.school_id,
        created_at: Some(model.created_at),
        updated_at: Some(model.updated_at),
        user: None,
        school: None,
    }
}
