//! Shared declarations for the school administration system: entity kinds
//! and their route segments, wire-level record shapes, query filters, the
//! submit-time validation schemas, and the application role configuration.

pub mod app_config;
pub mod kind;
pub mod records;
pub mod validation;

pub use app_config::{app_config, AppConfig};
pub use kind::EntityKind;
pub use records::{
    ItStaffQuery, ItStaffRecord, SchoolCounts, SchoolQuery, SchoolRecord, StudentQuery,
    StudentRecord, TeacherQuery, TeacherRecord, UserQuery, UserRecord,
};
pub use validation::{FieldErrors, FieldRule, ValidationSchema};
