//! Submit-time validation schemas for candidate records.
//!
//! Form values are dynamically shaped JSON (the form layer assembles them
//! field by field before any typed record exists), so the rules here run
//! against `serde_json::Value`. Validation happens once, at submit time;
//! the form layer deliberately does not validate per keystroke or on blur.
//! Typed server request bodies use the `validator` derive instead.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

/// Field-keyed validation error messages.
pub type FieldErrors = BTreeMap<String, String>;

/// A single declarative field constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// A string that must be present and non-empty.
    RequiredString,
    /// A string that may be absent or null.
    OptionalString,
    /// An integer that may be absent or null, but if supplied must not be
    /// fractional or non-numeric. Sign is not constrained.
    OptionalInteger,
}

impl FieldRule {
    fn check(&self, value: Option<&Value>) -> Option<&'static str> {
        match self {
            FieldRule::RequiredString => match value {
                Some(Value::String(s)) if !s.is_empty() => None,
                Some(Value::String(_)) | Some(Value::Null) | None => Some("required"),
                Some(_) => Some("must be a string"),
            },
            FieldRule::OptionalString => match value {
                None | Some(Value::Null) | Some(Value::String(_)) => None,
                Some(_) => Some("must be a string"),
            },
            FieldRule::OptionalInteger => match value {
                None | Some(Value::Null) => None,
                Some(Value::Number(n)) if n.is_i64() || n.is_u64() => None,
                Some(_) => Some("must be an integer"),
            },
        }
    }
}

/// An ordered set of field rules for one entity.
#[derive(Debug, Clone)]
pub struct ValidationSchema {
    rules: Vec<(&'static str, FieldRule)>,
}

impl ValidationSchema {
    pub fn new(rules: Vec<(&'static str, FieldRule)>) -> Self {
        Self { rules }
    }

    /// Rules for school records: `name` plus the owning user and tenant are
    /// mandatory, the description is free-form.
    pub fn school() -> Self {
        Self::new(vec![
            ("name", FieldRule::RequiredString),
            ("description", FieldRule::OptionalString),
            ("user_id", FieldRule::RequiredString),
            ("tenant_id", FieldRule::RequiredString),
        ])
    }

    /// Rules for student records. Foreign-key existence is deferred to the
    /// server; this layer only checks shape.
    pub fn student() -> Self {
        Self::new(vec![
            ("name", FieldRule::RequiredString),
            ("attendance", FieldRule::OptionalInteger),
            ("academic_record", FieldRule::OptionalInteger),
            ("behavior_record", FieldRule::OptionalInteger),
            ("health_record", FieldRule::OptionalInteger),
            ("user_id", FieldRule::OptionalString),
            ("school_id", FieldRule::OptionalString),
        ])
    }

    /// Rules for teacher records.
    pub fn teacher() -> Self {
        Self::new(vec![
            ("name", FieldRule::RequiredString),
            ("user_id", FieldRule::OptionalString),
            ("school_id", FieldRule::OptionalString),
        ])
    }

    /// Rules for IT staff records.
    pub fn it_staff() -> Self {
        Self::new(vec![
            ("name", FieldRule::RequiredString),
            ("user_id", FieldRule::OptionalString),
            ("school_id", FieldRule::OptionalString),
        ])
    }

    /// The declared fields and their rules, in schema order.
    pub fn rules(&self) -> &[(&'static str, FieldRule)] {
        &self.rules
    }

    /// Validate a candidate record. Returns a field-keyed error map on
    /// failure; an empty `Ok` means the record may be submitted.
    pub fn validate(&self, record: &Value) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, rule) in &self.rules {
            if let Some(message) = rule.check(record.get(*field)) {
                trace!(field, message, "field rule failed");
                errors.insert((*field).to_string(), message.to_string());
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
