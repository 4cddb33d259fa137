//! The relation picker: the async lookup behind every foreign-key select.
//!
//! One parametrized component covers all of them: pick the entity, the
//! field to display, and optionally an equality filter. Candidates are
//! fetched fresh every time a form mounts; nothing is cached across forms.

use crate::form::RecordForm;
use crate::transport::{RecordTransport, TransportError};
use common::EntityKind;
use serde_json::Value;
use tracing::debug;

/// One selectable candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    /// The candidate record's id, written into the foreign-key field on
    /// selection.
    pub id: String,
    /// Human-readable label taken from the display field.
    pub label: String,
}

impl PickerOption {
    /// Apply this selection: write the candidate id into the form's
    /// foreign-key field.
    pub fn select_into(&self, form: &mut RecordForm, field: &str) {
        form.set_value(field, Value::String(self.id.clone()));
    }
}

/// A parametrized foreign-key picker.
#[derive(Debug, Clone)]
pub struct RelationPicker {
    pub entity: EntityKind,
    pub display_field: &'static str,
    pub filter: Option<Value>,
}

impl RelationPicker {
    pub fn new(entity: EntityKind, display_field: &'static str) -> Self {
        Self {
            entity,
            display_field,
            filter: None,
        }
    }

    /// Picker over platform users, labelled by email.
    pub fn users() -> Self {
        Self::new(EntityKind::User, "email")
    }

    /// Picker over schools, labelled by name.
    pub fn schools() -> Self {
        Self::new(EntityKind::School, "name")
    }

    /// Narrow the candidate list with an equality filter.
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Fetch the candidate list and map it to options. Candidates without
    /// an id cannot be selected and are dropped.
    pub async fn load(
        &self,
        transport: &dyn RecordTransport,
    ) -> Result<Vec<PickerOption>, TransportError> {
        let candidates = transport
            .fetch_candidates(self.entity, self.filter.as_ref())
            .await?;
        debug!(entity = %self.entity, count = candidates.len(), "loaded picker candidates");

        Ok(candidates
            .iter()
            .filter_map(|candidate| {
                let id = candidate.get("id")?.as_str()?.to_string();
                let label = match candidate.get(self.display_field) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) if !other.is_null() => other.to_string(),
                    _ => id.clone(),
                };
                Some(PickerOption { id, label })
            })
            .collect())
    }
}
