//! The create/edit record form state machine.
//!
//! One `RecordForm` backs one form page for one entity. The UI shell
//! renders the reactive state (`values`, `errors`, `is_submitting`) and
//! calls `initialize`, `set_value`, `submit` and `cancel`. Everything else
//! happens here: defaults, submit-time validation, the at-most-one
//! in-flight submit guard, and navigation on success.

use crate::transport::{RecordTransport, TransportError};
use common::{EntityKind, FieldErrors, FieldRule, ValidationSchema};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Both the edit-mode fetch and the submit call run under this deadline
/// unless the caller picks another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced to the form's UI shell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// Local field validation failed; submission was not attempted.
    #[error("validation failed")]
    Validation(FieldErrors),
    /// The edit-mode load failed; the form is unusable until re-entered.
    #[error("failed to load record: {0}")]
    Fetch(TransportError),
    /// The save failed; the form stays editable with values preserved.
    #[error("failed to save record: {0}")]
    Submit(TransportError),
}

/// Where the shell should route next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
}

/// Foreign keys (or any other fields) pre-filled from route parameters.
///
/// Passed explicitly into `initialize` so the form never reads routing
/// state itself.
#[derive(Debug, Clone, Default)]
pub struct CreateDefaults {
    prefill: Map<String, Value>,
}

impl CreateDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill one field, e.g. a `school_id` carried in the route query.
    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.prefill.insert(name.to_string(), value);
        self
    }
}

/// How a form instance is entered.
#[derive(Debug, Clone)]
pub enum FormMode {
    /// Blank form with defaults (and optional route-derived prefills).
    Create(CreateDefaults),
    /// Load the record with this id for editing.
    Edit(String),
}

/// Lifecycle of a form instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Constructed, not yet initialized.
    Idle,
    /// Edit mode, waiting for (or failed on) the initial fetch.
    Loading,
    /// Populated and editable.
    Ready,
    /// A save is in flight; further submits are ignored.
    Submitting,
}

/// Outcome of a `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    /// The form was not in a submittable state; nothing happened.
    Ignored,
    /// Field validation failed; `errors` holds the messages.
    Invalid(FieldErrors),
    /// The record was saved; navigate to the entity's list view.
    Saved(Navigation),
    /// The transport call failed; values are preserved for a retry.
    Failed(FormError),
}

/// The create/edit page state machine for one entity.
pub struct RecordForm {
    entity: EntityKind,
    schema: ValidationSchema,
    transport: Arc<dyn RecordTransport>,
    fetch_timeout: Duration,
    submit_timeout: Duration,
    phase: FormPhase,
    /// Set in edit mode; routes `submit` to update instead of create.
    record_id: Option<String>,
    values: Map<String, Value>,
    initial_values: Map<String, Value>,
    errors: FieldErrors,
    fetch_error: Option<TransportError>,
    submit_error: Option<TransportError>,
    saved: Option<Value>,
}

impl RecordForm {
    pub fn new(
        entity: EntityKind,
        schema: ValidationSchema,
        transport: Arc<dyn RecordTransport>,
    ) -> Self {
        Self {
            entity,
            schema,
            transport,
            fetch_timeout: DEFAULT_TIMEOUT,
            submit_timeout: DEFAULT_TIMEOUT,
            phase: FormPhase::Idle,
            record_id: None,
            values: Map::new(),
            initial_values: Map::new(),
            errors: FieldErrors::new(),
            fetch_error: None,
            submit_error: None,
            saved: None,
        }
    }

    /// A school form.
    pub fn school(transport: Arc<dyn RecordTransport>) -> Self {
        Self::new(EntityKind::School, ValidationSchema::school(), transport)
    }

    /// A student form.
    pub fn student(transport: Arc<dyn RecordTransport>) -> Self {
        Self::new(EntityKind::Student, ValidationSchema::student(), transport)
    }

    /// A teacher form.
    pub fn teacher(transport: Arc<dyn RecordTransport>) -> Self {
        Self::new(EntityKind::Teacher, ValidationSchema::teacher(), transport)
    }

    /// An IT staff form.
    pub fn it_staff(transport: Arc<dyn RecordTransport>) -> Self {
        Self::new(EntityKind::ItStaff, ValidationSchema::it_staff(), transport)
    }

    /// Override the deadline applied to the edit-mode fetch.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Override the deadline applied to the submit call.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Enter the form. Create mode populates defaults and is immediately
    /// `Ready`; edit mode fetches the record first and stays unusable if
    /// the fetch fails (retry is navigation-driven, never automatic).
    pub async fn initialize(&mut self, mode: FormMode) -> Result<(), FormError> {
        self.errors.clear();
        self.fetch_error = None;
        self.submit_error = None;
        self.saved = None;

        match mode {
            FormMode::Create(defaults) => {
                debug!(entity = %self.entity, "initializing create form");
                self.record_id = None;
                self.initial_values = self.default_values(&defaults);
                self.values = self.initial_values.clone();
                self.phase = FormPhase::Ready;
                Ok(())
            }
            FormMode::Edit(id) => {
                debug!(entity = %self.entity, id, "initializing edit form");
                self.phase = FormPhase::Loading;
                self.record_id = Some(id.clone());
                let fetch = self.transport.fetch_record(self.entity, &id);
                let fetched = match tokio::time::timeout(self.fetch_timeout, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout),
                };
                match fetched {
                    Ok(record) => {
                        self.initial_values = as_object(record);
                        self.values = self.initial_values.clone();
                        self.phase = FormPhase::Ready;
                        Ok(())
                    }
                    Err(e) => {
                        warn!(entity = %self.entity, id, error = %e, "edit-mode fetch failed");
                        self.fetch_error = Some(e.clone());
                        Err(FormError::Fetch(e))
                    }
                }
            }
        }
    }

    /// Write one field. The value is not validated here; validation runs
    /// at submit time only.
    pub fn set_value(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    /// Validate and save. At most one submit is in flight per form: a
    /// second call while `is_submitting` is a no-op, as is any call before
    /// the form is `Ready`.
    pub async fn submit(&mut self) -> SubmitResult {
        match self.phase {
            FormPhase::Submitting => {
                debug!(entity = %self.entity, "submit ignored: already submitting");
                return SubmitResult::Ignored;
            }
            FormPhase::Idle | FormPhase::Loading => {
                debug!(entity = %self.entity, phase = ?self.phase, "submit ignored: form not ready");
                return SubmitResult::Ignored;
            }
            FormPhase::Ready => {}
        }

        self.submit_error = None;
        let candidate = Value::Object(self.values.clone());
        if let Err(errors) = self.schema.validate(&candidate) {
            debug!(entity = %self.entity, fields = errors.len(), "submit blocked by validation");
            self.errors = errors.clone();
            return SubmitResult::Invalid(errors);
        }
        self.errors.clear();

        self.phase = FormPhase::Submitting;
        let call = async {
            match &self.record_id {
                Some(id) => {
                    self.transport
                        .update_record(self.entity, id, candidate.clone())
                        .await
                }
                None => self.transport.create_record(self.entity, candidate.clone()).await,
            }
        };
        let outcome = match tokio::time::timeout(self.submit_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        };

        match outcome {
            Ok(saved) => {
                info!(entity = %self.entity, edit = self.record_id.is_some(), "record saved");
                // Edit mode: the server response replaces the record the
                // page had cached.
                self.saved = Some(saved);
                self.values = self.initial_values.clone();
                self.phase = FormPhase::Ready;
                SubmitResult::Saved(Navigation {
                    path: self.entity.list_path(),
                })
            }
            Err(e) => {
                warn!(entity = %self.entity, error = %e, "submit failed");
                self.submit_error = Some(e.clone());
                self.phase = FormPhase::Ready;
                SubmitResult::Failed(FormError::Submit(e))
            }
        }
    }

    /// Leave the form, discarding unsaved changes. No confirmation prompt.
    pub fn cancel(&self) -> Navigation {
        Navigation {
            path: self.entity.list_path(),
        }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Current field values, as the UI should render them.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Field-keyed validation messages from the last submit attempt.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The edit-mode load failure, if any (page-level banner).
    pub fn fetch_error(&self) -> Option<&TransportError> {
        self.fetch_error.as_ref()
    }

    /// The last submit failure, if any (page-level banner).
    pub fn submit_error(&self) -> Option<&TransportError> {
        self.submit_error.as_ref()
    }

    /// The server's copy of the last record this form saved.
    pub fn saved_record(&self) -> Option<&Value> {
        self.saved.as_ref()
    }

    /// Blank-form values: empty strings for required text, zero for the
    /// optional integer fields, null foreign keys, then any route-derived
    /// prefills overlaid on top.
    fn default_values(&self, defaults: &CreateDefaults) -> Map<String, Value> {
        let mut values = Map::new();
        for (field, rule) in self.schema.rules() {
            let value = match rule {
                FieldRule::RequiredString => Value::String(String::new()),
                FieldRule::OptionalString => Value::Null,
                FieldRule::OptionalInteger => Value::from(0),
            };
            values.insert((*field).to_string(), value);
        }
        for (field, value) in &defaults.prefill {
            values.insert(field.clone(), value.clone());
        }
        values
    }

    #[cfg(test)]
    pub(crate) fn force_submitting(&mut self) {
        self.phase = FormPhase::Submitting;
    }
}

fn as_object(record: Value) -> Map<String, Value> {
    match record {
        Value::Object(map) => map,
        other => {
            // A scalar record body would be a server bug; keep it visible
            // instead of crashing the page.
            warn!("fetched record was not an object: {}", other);
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockTransport};
    use serde_json::json;

    fn student_form(transport: Arc<MockTransport>) -> RecordForm {
        RecordForm::student(transport)
    }

    #[tokio::test]
    async fn create_defaults_match_the_blank_form() {
        let transport = Arc::new(MockTransport::new());
        let mut form = student_form(transport);
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();

        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.values()["name"], json!(""));
        assert_eq!(form.values()["attendance"], json!(0));
        assert_eq!(form.values()["user_id"], Value::Null);
        assert_eq!(form.values()["school_id"], Value::Null);
    }

    #[tokio::test]
    async fn create_initialize_is_idempotent() {
        let transport = Arc::new(MockTransport::new());
        let mut form = student_form(transport);
        let defaults = CreateDefaults::new().field("school_id", json!("S1"));

        form.initialize(FormMode::Create(defaults.clone())).await.unwrap();
        let first = form.values().clone();
        form.initialize(FormMode::Create(defaults)).await.unwrap();

        assert_eq!(&first, form.values());
        assert_eq!(form.values()["school_id"], json!("S1"));
    }

    #[tokio::test]
    async fn scenario_create_student_saves_and_navigates() {
        let transport = Arc::new(MockTransport::new());
        let mut form = student_form(transport.clone());
        form.initialize(FormMode::Create(
            CreateDefaults::new().field("school_id", json!("S1")),
        ))
        .await
        .unwrap();

        form.set_value("name", json!("Ada"));
        form.set_value("attendance", json!(90));

        let result = form.submit().await;
        let SubmitResult::Saved(nav) = result else {
            panic!("expected save, got {result:?}");
        };
        assert_eq!(nav.path, "/students");
        assert!(!form.is_submitting());

        // Exactly one create, carrying the submitted payload.
        let calls = transport.calls();
        let creates: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Create(entity, payload) => Some((entity, payload)),
                _ => None,
            })
            .collect();
        assert_eq!(creates.len(), 1);
        let (entity, payload) = creates[0];
        assert_eq!(*entity, EntityKind::Student);
        assert_eq!(payload["name"], json!("Ada"));
        assert_eq!(payload["attendance"], json!(90));
        assert_eq!(payload["school_id"], json!("S1"));

        // Saved record got a server-assigned id; the form reset to defaults.
        assert!(form.saved_record().unwrap()["id"].is_string());
        assert_eq!(form.values()["name"], json!(""));
    }

    #[tokio::test]
    async fn scenario_invalid_student_never_reaches_the_transport() {
        let transport = Arc::new(MockTransport::new());
        let mut form = student_form(transport.clone());
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();

        // name stays "" from the defaults
        let result = form.submit().await;
        let SubmitResult::Invalid(errors) = result else {
            panic!("expected validation failure, got {result:?}");
        };
        assert_eq!(errors.get("name").map(String::as_str), Some("required"));
        assert_eq!(form.errors().get("name").map(String::as_str), Some("required"));
        assert!(transport.calls().is_empty());
        assert_eq!(form.phase(), FormPhase::Ready);
    }

    #[tokio::test]
    async fn scenario_failed_edit_fetch_blocks_submission() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_next_fetch(TransportError::Network("connection refused".to_string()));

        let mut form = student_form(transport.clone());
        let err = form
            .initialize(FormMode::Edit("42".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::Fetch(TransportError::Network(_))));
        assert!(form.fetch_error().is_some());
        assert!(!form.is_submitting());

        // No submit is possible until the page is re-entered.
        assert_eq!(form.submit().await, SubmitResult::Ignored);
        assert!(
            !transport
                .calls()
                .iter()
                .any(|c| matches!(c, Call::Create(..) | Call::Update(..)))
        );
    }

    #[tokio::test]
    async fn scenario_edit_merges_changes_and_updates_the_cached_record() {
        let transport = Arc::new(MockTransport::new());
        transport.put(
            EntityKind::Student,
            "42",
            json!({
                "id": "42",
                "name": "Marty McFly",
                "attendance": 74,
                "behavior_record": 1,
                "school_id": "S1"
            }),
        );

        let mut form = student_form(transport.clone());
        form.initialize(FormMode::Edit("42".to_string())).await.unwrap();
        assert_eq!(form.values()["name"], json!("Marty McFly"));

        form.set_value("behavior_record", json!(3));
        let result = form.submit().await;
        let SubmitResult::Saved(nav) = result else {
            panic!("expected save, got {result:?}");
        };
        assert_eq!(nav.path, "/students");

        let calls = transport.calls();
        let update = calls
            .iter()
            .find_map(|c| match c {
                Call::Update(_, id, payload) => Some((id.clone(), payload.clone())),
                _ => None,
            })
            .expect("update was invoked");
        assert_eq!(update.0, "42");
        assert_eq!(update.1["behavior_record"], json!(3));
        assert_eq!(update.1["name"], json!("Marty McFly"));

        // The cache now holds the merged server response.
        let stored = transport.get(EntityKind::Student, "42").unwrap();
        assert_eq!(stored["behavior_record"], json!(3));
        assert_eq!(form.saved_record().unwrap()["behavior_record"], json!(3));
    }

    #[tokio::test]
    async fn failed_submit_preserves_values_for_retry() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_next_submit(TransportError::Network("gateway down".to_string()));

        let mut form = student_form(transport.clone());
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();
        form.set_value("name", json!("Ada"));

        let result = form.submit().await;
        assert!(matches!(result, SubmitResult::Failed(FormError::Submit(_))));
        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(form.submit_error().is_some());
        // Values survive for a user-driven retry.
        assert_eq!(form.values()["name"], json!("Ada"));

        // Retry is a fresh user-initiated submit, not automatic.
        let retry = form.submit().await;
        assert!(matches!(retry, SubmitResult::Saved(_)));
        assert!(form.submit_error().is_none());
    }

    #[tokio::test]
    async fn in_flight_submit_ignores_a_second_call() {
        let transport = Arc::new(MockTransport::new());
        let mut form = student_form(transport.clone());
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();
        form.force_submitting();

        assert!(form.is_submitting());
        assert_eq!(form.submit().await, SubmitResult::Ignored);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn uninitialized_form_ignores_submit() {
        let transport = Arc::new(MockTransport::new());
        let mut form = student_form(transport);
        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.submit().await, SubmitResult::Ignored);
    }

    #[tokio::test]
    async fn slow_submit_resolves_as_timeout() {
        let transport = Arc::new(MockTransport::new());
        transport.delay_submits(Duration::from_millis(50));

        let mut form = student_form(transport.clone())
            .with_submit_timeout(Duration::from_millis(5));
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();
        form.set_value("name", json!("Ada"));

        let result = form.submit().await;
        assert!(matches!(
            result,
            SubmitResult::Failed(FormError::Submit(TransportError::Timeout))
        ));
        // The deadline resolves the form instead of wedging it in
        // Submitting forever.
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.values()["name"], json!("Ada"));
    }

    #[tokio::test]
    async fn cancel_navigates_to_the_list_view_unconditionally() {
        let transport = Arc::new(MockTransport::new());
        let mut form = RecordForm::it_staff(transport);
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();
        form.set_value("name", json!("half-typed"));

        assert_eq!(form.cancel().path, "/it-staffs");
    }

    #[tokio::test]
    async fn school_form_requires_owner_and_tenant() {
        let transport = Arc::new(MockTransport::new());
        let mut form = RecordForm::school(transport.clone());
        form.initialize(FormMode::Create(CreateDefaults::new()))
            .await
            .unwrap();
        form.set_value("name", json!("Hill Valley High"));

        let SubmitResult::Invalid(errors) = form.submit().await else {
            panic!("expected validation failure");
        };
        assert!(errors.contains_key("user_id"));
        assert!(errors.contains_key("tenant_id"));

        form.set_value("user_id", json!("U1"));
        form.set_value("tenant_id", json!("T1"));
        assert!(matches!(form.submit().await, SubmitResult::Saved(_)));
    }
}
