//! In-memory transport double used by the unit tests.

use crate::transport::{RecordTransport, TransportError};
use async_trait::async_trait;
use common::EntityKind;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One observed transport invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(EntityKind, String),
    Create(EntityKind, Value),
    Update(EntityKind, String, Value),
    Candidates(EntityKind, Option<Value>),
}

/// A programmable in-memory backend: stores records per entity, logs every
/// call, and can be told to fail or stall the next operation.
pub struct MockTransport {
    records: Mutex<HashMap<(EntityKind, String), Value>>,
    candidates: Mutex<HashMap<EntityKind, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    fail_fetch: Mutex<Option<TransportError>>,
    fail_submit: Mutex<Option<TransportError>>,
    submit_delay: Mutex<Option<Duration>>,
    next_id: Mutex<u64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            candidates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_fetch: Mutex::new(None),
            fail_submit: Mutex::new(None),
            submit_delay: Mutex::new(None),
            next_id: Mutex::new(0),
        }
    }

    /// Seed a stored record.
    pub fn put(&self, entity: EntityKind, id: &str, record: Value) {
        self.records
            .lock()
            .unwrap()
            .insert((entity, id.to_string()), record);
    }

    /// Read a stored record back.
    pub fn get(&self, entity: EntityKind, id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(entity, id.to_string()))
            .cloned()
    }

    /// Seed the candidate list returned for an entity.
    pub fn set_candidates(&self, entity: EntityKind, candidates: Vec<Value>) {
        self.candidates.lock().unwrap().insert(entity, candidates);
    }

    /// Fail the next `fetch_record` with this error.
    pub fn fail_next_fetch(&self, error: TransportError) {
        *self.fail_fetch.lock().unwrap() = Some(error);
    }

    /// Fail the next create/update with this error.
    pub fn fail_next_submit(&self, error: TransportError) {
        *self.fail_submit.lock().unwrap() = Some(error);
    }

    /// Stall every create/update by this long.
    pub fn delay_submits(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn stall(&self) {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn fresh_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("rec-{next}")
    }
}

#[async_trait]
impl RecordTransport for MockTransport {
    async fn fetch_record(&self, entity: EntityKind, id: &str) -> Result<Value, TransportError> {
        self.record_call(Call::Fetch(entity, id.to_string()));
        if let Some(error) = self.fail_fetch.lock().unwrap().take() {
            return Err(error);
        }
        self.get(entity, id).ok_or(TransportError::NotFound)
    }

    async fn create_record(
        &self,
        entity: EntityKind,
        payload: Value,
    ) -> Result<Value, TransportError> {
        self.record_call(Call::Create(entity, payload.clone()));
        self.stall().await;
        if let Some(error) = self.fail_submit.lock().unwrap().take() {
            return Err(error);
        }
        let mut stored = payload;
        let id = self.fresh_id();
        if let Value::Object(map) = &mut stored {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        self.put(entity, &id, stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        entity: EntityKind,
        id: &str,
        payload: Value,
    ) -> Result<Value, TransportError> {
        self.record_call(Call::Update(entity, id.to_string(), payload.clone()));
        self.stall().await;
        if let Some(error) = self.fail_submit.lock().unwrap().take() {
            return Err(error);
        }
        let existing = self.get(entity, id).ok_or(TransportError::NotFound)?;
        let mut merged = existing;
        if let (Value::Object(target), Value::Object(changes)) = (&mut merged, &payload) {
            for (field, value) in changes {
                target.insert(field.clone(), value.clone());
            }
        }
        self.put(entity, id, merged.clone());
        Ok(merged)
    }

    async fn fetch_candidates(
        &self,
        entity: EntityKind,
        filter: Option<&Value>,
    ) -> Result<Vec<Value>, TransportError> {
        self.record_call(Call::Candidates(entity, filter.cloned()));
        if let Some(candidates) = self.candidates.lock().unwrap().get(&entity) {
            return Ok(candidates.clone());
        }
        // Fall back to the stored records for the entity.
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((kind, _), _)| *kind == entity)
            .map(|(_, record)| record.clone())
            .collect())
    }
}
