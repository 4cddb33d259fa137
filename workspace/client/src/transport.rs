//! The opaque CRUD transport the form core talks through.
//!
//! The server, its HTTP client, and its wire format are collaborators, not
//! part of the form core; this trait is the whole contract. Records cross
//! the seam as JSON values because form values are dynamically shaped
//! until they are submitted.

use async_trait::async_trait;
use common::{EntityKind, FieldErrors};
use serde_json::Value;
use thiserror::Error;

/// Failures a transport call can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,
    /// The server rejected the payload; field-keyed messages where the
    /// server provided them.
    #[error("validation rejected")]
    Validation(FieldErrors),
    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),
    /// The request ran past its deadline.
    #[error("request timed out")]
    Timeout,
    /// The server answered with something the client cannot interpret.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Asynchronous CRUD access to one backend, keyed by entity kind.
#[async_trait]
pub trait RecordTransport: Send + Sync {
    /// Fetch a single record by id.
    async fn fetch_record(&self, entity: EntityKind, id: &str) -> Result<Value, TransportError>;

    /// Create a record; the server assigns id and timestamps and returns
    /// the stored record.
    async fn create_record(&self, entity: EntityKind, payload: Value)
    -> Result<Value, TransportError>;

    /// Update a record by id and return the stored record.
    async fn update_record(
        &self,
        entity: EntityKind,
        id: &str,
        payload: Value,
    ) -> Result<Value, TransportError>;

    /// List candidate records, optionally narrowed by an equality filter
    /// (a JSON object whose fields are a subset of the entity's fields).
    async fn fetch_candidates(
        &self,
        entity: EntityKind,
        filter: Option<&Value>,
    ) -> Result<Vec<Value>, TransportError>;
}
