//! REST implementation of [`RecordTransport`].
//!
//! Speaks the server's JSON envelope (`data`/`message`/`success`, with
//! `error`/`code` on failures) over `/api/v1/{route}` endpoints, using the
//! plural hyphenated route segment of each entity.

use crate::transport::{RecordTransport, TransportError};
use async_trait::async_trait;
use common::{EntityKind, FieldErrors};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
    #[allow(dead_code)]
    message: String,
    #[allow(dead_code)]
    success: bool,
}

/// Failure body: always `error`/`code`, plus field-keyed `errors` when the
/// server rejected a payload field by field.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[allow(dead_code)]
    code: Option<String>,
    errors: Option<FieldErrors>,
}

/// A `RecordTransport` over HTTP.
#[derive(Debug, Clone)]
pub struct RestTransport {
    base_url: String,
    http: reqwest::Client,
}

impl RestTransport {
    /// Transport against `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Transport with a client-level request deadline, for callers that
    /// use the SDK helpers directly rather than going through a form.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    fn collection_url(&self, entity: EntityKind) -> String {
        format!("{}/api/v1/{}", self.base_url, entity.route())
    }

    fn record_url(&self, entity: EntityKind, id: &str) -> String {
        format!("{}/api/v1/{}/{}", self.base_url, entity.route(), id)
    }

    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if status.is_success() {
            let envelope: ApiEnvelope<T> = response
                .json()
                .await
                .map_err(|e| TransportError::Protocol(e.to_string()))?;
            return Ok(envelope.data);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound);
        }

        let body: Result<ErrorBody, _> = response.json().await;
        match body {
            Ok(body) if status.is_client_error() => {
                let mut errors = body.errors.unwrap_or_default();
                if errors.is_empty() {
                    errors.insert(
                        "_".to_string(),
                        body.error.unwrap_or_else(|| status.to_string()),
                    );
                }
                error!(%status, ?errors, "server rejected the request");
                Err(TransportError::Validation(errors))
            }
            Ok(body) => Err(TransportError::Network(
                body.error.unwrap_or_else(|| status.to_string()),
            )),
            Err(_) => Err(TransportError::Network(status.to_string())),
        }
    }

    fn send_error(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Flatten an equality-filter object into query parameters. Null fields
/// are dropped; scalars are stringified.
fn filter_params(filter: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = filter else {
        return Vec::new();
    };
    fields
        .iter()
        .filter_map(|(field, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((field.clone(), s.clone())),
            other => Some((field.clone(), other.to_string())),
        })
        .collect()
}

#[async_trait]
impl RecordTransport for RestTransport {
    async fn fetch_record(&self, entity: EntityKind, id: &str) -> Result<Value, TransportError> {
        let url = self.record_url(entity, id);
        debug!(%url, "GET record");
        let response = self.http.get(&url).send().await.map_err(Self::send_error)?;
        Self::read(response).await
    }

    async fn create_record(
        &self,
        entity: EntityKind,
        payload: Value,
    ) -> Result<Value, TransportError> {
        let url = self.collection_url(entity);
        debug!(%url, "POST record");
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::read(response).await
    }

    async fn update_record(
        &self,
        entity: EntityKind,
        id: &str,
        payload: Value,
    ) -> Result<Value, TransportError> {
        let url = self.record_url(entity, id);
        debug!(%url, "PUT record");
        let response = self
            .http
            .put(&url)
            .json(&payload)
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::read(response).await
    }

    async fn fetch_candidates(
        &self,
        entity: EntityKind,
        filter: Option<&Value>,
    ) -> Result<Vec<Value>, TransportError> {
        let url = self.collection_url(entity);
        debug!(%url, "GET candidates");
        let mut request = self.http.get(&url);
        if let Some(filter) = filter {
            request = request.query(&filter_params(filter));
        }
        let response = request.send().await.map_err(Self::send_error)?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls_use_the_route_segment() {
        let transport = RestTransport::new("http://localhost:3000");
        assert_eq!(
            transport.collection_url(EntityKind::ItStaff),
            "http://localhost:3000/api/v1/it-staffs"
        );
        assert_eq!(
            transport.record_url(EntityKind::Student, "42"),
            "http://localhost:3000/api/v1/students/42"
        );
    }

    #[test]
    fn filters_flatten_to_query_parameters() {
        let params = filter_params(&json!({
            "school_id": "S1",
            "attendance": 90,
            "user_id": null
        }));
        assert!(params.contains(&("school_id".to_string(), "S1".to_string())));
        assert!(params.contains(&("attendance".to_string(), "90".to_string())));
        assert!(!params.iter().any(|(field, _)| field == "user_id"));
    }
}
