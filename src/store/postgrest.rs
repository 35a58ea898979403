//! PostgREST client for the remote students table.
//!
//! # Responsibilities
//! - Translate CRUD calls into PostgREST requests (`/rest/v1/{table}`)
//! - Attach the project API key and the caller's bearer credential
//! - Map store error codes to `StoreError` variants
//!
//! # Error codes
//! - `PGRST116`: a single-row request matched no rows → `NotFound`
//! - `23505` (or HTTP 409): unique constraint violated → `Conflict`
//! - anything else → `Backend`, message passed through verbatim

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::store::{StoreConnector, StoreError, StoreResult, StudentStore};
use crate::students::{StudentInput, StudentPatch, StudentRecord};

const APIKEY: &str = "apikey";
const PREFER: &str = "prefer";
/// Ask PostgREST for a bare object instead of a one-element array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

const NO_ROWS_CODE: &str = "PGRST116";
const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Error payload returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Opens per-request handles against one PostgREST table.
///
/// The HTTP connection pool is shared; credentials are per handle.
#[derive(Debug, Clone)]
pub struct PostgrestConnector {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PostgrestConnector {
    /// Create a connector from store configuration.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let endpoint = format!(
            "{}/rest/v1/{}",
            config.url.trim_end_matches('/'),
            config.table
        );

        tracing::info!(endpoint = %endpoint, "PostgREST store configured");

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Table endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the handle for one request without type erasure.
    pub fn open(&self, credential: Option<&str>) -> StoreResult<PostgrestStore> {
        let bearer = credential.unwrap_or(&self.api_key);

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(APIKEY),
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| StoreError::Connection(format!("invalid API key: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bearer}"))
                .map_err(|e| StoreError::Connection(format!("invalid credential: {e}")))?,
        );

        Ok(PostgrestStore {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            headers,
        })
    }
}

impl StoreConnector for PostgrestConnector {
    fn connect(&self, credential: Option<&str>) -> StoreResult<Arc<dyn StudentStore>> {
        Ok(Arc::new(self.open(credential)?))
    }
}

/// A request-scoped PostgREST handle.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl PostgrestStore {
    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .headers(self.headers.clone())
    }

    fn single_row(&self, method: reqwest::Method, id: &str) -> reqwest::RequestBuilder {
        self.request(method)
            .query(&[("id", format!("eq.{id}"))])
            .header(ACCEPT, SINGLE_OBJECT)
    }
}

#[async_trait]
impl StudentStore for PostgrestStore {
    async fn list_all(&self) -> StoreResult<Vec<StudentRecord>> {
        tracing::info!(operation = "list_all", "Listing all students");

        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let records: Vec<StudentRecord> = read_json(response).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to list students");
        })?;

        tracing::info!(count = records.len(), "Students found");
        Ok(records)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<StudentRecord> {
        tracing::info!(operation = "get_by_id", id = %id, "Fetching student");

        let response = self
            .single_row(reqwest::Method::GET, id)
            .query(&[("select", "*")])
            .send()
            .await?;
        let record: StudentRecord = read_json(response).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to fetch student");
        })?;

        tracing::info!(nome = %record.name, "Student found");
        Ok(record)
    }

    async fn insert(&self, input: &StudentInput) -> StoreResult<StudentRecord> {
        tracing::info!(operation = "insert", nome = %input.name, "Creating student");

        let response = self
            .request(reqwest::Method::POST)
            .header(ACCEPT, SINGLE_OBJECT)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(input)
            .send()
            .await?;
        let record: StudentRecord = read_json(response).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to create student");
        })?;

        tracing::info!(id = %record.id, "Student created");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &StudentPatch) -> StoreResult<StudentRecord> {
        tracing::info!(operation = "update", id = %id, "Updating student");

        let response = self
            .single_row(reqwest::Method::PATCH, id)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(patch)
            .send()
            .await?;
        let record: StudentRecord = read_json(response).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to update student");
        })?;

        tracing::info!(id = %id, "Student updated");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        tracing::info!(operation = "delete", id = %id, "Deleting student");

        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        if !response.status().is_success() {
            let err = error_from_response(response).await;
            tracing::error!(error = %err, "Failed to delete student");
            return Err(err);
        }

        tracing::info!(id = %id, "Student deleted");
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify_error(status, &body)
}

fn classify_error(status: StatusCode, body: &str) -> StoreError {
    let parsed: PostgrestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .or_else(|| (!body.is_empty()).then(|| body.to_string()))
        .unwrap_or_else(|| format!("Store responded with status {status}"));

    match parsed.code.as_deref() {
        Some(NO_ROWS_CODE) => StoreError::NotFound(message),
        Some(UNIQUE_VIOLATION_CODE) => StoreError::Conflict(match parsed.details {
            Some(details) => format!("{message} ({details})"),
            None => message,
        }),
        _ if status == StatusCode::CONFLICT => StoreError::Conflict(message),
        _ => StoreError::Backend(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StoreConfig {
        StoreConfig {
            url: "https://project.supabase.co/".to_string(),
            api_key: "anon-key".to_string(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_endpoint_joins_table() {
        let connector = PostgrestConnector::new(&test_config()).unwrap();
        assert_eq!(connector.endpoint(), "https://project.supabase.co/rest/v1/alunos");
    }

    #[test]
    fn test_handle_uses_caller_credential() {
        let connector = PostgrestConnector::new(&test_config()).unwrap();

        let anonymous = connector.open(None).unwrap();
        assert_eq!(anonymous.headers[AUTHORIZATION], "Bearer anon-key");
        assert_eq!(anonymous.headers[APIKEY], "anon-key");

        let user = connector.open(Some("user-jwt")).unwrap();
        assert_eq!(user.headers[AUTHORIZATION], "Bearer user-jwt");
    }

    #[test]
    fn test_rejects_unencodable_credential() {
        let connector = PostgrestConnector::new(&test_config()).unwrap();
        let err = connector.open(Some("bad\ntoken")).unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn test_classify_no_rows() {
        let body = r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        let err = classify_error(StatusCode::NOT_ACCEPTABLE, body);
        assert_eq!(
            err,
            StoreError::NotFound("JSON object requested, multiple (or no) rows returned".to_string())
        );
    }

    #[test]
    fn test_classify_unique_violation() {
        let body = r#"{"code":"23505","details":"Key (email)=(ana@x.com) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"alunos_email_key\""}"#;
        match classify_error(StatusCode::CONFLICT, body) {
            StoreError::Conflict(message) => {
                assert!(message.starts_with("duplicate key value"));
                assert!(message.contains("ana@x.com"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_errors_pass_message_through() {
        let body = r#"{"code":"22P02","details":null,"hint":null,"message":"invalid input syntax for type uuid: \"abc\""}"#;
        assert_eq!(
            classify_error(StatusCode::BAD_REQUEST, body),
            StoreError::Backend("invalid input syntax for type uuid: \"abc\"".to_string())
        );

        assert_eq!(
            classify_error(StatusCode::BAD_GATEWAY, ""),
            StoreError::Backend("Store responded with status 502 Bad Gateway".to_string())
        );
        assert_eq!(
            classify_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded"),
            StoreError::Backend("upstream exploded".to_string())
        );
    }
}
