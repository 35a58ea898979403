//! Student request handling.
//!
//! One method per CRUD action. Each runs validation where needed, calls the
//! store, and folds every expected outcome into an [`Envelope`]. Nothing
//! here returns an error or panics; failures become `success: false`.

use serde_json::Value;
use std::sync::Arc;

use crate::api::envelope::Envelope;
use crate::api::error::ApiError;
use crate::store::{StoreError, StudentStore};
use crate::students::{validate, StudentPatch, StudentRecord};

/// Controller bound to one request's store handle.
pub struct StudentController {
    store: Arc<dyn StudentStore>,
}

impl StudentController {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    /// List every student, newest first.
    pub async fn list(&self) -> Envelope<Vec<StudentRecord>> {
        match self.store.list_all().await {
            Ok(records) => {
                let total = records.len();
                Envelope::ok("Students listed successfully", records).with_total(total)
            }
            Err(e) => report(store_failure("Failed to list students", e)),
        }
    }

    /// Fetch one student.
    pub async fn get(&self, id: Option<&str>) -> Envelope<StudentRecord> {
        match self.fetch(id).await {
            Ok(record) => Envelope::ok("Student found successfully", record),
            Err(e) => report(e),
        }
    }

    /// Validate and insert a new student.
    pub async fn create(&self, raw: &Value) -> Envelope<StudentRecord> {
        match self.insert(raw).await {
            Ok(record) => Envelope::ok("Student created successfully", record),
            Err(e) => report(e),
        }
    }

    /// Validate and replace all four fields of an existing student.
    ///
    /// PUT and PATCH both land here; there are no partial-field semantics.
    pub async fn update(&self, id: Option<&str>, raw: &Value) -> Envelope<StudentRecord> {
        match self.replace(id, raw).await {
            Ok(record) => Envelope::ok("Student updated successfully", record),
            Err(e) => report(e),
        }
    }

    /// Delete a student. Absent ids succeed.
    pub async fn delete(&self, id: Option<&str>) -> Envelope<()> {
        match self.remove(id).await {
            Ok(()) => Envelope::done("Student deleted successfully"),
            Err(e) => report(e),
        }
    }

    async fn fetch(&self, id: Option<&str>) -> Result<StudentRecord, ApiError> {
        let id = require_id(id)?;
        self.store.get_by_id(id).await.map_err(|e| match e {
            StoreError::NotFound(detail) => ApiError::NotFound(detail),
            other => store_failure("Failed to fetch student", other),
        })
    }

    async fn insert(&self, raw: &Value) -> Result<StudentRecord, ApiError> {
        let input = validate(raw).map_err(ApiError::ValidationFailed)?;
        self.store.insert(&input).await.map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict,
            other => store_failure("Failed to create student", other),
        })
    }

    async fn replace(&self, id: Option<&str>, raw: &Value) -> Result<StudentRecord, ApiError> {
        let id = require_id(id)?;
        let input = validate(raw).map_err(ApiError::ValidationFailed)?;
        let patch = StudentPatch::from(input);
        self.store.update(id, &patch).await.map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict,
            StoreError::NotFound(detail) => ApiError::NotFound(detail),
            other => store_failure("Failed to update student", other),
        })
    }

    async fn remove(&self, id: Option<&str>) -> Result<(), ApiError> {
        let id = require_id(id)?;
        self.store
            .delete(id)
            .await
            .map_err(|e| store_failure("Failed to delete student", e))
    }
}

fn require_id(id: Option<&str>) -> Result<&str, ApiError> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingIdentifier)
}

fn store_failure(context: &'static str, err: StoreError) -> ApiError {
    ApiError::StoreFailure {
        context,
        detail: err.to_string(),
    }
}

fn report<T>(err: ApiError) -> Envelope<T> {
    match &err {
        ApiError::StoreFailure { detail, .. } => {
            tracing::error!(reason = %err, error = %detail, "Store operation failed");
        }
        _ => tracing::warn!(reason = %err, "Request rejected"),
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreResult};
    use crate::students::StudentInput;
    use async_trait::async_trait;
    use serde_json::json;

    /// A store whose every call fails with a backend error.
    struct BrokenStore;

    #[async_trait]
    impl StudentStore for BrokenStore {
        async fn list_all(&self) -> StoreResult<Vec<StudentRecord>> {
            Err(StoreError::Backend("permission denied for table alunos".to_string()))
        }
        async fn get_by_id(&self, _id: &str) -> StoreResult<StudentRecord> {
            Err(StoreError::Transport("connection refused".to_string()))
        }
        async fn insert(&self, _input: &StudentInput) -> StoreResult<StudentRecord> {
            Err(StoreError::Backend("insert rejected".to_string()))
        }
        async fn update(&self, _id: &str, _patch: &StudentPatch) -> StoreResult<StudentRecord> {
            Err(StoreError::Backend("update rejected".to_string()))
        }
        async fn delete(&self, _id: &str) -> StoreResult<()> {
            Err(StoreError::Backend("delete rejected".to_string()))
        }
    }

    fn memory_controller() -> StudentController {
        StudentController::new(Arc::new(MemoryStore::new()))
    }

    fn ana() -> Value {
        json!({"nome": "Ana", "idade": 20, "email": "ANA@X.com ", "curso": " CS "})
    }

    #[tokio::test]
    async fn test_list_empty_table() {
        let envelope = memory_controller().list().await;
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(vec![]));
        assert_eq!(envelope.total, Some(0));
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let controller = memory_controller();
        let created = controller.create(&ana()).await;
        assert!(created.success);
        let record = created.data.unwrap();

        let fetched = controller.get(Some(&record.id)).await;
        assert!(fetched.success);
        assert_eq!(
            fetched.data.unwrap().input(),
            StudentInput {
                name: "Ana".to_string(),
                age: 20,
                email: "ana@x.com".to_string(),
                course: "CS".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_invalid_returns_field_errors() {
        let controller = memory_controller();
        let envelope = controller.create(&json!({"nome": "", "idade": 0})).await;

        assert!(!envelope.success);
        assert_eq!(envelope.message, "Invalid data");
        let fields: Vec<_> = envelope.errors.unwrap().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["nome", "idade", "email", "curso"]);
        assert_eq!(controller.list().await.total, Some(0));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let controller = memory_controller();
        let first = controller.create(&ana()).await.data.unwrap();

        let duplicate = json!({"nome": "Outra Ana", "idade": 30, "email": "ana@x.com", "curso": "Direito"});
        let envelope = controller.create(&duplicate).await;
        assert!(!envelope.success);
        assert_eq!(envelope.message, "Email already registered");
        assert_eq!(envelope.error.as_deref(), Some(crate::api::error::DUPLICATE_EMAIL_DETAIL));

        let still = controller.get(Some(&first.id)).await.data.unwrap();
        assert_eq!(still, first);
    }

    #[tokio::test]
    async fn test_missing_id_checks() {
        let controller = memory_controller();
        for envelope in [
            controller.get(None).await.message,
            controller.get(Some("  ")).await.message,
            controller.update(None, &ana()).await.message,
            controller.delete(Some("")).await.message,
        ] {
            assert_eq!(envelope, "Student id is required");
        }
    }

    #[tokio::test]
    async fn test_missing_id_wins_over_validation() {
        let envelope = memory_controller().update(None, &json!({})).await;
        assert_eq!(envelope.message, "Student id is required");
        assert!(envelope.errors.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let envelope = memory_controller().get(Some("nope")).await;
        assert!(!envelope.success);
        assert_eq!(envelope.message, "Student not found");
        assert!(envelope.error.is_some());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let controller = memory_controller();
        let record = controller.create(&ana()).await.data.unwrap();

        let body = json!({"nome": "Ana Paula", "idade": 21, "email": "ana.paula@x.com", "curso": "Math"});
        let updated = controller.update(Some(&record.id), &body).await;
        assert!(updated.success);
        let updated = updated.data.unwrap();
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.name, "Ana Paula");
        assert_eq!(updated.email, "ana.paula@x.com");
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let envelope = memory_controller().update(Some("nope"), &ana()).await;
        assert_eq!(envelope.message, "Student not found");
    }

    #[tokio::test]
    async fn test_update_into_taken_email_is_conflict() {
        let controller = memory_controller();
        controller.create(&ana()).await;
        let bia = controller
            .create(&json!({"nome": "Bia", "idade": 22, "email": "bia@x.com", "curso": "CS"}))
            .await
            .data
            .unwrap();

        let envelope = controller.update(Some(&bia.id), &ana()).await;
        assert_eq!(envelope.message, "Email already registered");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let controller = memory_controller();
        let record = controller.create(&ana()).await.data.unwrap();

        let deleted = controller.delete(Some(&record.id)).await;
        assert!(deleted.success);
        assert!(deleted.data.is_none());

        let envelope = controller.get(Some(&record.id)).await;
        assert_eq!(envelope.message, "Student not found");
    }

    #[tokio::test]
    async fn test_store_failures_pass_message_through() {
        let controller = StudentController::new(Arc::new(BrokenStore));

        let list = controller.list().await;
        assert_eq!(list.message, "Failed to list students");
        assert_eq!(list.error.as_deref(), Some("permission denied for table alunos"));

        let get = controller.get(Some("x")).await;
        assert_eq!(get.message, "Failed to fetch student");
        assert_eq!(get.error.as_deref(), Some("Store request failed: connection refused"));

        let create = controller.create(&ana()).await;
        assert_eq!(create.message, "Failed to create student");
        assert_eq!(create.error.as_deref(), Some("insert rejected"));

        let delete = controller.delete(Some("x")).await;
        assert_eq!(delete.message, "Failed to delete student");
    }
}
