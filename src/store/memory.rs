//! In-process student table.
//!
//! Mirrors the remote table's behaviour: store-assigned ids and timestamps,
//! a unique email constraint, and newest-first listing.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{StoreConnector, StoreError, StoreResult, StudentStore};
use crate::students::{StudentInput, StudentPatch, StudentRecord};

#[derive(Debug, Clone)]
struct Row {
    record: StudentRecord,
    /// Insertion order, breaks `created_at` ties.
    seq: u64,
}

/// A thread-safe in-memory student table.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<DashMap<String, Row>>,
    /// email -> owning id. Claiming an entry here is the uniqueness check.
    emails: Arc<DashMap<String, String>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound(format!("No student with id {id}"))
    }

    fn duplicate(email: &str) -> StoreError {
        StoreError::Conflict(format!(
            "duplicate key value violates unique constraint \"alunos_email_key\" (email={email})"
        ))
    }

    /// Reserve `email` for `id`. Re-claiming one's own email is allowed.
    fn claim_email(&self, email: &str, id: &str) -> StoreResult<()> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(owner) if owner.get() != id => Err(Self::duplicate(email)),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }

    fn release_email(&self, email: &str, id: &str) {
        self.emails.remove_if(email, |_, owner| owner == id);
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<StudentRecord>> {
        tracing::info!(operation = "list_all", "Listing all students");

        let mut rows: Vec<Row> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        tracing::info!(count = rows.len(), "Students found");
        Ok(rows.into_iter().map(|r| r.record).collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<StudentRecord> {
        tracing::info!(operation = "get_by_id", id = %id, "Fetching student");

        let record = self
            .rows
            .get(id)
            .map(|r| r.record.clone())
            .ok_or_else(|| Self::not_found(id))?;

        tracing::info!(nome = %record.name, "Student found");
        Ok(record)
    }

    async fn insert(&self, input: &StudentInput) -> StoreResult<StudentRecord> {
        tracing::info!(operation = "insert", nome = %input.name, "Creating student");

        let id = Uuid::new_v4().to_string();
        self.claim_email(&input.email, &id).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to create student");
        })?;

        let now = Utc::now();
        let record = StudentRecord {
            id: id.clone(),
            name: input.name.clone(),
            age: input.age,
            email: input.email.clone(),
            course: input.course.clone(),
            created_at: now,
            updated_at: now,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(id, Row { record: record.clone(), seq });

        tracing::info!(id = %record.id, "Student created");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &StudentPatch) -> StoreResult<StudentRecord> {
        tracing::info!(operation = "update", id = %id, "Updating student");

        let mut row = self.rows.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        let record = &mut row.record;

        if let Some(email) = &patch.email {
            if *email != record.email {
                self.claim_email(email, id).inspect_err(|e| {
                    tracing::error!(error = %e, "Failed to update student");
                })?;
                self.release_email(&record.email, id);
                record.email = email.clone();
            }
        }
        if let Some(name) = &patch.name {
            record.name = name.clone();
        }
        if let Some(age) = patch.age {
            record.age = age;
        }
        if let Some(course) = &patch.course {
            record.course = course.clone();
        }
        record.updated_at = Utc::now();

        tracing::info!(id = %id, "Student updated");
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        tracing::info!(operation = "delete", id = %id, "Deleting student");

        if let Some((_, row)) = self.rows.remove(id) {
            self.release_email(&row.record.email, id);
        }

        tracing::info!(id = %id, "Student deleted");
        Ok(())
    }
}

impl StoreConnector for MemoryStore {
    fn connect(&self, _credential: Option<&str>) -> StoreResult<Arc<dyn StudentStore>> {
        Ok(Arc::new(self.clone()))
    }
}
