//! Record store subsystem.
//!
//! # Data Flow
//! ```text
//! AppConfig.store
//!     → connector_from_config (once, at startup)
//!     → StoreConnector::connect(credential) (once per request)
//!     → dyn StudentStore handle, dropped when the request ends
//! ```
//!
//! # Design Decisions
//! - One handle per request; the PostgREST connector shares only its HTTP
//!   connection pool between handles
//! - Email uniqueness is the store's job, surfaced as `StoreError::Conflict`
//! - No retries; a failed call is reported once

pub mod error;
pub mod memory;
pub mod postgrest;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::students::{StudentInput, StudentPatch, StudentRecord};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgrest::{PostgrestConnector, PostgrestStore};

/// CRUD operations over the students table, keyed by `id`.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All records, newest `created_at` first. Empty when the table is empty.
    async fn list_all(&self) -> StoreResult<Vec<StudentRecord>>;

    /// Fetch one record; `NotFound` when no row matches.
    async fn get_by_id(&self, id: &str) -> StoreResult<StudentRecord>;

    /// Insert a record; the store assigns `id` and timestamps.
    async fn insert(&self, input: &StudentInput) -> StoreResult<StudentRecord>;

    /// Overwrite the fields set in `patch`; the store refreshes `updated_at`.
    async fn update(&self, id: &str, patch: &StudentPatch) -> StoreResult<StudentRecord>;

    /// Remove a record. Deleting an absent id succeeds.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Opens a store handle scoped to one request.
pub trait StoreConnector: Send + Sync {
    /// `credential` is the caller's bearer token, when one was presented.
    fn connect(&self, credential: Option<&str>) -> StoreResult<Arc<dyn StudentStore>>;
}

/// Build the connector selected by configuration.
pub fn connector_from_config(config: &StoreConfig) -> StoreResult<Arc<dyn StoreConnector>> {
    match config.backend {
        StoreBackend::Postgrest => Ok(Arc::new(PostgrestConnector::new(config)?)),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory student store; records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
