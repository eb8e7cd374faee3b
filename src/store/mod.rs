//! Document store backing cases, partners and enquiries.
//!
//! Every backend stores schemaless JSON documents keyed by a store-assigned
//! id inside a named [`Collection`]. The lifecycle engine talks to the store
//! only through [`DocumentStore`], so backends are interchangeable:
//!
//! - [`MemoryStore`]: process-local, used by tests and ephemeral runs
//! - [`FileStore`]: one JSON file per collection guarded by an OS file lock
//! - `SqliteStore`: sqlx/SQLite, behind the `database` feature

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

pub mod file;
pub mod memory;
pub mod patch;
pub mod query;
#[cfg(feature = "database")]
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use patch::Patch;
pub use query::{matches_all, Op, Predicate};
#[cfg(feature = "database")]
pub use sqlite::SqliteStore;

/// Named group of documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Cases,
    Partners,
    Enquiries,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Cases, Collection::Partners, Collection::Enquiries];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Cases => "cases",
            Collection::Partners => "partners",
            Collection::Enquiries => "enquiries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lock acquisition failed: {reason}")]
    Lock { reason: String },

    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "database")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The case store contract: get, create, field patch, delete and query
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` when the id is absent
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert a new document and return its assigned id. The id is also
    /// written into the stored document under `id`.
    async fn create(&self, collection: Collection, document: Value) -> Result<String, StoreError>;

    /// Apply a partial update in a single write
    async fn patch(&self, collection: Collection, id: &str, patch: &Patch) -> Result<(), StoreError>;

    /// Remove a document permanently
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// All documents in the collection matching every predicate
    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<Vec<Value>, StoreError>;

    /// Human-readable backend name for logs
    fn backend(&self) -> &'static str;

    /// Release connections before the process exits
    async fn close(&self) {}
}

/// Give a document to be created its store-assigned id
pub(crate) fn assign_id(document: &mut Value) -> Result<String, StoreError> {
    let id = uuid::Uuid::new_v4().to_string();
    let object = document
        .as_object_mut()
        .ok_or_else(|| StoreError::Corrupt("document is not a JSON object".to_string()))?;
    object.insert("id".to_string(), Value::String(id.clone()));
    Ok(id)
}
