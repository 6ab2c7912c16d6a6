//! Sawdesk Record Store
//!
//! Read access to the five record collections the reports are built from:
//! clients, blade types, blades, sharpening records and operators.
//!
//! - **types**: Entities, joined views and filter builders
//! - **sqlite**: SQLite-backed store (schema, queries, seeding writes)
//! - **error**: Error types
//!
//! The reporting engine only sees the [`RecordStore`] trait. Each call is an
//! independent read; consecutive calls are not snapshot-consistent with each
//! other under concurrent writes.

pub mod error;
pub mod sqlite;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
pub use types::{
    Blade, BladeDetail, BladeFilter, BladeOrder, BladeType, Client, NewSharpening, Operator,
    RecordDetail, RecordFilter, Role, SharpenKind, SharpeningRecord,
};

use async_trait::async_trait;

/// Read-only query interface over the record collections
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a client by id
    async fn client(&self, id: i64) -> StoreResult<Option<Client>>;

    /// Batch lookup of clients; ids that do not resolve are simply absent
    async fn clients_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Client>>;

    /// Clients whose name contains `fragment` (case-insensitive), by name
    async fn clients_named(&self, fragment: &str) -> StoreResult<Vec<Client>>;

    /// Look up a blade with its type and client
    async fn blade(&self, id: i64) -> StoreResult<Option<BladeDetail>>;

    /// Blades matching a filter
    async fn blades(&self, filter: &BladeFilter) -> StoreResult<Vec<BladeDetail>>;

    /// Sharpening records matching a filter, newest first
    async fn records(&self, filter: &RecordFilter) -> StoreResult<Vec<RecordDetail>>;

    /// Look up an operator account
    async fn operator(&self, id: i64) -> StoreResult<Option<Operator>>;

    /// Cheap connectivity check
    async fn ping(&self) -> StoreResult<()>;
}
