//! Persistent-record store abstraction.
//!
//! Services only talk to a [`RecordStore`]; the schema passed with each call
//! names the table and types its columns. Two implementations ship:
//! - [`memory::MemoryStore`]: JSON rows behind a mutex, for tests and tooling
//! - [`seaorm::SeaOrmStore`]: PostgreSQL through SeaORM

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::pagination::PaginationRequest;
use crate::query::Predicate;
use crate::schema::{EntitySchema, Fields, Row};

pub mod memory;
pub mod seaorm;

pub use memory::MemoryStore;
pub use seaorm::SeaOrmStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("column `{column}`: {reason}")]
    Column { column: String, reason: String },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Row-level operations every entity service relies on.
///
/// Ordering is `page.order_by` with ties broken by `id` in the same
/// direction. In cursor mode the window holds only rows strictly after the
/// cursor row (located by id, regardless of `predicate` or soft deletion), so
/// the cursor row never takes up a slot; `page.store_offset()` gives the rows
/// to drop after that. An unknown cursor yields an empty page.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_many(&self, schema: &'static EntitySchema, predicate: &Predicate, page: &PaginationRequest) -> Result<Vec<Row>, StoreError>;

    async fn count(&self, schema: &'static EntitySchema, predicate: &Predicate) -> Result<u64, StoreError>;

    async fn find_first(&self, schema: &'static EntitySchema, predicate: &Predicate) -> Result<Option<Row>, StoreError>;

    /// Insert one row; the store assigns `id`, `created_at` and `updated_at`.
    async fn create(&self, schema: &'static EntitySchema, fields: Fields) -> Result<Row, StoreError>;

    /// Apply `fields` to the row with `id` and bump `updated_at`.
    async fn update(&self, schema: &'static EntitySchema, id: Uuid, fields: Fields) -> Result<Row, StoreError>;
}
