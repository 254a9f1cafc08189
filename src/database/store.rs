use async_trait::async_trait;
use serde_json::{Map, Value};

use super::manager::DatabaseError;
use crate::filter::FilterData;

/// A table row as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// Table-oriented data access used by every service.
///
/// Each call names a table and narrows it with a [`FilterData`]; callers are
/// responsible for adding the tenant predicate (see `tenant::scope`).
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name reported by `/health`.
    fn kind(&self) -> &'static str;

    async fn select(&self, table: &str, filter: FilterData) -> Result<Vec<Row>, DatabaseError>;

    async fn select_one(&self, table: &str, mut filter: FilterData) -> Result<Option<Row>, DatabaseError> {
        filter.limit = Some(1);
        Ok(self.select(table, filter).await?.into_iter().next())
    }

    /// Insert one row and return it as stored (with `id` and timestamps).
    async fn insert(&self, table: &str, row: Row) -> Result<Row, DatabaseError>;

    /// Apply `changes` to every row matching `filter` and return the updated rows.
    /// `updated_at` is refreshed on each touched row.
    async fn update(&self, table: &str, filter: FilterData, changes: Row) -> Result<Vec<Row>, DatabaseError>;

    /// Returns the number of rows removed.
    async fn delete(&self, table: &str, filter: FilterData) -> Result<u64, DatabaseError>;

    async fn count(&self, table: &str, filter: FilterData) -> Result<i64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
