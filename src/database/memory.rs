use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::store::{Row, Store};
use crate::filter::{compare, Filter, FilterData, FilterMatch, FilterOrderInfo, SortDirection};

#[derive(Debug, Default)]
struct MemoryTable {
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

impl MemoryTable {
    fn matching_ids(&self, filter: &Filter) -> Vec<i64> {
        self.rows
            .iter()
            .filter(|(_, row)| filter.where_node().map_or(true, |node| FilterMatch::matches(node, row)))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// In-process [`Store`] with the same filter semantics as [`super::PgStore`].
///
/// Tables spring into existence on first insert. Used when no `DATABASE_URL`
/// is configured and throughout the test suites.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Postgres ordering: NULLs sort last ascending and first descending.
fn compare_rows(a: &Row, b: &Row, order: &[FilterOrderInfo]) -> Ordering {
    for info in order {
        let left = a.get(&info.column).unwrap_or(&Value::Null);
        let right = b.get(&info.column).unwrap_or(&Value::Null);
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
        };
        let ordering = match info.sort {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: &str, filter: FilterData) -> Result<Vec<Row>, DatabaseError> {
        let filter = Filter::build(table, filter)?;
        let tables = self.tables.read().await;
        let Some(data) = tables.get(filter.table_name()) else {
            return Ok(vec![]);
        };

        let mut rows: Vec<&Row> = data
            .matching_ids(&filter)
            .iter()
            .filter_map(|id| data.rows.get(id))
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, filter.order_data()));

        let offset = filter.offset_value().unwrap_or(0).max(0) as usize;
        let limit = filter.limit_value().map_or(usize::MAX, |l| l.max(0) as usize);

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row, DatabaseError> {
        let filter = Filter::new(table)?;
        let mut tables = self.tables.write().await;
        let data = tables.entry(filter.table_name().to_string()).or_default();

        data.next_id += 1;
        let id = data.next_id;
        let timestamp = now();
        row.insert("id".to_string(), Value::from(id));
        row.insert("created_at".to_string(), timestamp.clone());
        row.insert("updated_at".to_string(), timestamp);

        data.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, filter: FilterData, changes: Row) -> Result<Vec<Row>, DatabaseError> {
        if changes.is_empty() {
            return self.select(table, filter).await;
        }

        let filter = Filter::build(table, filter)?;
        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(filter.table_name()) else {
            return Ok(vec![]);
        };

        let timestamp = now();
        let mut updated = vec![];
        for id in data.matching_ids(&filter) {
            if let Some(row) = data.rows.get_mut(&id) {
                for (key, value) in &changes {
                    if key != "id" {
                        row.insert(key.clone(), value.clone());
                    }
                }
                row.insert("updated_at".to_string(), timestamp.clone());
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: FilterData) -> Result<u64, DatabaseError> {
        let filter = Filter::build(table, filter)?;
        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(filter.table_name()) else {
            return Ok(0);
        };

        let ids = data.matching_ids(&filter);
        for id in &ids {
            data.rows.remove(id);
        }
        Ok(ids.len() as u64)
    }

    async fn count(&self, table: &str, filter: FilterData) -> Result<i64, DatabaseError> {
        let filter = Filter::build(table, filter)?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(filter.table_name())
            .map_or(0, |data| data.matching_ids(&filter).len() as i64))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
