use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{postgres::PgArguments, query::Query, types::Json, PgPool, Postgres, Row as _};
use tracing::debug;

use super::manager::{DatabaseError, DatabaseManager};
use super::store::{Row, Store};
use crate::filter::{validate_identifier, Filter, FilterData};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// [`Store`] backed by PostgreSQL.
///
/// Every statement returns rows through `row_to_json`, so results come back
/// as JSON objects regardless of the table's column types. Written values
/// travel as a single JSONB parameter expanded with `jsonb_populate_record`,
/// which lets Postgres coerce each field to its column type.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DatabaseError> {
        if crate::config::CONFIG.database.enable_query_logging {
            debug!(sql, params = params.len(), "executing query");
        }

        let mut query = sqlx::query(sql);
        for param in &params {
            query = bind_param(query, param);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| into_row(row.try_get::<Value, _>("row")?))
            .collect()
    }
}

#[async_trait]
impl Store for PgStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn select(&self, table: &str, filter: FilterData) -> Result<Vec<Row>, DatabaseError> {
        let sql = Filter::build(table, filter)?.to_sql()?;
        let query = format!("SELECT row_to_json(t) AS row FROM ({}) t", sql.query);
        self.fetch_rows(&query, sql.params).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, DatabaseError> {
        let filter = Filter::new(table)?;
        let table = DatabaseManager::quote_identifier(filter.table_name());

        let (query, params) = if row.is_empty() {
            (
                format!(
                    "WITH inserted AS (INSERT INTO {} DEFAULT VALUES RETURNING *) \
                     SELECT row_to_json(inserted) AS row FROM inserted",
                    table
                ),
                vec![],
            )
        } else {
            let columns = quoted_columns(&row)?;
            (
                format!(
                    "WITH inserted AS (INSERT INTO {table} ({cols}) \
                     SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) RETURNING *) \
                     SELECT row_to_json(inserted) AS row FROM inserted",
                    table = table,
                    cols = columns.join(", "),
                ),
                vec![Value::Object(row)],
            )
        };

        self.fetch_rows(&query, params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::QueryError(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, filter: FilterData, mut changes: Row) -> Result<Vec<Row>, DatabaseError> {
        changes.remove("updated_at");
        if changes.is_empty() {
            return self.select(table, filter).await;
        }

        let filter = Filter::build(table, filter)?;
        let table = DatabaseManager::quote_identifier(filter.table_name());
        let where_sql = filter.to_where_sql(1);

        let assignments = quoted_columns(&changes)?
            .into_iter()
            .map(|col| format!("{col} = (SELECT {col} FROM jsonb_populate_record(NULL::{table}, $1))", col = col, table = table))
            .chain(std::iter::once("\"updated_at\" = now()".to_string()))
            .collect::<Vec<_>>()
            .join(", ");

        let query = format!(
            "WITH updated AS (UPDATE {} SET {}{} RETURNING *) \
             SELECT row_to_json(updated) AS row FROM updated",
            table,
            assignments,
            where_suffix(&where_sql.query),
        );

        let mut params = vec![Value::Object(changes)];
        params.extend(where_sql.params);
        self.fetch_rows(&query, params).await
    }

    async fn delete(&self, table: &str, filter: FilterData) -> Result<u64, DatabaseError> {
        let filter = Filter::build(table, filter)?;
        let where_sql = filter.to_where_sql(0);
        let query = format!(
            "DELETE FROM {}{}",
            DatabaseManager::quote_identifier(filter.table_name()),
            where_suffix(&where_sql.query)
        );

        let mut statement = sqlx::query(&query);
        for param in &where_sql.params {
            statement = bind_param(statement, param);
        }
        Ok(statement.execute(&self.pool).await?.rows_affected())
    }

    async fn count(&self, table: &str, filter: FilterData) -> Result<i64, DatabaseError> {
        let sql = Filter::build(table, filter)?.to_count_sql();
        let mut statement = sqlx::query(&sql.query);
        for param in &sql.params {
            statement = bind_param(statement, param);
        }
        let row = statement.fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("count")?)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn where_suffix(predicate: &str) -> String {
    if predicate.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", predicate)
    }
}

fn quoted_columns(row: &Row) -> Result<Vec<String>, DatabaseError> {
    row.keys()
        .map(|key| {
            validate_identifier(key)
                .map(|_| DatabaseManager::quote_identifier(key))
                .map_err(|msg| DatabaseError::QueryError(format!("{}: {}", msg, key)))
        })
        .collect()
}

fn into_row(value: Value) -> Result<Row, DatabaseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("expected a JSON object row, got {}", other))),
    }
}

/// Bind a JSON filter value with the closest Postgres type, so comparisons
/// against timestamp and date columns type-check.
fn bind_param<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                query.bind(ts.with_timezone(&Utc))
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                query.bind(date)
            } else {
                query.bind(s.clone())
            }
        }
        Value::Array(_) | Value::Object(_) => query.bind(Json(value.clone())),
    }
}
