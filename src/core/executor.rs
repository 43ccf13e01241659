//! Query execution seam between the paginator and a data store
use crate::core::record::Record;
use crate::core::types::{TableSchema, Value};
use crate::query::{CompareOp, ListQuery, Relationship};
use async_trait::async_trait;
use thiserror::Error;

/// Error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Executes list queries against a backing store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `query` in a single round trip.
    ///
    /// Every relationship in `query.prefetch()` is populated on the returned
    /// records, present or `None`.
    async fn fetch_all(&self, query: &ListQuery) -> Result<Vec<Record>>;

    /// Fetch the related row for one base row.
    ///
    /// Issues one query per call; listing code should pre-fetch instead.
    async fn fetch_related(&self, relationship: &Relationship, key: &Value)
    -> Result<Option<Record>>;
}

/// Populate `relationship` on each record with one lookup per row.
///
/// This is the N+1 access pattern. It exists for single-row lookups and for
/// comparing against pre-fetched queries.
pub async fn load_related_per_row<E>(
    executor: &E,
    records: &mut [Record],
    relationship: &Relationship,
) -> Result<()>
where
    E: QueryExecutor + ?Sized,
{
    for record in records.iter_mut() {
        let key = record.value(relationship.local_key).clone();
        let related = if key.is_null() {
            None
        } else {
            executor.fetch_related(relationship, &key).await?
        };
        record.set_related(relationship.name, related);
    }
    Ok(())
}

pub(crate) fn check_column(table: &TableSchema, column: &str) -> Result<()> {
    match table.column(column) {
        Some(_) => Ok(()),
        None => Err(StoreError::UnknownColumn {
            table: table.name.to_string(),
            column: column.to_string(),
        }),
    }
}

/// Check every column `query` references against its schemas
pub fn validate_query(query: &ListQuery) -> Result<()> {
    let table = query.table();
    for filter in query.filters() {
        check_column(table, filter.column)?;
        if filter.value.is_null() && !matches!(filter.op, CompareOp::Eq | CompareOp::Ne) {
            return Err(StoreError::UnsupportedFilter(format!(
                "{} {} NULL",
                filter.column, filter.op
            )));
        }
    }
    if let Some(bound) = query.keyset() {
        check_column(table, bound.primary)?;
        check_column(table, bound.secondary)?;
        if bound.primary_value.is_null() || bound.secondary_value.is_null() {
            return Err(StoreError::UnsupportedFilter("keyset bound on NULL".to_string()));
        }
    }
    for term in query.order() {
        check_column(table, term.column)?;
    }
    for relationship in query.prefetch() {
        check_column(table, relationship.local_key)?;
        check_column(relationship.target, relationship.foreign_key)?;
    }
    Ok(())
}
