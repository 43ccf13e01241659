//! PostgreSQL implementation of the query executor
use crate::core::executor::{QueryExecutor, Result, StoreError, check_column, validate_query};
use crate::core::record::Record;
use crate::core::types::{TableSchema, Value, ValueKind};
use crate::database::client::Database;
use crate::metrics;
use crate::query::{CompareOp, ListQuery, Relationship};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

const BASE_ALIAS: &str = "t";

/// Executes list queries against PostgreSQL
#[derive(Clone)]
pub struct PgExecutor {
    pool: Pool<Postgres>,
}

impl PgExecutor {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn from_database(database: &Arc<Database>) -> Self {
        Self { pool: database.pool.clone() }
    }
}

fn relation_alias(index: usize) -> String {
    format!("r{}", index)
}

fn related_column_alias(relationship: &Relationship, column: &str) -> String {
    format!("{}__{}", relationship.name, column)
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &Value) -> Result<()> {
    match value {
        Value::Null => {
            return Err(StoreError::UnsupportedFilter("cannot bind NULL".to_string()));
        },
        Value::Bool(v) => builder.push_bind(*v),
        Value::Int(v) => builder.push_bind(*v),
        Value::Text(v) => builder.push_bind(v.clone()),
        Value::Timestamp(v) => builder.push_bind(*v),
        Value::Uuid(v) => builder.push_bind(*v),
    };
    Ok(())
}

fn push_condition(builder: &mut QueryBuilder<'static, Postgres>, conditions: &mut usize) {
    builder.push(if *conditions == 0 { " WHERE " } else { " AND " });
    *conditions += 1;
}

/// Render `query` as a single parameterised SELECT.
///
/// Each pre-fetched relationship becomes a LEFT JOIN whose columns are
/// aliased `<relationship>__<column>`. The keyset bound is expanded to
/// `a > x OR (a = x AND b > y)` so a composite index on `(a, b)` applies.
pub fn build_select(query: &ListQuery) -> Result<QueryBuilder<'static, Postgres>> {
    validate_query(query)?;
    let table = query.table();
    let mut builder = QueryBuilder::new("SELECT ");

    let base_columns =
        table.columns.iter().map(|c| format!("{BASE_ALIAS}.\"{0}\" AS \"{0}\"", c.name));
    let related_columns = query.prefetch().iter().enumerate().flat_map(|(i, relationship)| {
        relationship.target.columns.iter().map(move |c| {
            format!(
                "{}.\"{}\" AS \"{}\"",
                relation_alias(i),
                c.name,
                related_column_alias(relationship, c.name)
            )
        })
    });
    builder.push(base_columns.chain(related_columns).collect::<Vec<_>>().join(", "));

    builder.push(format!(" FROM \"{}\" AS {BASE_ALIAS}", table.name));
    for (i, relationship) in query.prefetch().iter().enumerate() {
        let alias = relation_alias(i);
        builder.push(format!(
            " LEFT JOIN \"{}\" AS {alias} ON {alias}.\"{}\" = {BASE_ALIAS}.\"{}\"",
            relationship.target.name, relationship.foreign_key, relationship.local_key
        ));
    }

    let mut conditions = 0;
    for filter in query.filters() {
        push_condition(&mut builder, &mut conditions);
        match (&filter.value, filter.op) {
            (Value::Null, CompareOp::Eq) => {
                builder.push(format!("{BASE_ALIAS}.\"{}\" IS NULL", filter.column));
            },
            (Value::Null, _) => {
                builder.push(format!("{BASE_ALIAS}.\"{}\" IS NOT NULL", filter.column));
            },
            (value, op) => {
                builder.push(format!("{BASE_ALIAS}.\"{}\" {} ", filter.column, op.as_sql()));
                push_value(&mut builder, value)?;
            },
        }
    }

    if let Some(bound) = query.keyset() {
        push_condition(&mut builder, &mut conditions);
        builder.push(format!("({BASE_ALIAS}.\"{}\" {} ", bound.primary, bound.op.strict().as_sql()));
        push_value(&mut builder, &bound.primary_value)?;
        builder.push(format!(" OR ({BASE_ALIAS}.\"{}\" = ", bound.primary));
        push_value(&mut builder, &bound.primary_value)?;
        builder.push(format!(" AND {BASE_ALIAS}.\"{}\" {} ", bound.secondary, bound.op.as_sql()));
        push_value(&mut builder, &bound.secondary_value)?;
        builder.push("))");
    }

    if !query.order().is_empty() {
        let terms: Vec<String> = query
            .order()
            .iter()
            .map(|t| format!("{BASE_ALIAS}.\"{}\" {}", t.column, t.direction.as_sql()))
            .collect();
        builder.push(format!(" ORDER BY {}", terms.join(", ")));
    }

    if let Some(limit) = query.limit() {
        builder.push(" LIMIT ");
        builder.push_bind(limit as i64);
    }

    Ok(builder)
}

fn decode_value(row: &PgRow, alias: &str, kind: ValueKind) -> Result<Value> {
    let value = match kind {
        ValueKind::Bool => row.try_get::<Option<bool>, _>(alias)?.map(Value::Bool),
        ValueKind::Int => row.try_get::<Option<i64>, _>(alias)?.map(Value::Int),
        ValueKind::Text => row.try_get::<Option<String>, _>(alias)?.map(Value::Text),
        ValueKind::Timestamp => {
            row.try_get::<Option<DateTime<Utc>>, _>(alias)?.map(Value::Timestamp)
        },
        ValueKind::Uuid => row.try_get::<Option<Uuid>, _>(alias)?.map(Value::Uuid),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn decode_table(
    row: &PgRow,
    table: &TableSchema,
    alias: impl Fn(&str) -> String,
) -> Result<Record> {
    let mut record = Record::new();
    for column in table.columns {
        record.set(column.name, decode_value(row, &alias(column.name), column.kind)?);
    }
    Ok(record)
}

fn decode_row(row: &PgRow, query: &ListQuery) -> Result<Record> {
    let mut record = decode_table(row, query.table(), str::to_string)?;
    for relationship in query.prefetch() {
        let related = decode_table(row, relationship.target, |c| {
            related_column_alias(relationship, c)
        })?;
        // LEFT JOIN without a match yields NULL in the joined key
        let present = !related.value(relationship.foreign_key).is_null();
        record.set_related(relationship.name, present.then_some(related));
    }
    Ok(record)
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_all(&self, query: &ListQuery) -> Result<Vec<Record>> {
        let mut builder = build_select(query)?;
        debug!(sql = builder.sql(), "executing list query");
        metrics::incr("store.queries");

        let rows = builder.build().fetch_all(&self.pool).await.map_err(|e| {
            error!(table = query.table().name, "List query failed: {}", e);
            StoreError::Database(e)
        })?;

        rows.iter().map(|row| decode_row(row, query)).collect()
    }

    async fn fetch_related(
        &self,
        relationship: &Relationship,
        key: &Value,
    ) -> Result<Option<Record>> {
        check_column(relationship.target, relationship.foreign_key)?;
        let target = relationship.target;
        let columns: Vec<String> = target.columns.iter().map(|c| format!("\"{}\"", c.name)).collect();

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM \"{}\" WHERE \"{}\" = ",
            columns.join(", "),
            target.name,
            relationship.foreign_key
        ));
        push_value(&mut builder, key)?;
        builder.push(" LIMIT 1");
        metrics::incr("store.queries");

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.map(|row| decode_table(&row, target, str::to_string)).transpose()
    }
}
