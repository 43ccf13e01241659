//! In-process store implementing the executor contract.
//!
//! Counts every query it executes, which makes round-trip budgets (such as
//! "one query per page regardless of pre-fetched relationships") observable.

use crate::core::executor::{QueryExecutor, Result, check_column, validate_query};
use crate::core::record::Record;
use crate::core::types::{Direction, TableSchema, Value};
use crate::query::{CompareOp, Filter, KeysetBound, ListQuery, OrderTerm, Relationship};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tracing::trace;

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<&'static str, Vec<Record>>>,
    queries: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, table: &'static TableSchema, record: Record) {
        self.tables.write().entry(table.name).or_default().push(record);
    }

    pub fn insert_many(
        &self,
        table: &'static TableSchema,
        records: impl IntoIterator<Item = Record>,
    ) {
        self.tables.write().entry(table.name).or_default().extend(records);
    }

    /// Remove every row of `table` matching `predicate`
    pub fn delete_where(&self, table: &'static TableSchema, predicate: impl Fn(&Record) -> bool) {
        if let Some(rows) = self.tables.write().get_mut(table.name) {
            rows.retain(|r| !predicate(r));
        }
    }

    pub fn row_count(&self, table: &'static TableSchema) -> usize {
        self.tables.read().get(table.name).map(Vec::len).unwrap_or(0)
    }

    /// Number of queries executed since creation or the last reset
    pub fn queries_issued(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    pub fn reset_query_count(&self) {
        self.queries.store(0, AtomicOrdering::SeqCst);
    }

    fn record_query(&self) {
        let n = self.queries.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        trace!(queries = n, "in-memory query executed");
    }
}

fn filter_matches(record: &Record, filter: &Filter) -> bool {
    let value = record.value(filter.column);
    match (&filter.value, filter.op) {
        (Value::Null, CompareOp::Eq) => value.is_null(),
        (Value::Null, _) => !value.is_null(),
        (expected, op) => value.compare(expected).is_some_and(|o| op.matches(o)),
    }
}

fn keyset_matches(record: &Record, bound: &KeysetBound) -> bool {
    match record.value(bound.primary).compare(&bound.primary_value) {
        Some(Ordering::Equal) => record
            .value(bound.secondary)
            .compare(&bound.secondary_value)
            .is_some_and(|o| bound.op.matches(o)),
        Some(ordering) => bound.op.matches(ordering),
        None => false,
    }
}

// NULL sorts after every value ascending, as in PostgreSQL
fn compare_for_order(a: &Value, b: &Value, direction: Direction) -> Ordering {
    let ordering = match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    };
    direction.apply(ordering)
}

fn compare_records(a: &Record, b: &Record, order: &[OrderTerm]) -> Ordering {
    order
        .iter()
        .map(|t| compare_for_order(a.value(t.column), b.value(t.column), t.direction))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[async_trait]
impl QueryExecutor for InMemoryStore {
    async fn fetch_all(&self, query: &ListQuery) -> Result<Vec<Record>> {
        validate_query(query)?;
        self.record_query();

        let tables = self.tables.read();
        let schema = query.table();
        let mut rows: Vec<Record> = tables
            .get(schema.name)
            .map(|rows| {
                rows.iter()
                    .filter(|r| query.filters().iter().all(|f| filter_matches(r, f)))
                    .filter(|r| query.keyset().is_none_or(|b| keyset_matches(r, b)))
                    .map(|r| r.project(schema))
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| compare_records(a, b, query.order()));
        if let Some(limit) = query.limit() {
            rows.truncate(limit);
        }

        // Resolve pre-fetched relationships inside the same query
        for relationship in query.prefetch() {
            let index: HashMap<&Value, &Record> = tables
                .get(relationship.target.name)
                .map(|targets| {
                    targets
                        .iter()
                        .filter_map(|t| t.get(relationship.foreign_key).map(|k| (k, t)))
                        .filter(|(k, _)| !k.is_null())
                        .collect()
                })
                .unwrap_or_default();

            for row in rows.iter_mut() {
                let related = index
                    .get(row.value(relationship.local_key))
                    .map(|t| t.project(relationship.target));
                row.set_related(relationship.name, related);
            }
        }

        Ok(rows)
    }

    async fn fetch_related(
        &self,
        relationship: &Relationship,
        key: &Value,
    ) -> Result<Option<Record>> {
        check_column(relationship.target, relationship.foreign_key)?;
        self.record_query();

        let tables = self.tables.read();
        Ok(tables.get(relationship.target.name).and_then(|targets| {
            targets
                .iter()
                .find(|t| t.value(relationship.foreign_key).compare(key) == Some(Ordering::Equal))
                .map(|t| t.project(relationship.target))
        }))
    }
}
