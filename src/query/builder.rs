//! List query construction

use crate::core::record::Entity;
use crate::core::types::{Direction, TableSchema, Value};
use crate::query::relation::Relationship;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator for base-table filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Strict form of an inclusive range operator
    pub fn strict(&self) -> Self {
        match self {
            Self::Ge => Self::Gt,
            Self::Le => Self::Lt,
            other => *other,
        }
    }

    /// Whether `ordering` (left compared to right) satisfies this operator
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub op: CompareOp,
    pub value: Value,
}

/// Compound keyset bound: rows strictly after (or before) a composite key.
///
/// `Gt` means `(primary, secondary) > (primary_value, secondary_value)`,
/// expanded as `primary > x OR (primary = x AND secondary > y)`. `Ge`/`Le`
/// make only the secondary comparison inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetBound {
    pub primary: &'static str,
    pub primary_value: Value,
    pub secondary: &'static str,
    pub secondary_value: Value,
    pub op: CompareOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub direction: Direction,
}

/// A filtered list query over one table, with optional relationship pre-fetch.
///
/// Ordering, keyset bound and limit can only be set inside the crate, so a
/// query handed to the paginator is never already windowed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    table: &'static TableSchema,
    filters: Vec<Filter>,
    prefetch: Vec<Relationship>,
    pub(crate) keyset: Option<KeysetBound>,
    pub(crate) order: Vec<OrderTerm>,
    pub(crate) limit: Option<usize>,
}

impl ListQuery {
    pub fn from_table(table: &'static TableSchema) -> Self {
        Self {
            table,
            filters: Vec::new(),
            prefetch: Vec::new(),
            keyset: None,
            order: Vec::new(),
            limit: None,
        }
    }

    /// Query over the table backing `E`
    pub fn of<E: Entity>() -> Self {
        Self::from_table(E::SCHEMA)
    }

    pub fn filter(mut self, column: &'static str, op: CompareOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter { column, op, value: value.into() });
        self
    }

    /// Filter only when `value` is present
    pub fn filter_opt<V: Into<Value>>(
        self,
        column: &'static str,
        op: CompareOp,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.filter(column, op, value),
            None => self,
        }
    }

    /// Pre-fetch `relationship` in the same round trip as the base rows
    pub fn with_related(mut self, relationship: Relationship) -> Self {
        if !self.prefetch.iter().any(|r| r.name == relationship.name) {
            self.prefetch.push(relationship);
        }
        self
    }

    pub fn table(&self) -> &'static TableSchema {
        self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn prefetch(&self) -> &[Relationship] {
        &self.prefetch
    }

    pub fn keyset(&self) -> Option<&KeysetBound> {
        self.keyset.as_ref()
    }

    pub fn order(&self) -> &[OrderTerm] {
        &self.order
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Attach a relationship pre-fetch hint to `query`
pub fn with_related(query: ListQuery, relationship: Relationship) -> ListQuery {
    query.with_related(relationship)
}
