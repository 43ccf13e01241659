//! Keyset paginator.

use crate::core::executor::QueryExecutor;
use crate::core::record::{FromRecord, Record, RecordError};
use crate::core::types::{Column, Direction, TableSchema, ValueKind};
use crate::metrics;
use crate::pagination::cursor::{
    Cursor, CursorKey, Navigation, OrderSignature, decode_cursor, encode_cursor,
};
use crate::pagination::error::{PaginationError, PaginationResult};
use crate::pagination::page::Page;
use crate::pagination::request::{PageLimits, PageRequest};
use crate::query::{CompareOp, KeysetBound, ListQuery, OrderTerm};
use std::time::Instant;
use tracing::debug;

/// Ordering columns of a paginated query.
///
/// `secondary` must be unique so that `(order_by, secondary)` is a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub order_by: &'static str,
    pub secondary: &'static str,
}

impl SortSpec {
    pub const fn new(order_by: &'static str, secondary: &'static str) -> Self {
        Self { order_by, secondary }
    }

    /// Check both columns against `table`, returning their kinds
    pub fn validate(&self, table: &TableSchema) -> PaginationResult<(ValueKind, ValueKind)> {
        let primary = sort_column(table, self.order_by)?;
        let secondary = sort_column(table, self.secondary)?;
        if !secondary.unique {
            return Err(PaginationError::InvalidSort(format!(
                "tie-breaker {}.{} is not unique",
                table.name, self.secondary
            )));
        }
        Ok((primary.kind, secondary.kind))
    }

    fn key_of(&self, record: &Record) -> PaginationResult<CursorKey> {
        let primary = record.value(self.order_by).clone();
        let secondary = record.value(self.secondary).clone();
        if primary.is_null() {
            return Err(RecordError::MissingField(self.order_by.to_string()).into());
        }
        if secondary.is_null() {
            return Err(RecordError::MissingField(self.secondary.to_string()).into());
        }
        Ok(CursorKey { primary, secondary })
    }
}

fn sort_column<'a>(table: &'a TableSchema, name: &str) -> PaginationResult<&'a Column> {
    let column = table.column(name).ok_or_else(|| {
        PaginationError::InvalidSort(format!("unknown column {}.{}", table.name, name))
    })?;
    if column.nullable {
        return Err(PaginationError::InvalidSort(format!(
            "sort column {}.{} is nullable",
            table.name, name
        )));
    }
    Ok(column)
}

/// Produces pages over a [`ListQuery`] without OFFSET
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    limits: PageLimits,
}

impl Paginator {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Fetch one page of `query` ordered by `sort` in `request.direction`.
    ///
    /// Issues exactly one executor query. `query` keeps any pre-fetch hints;
    /// only the keyset bound, ordering and limit are added.
    pub async fn paginate<E>(
        &self,
        executor: &E,
        query: ListQuery,
        sort: SortSpec,
        request: &PageRequest,
    ) -> PaginationResult<Page<Record>>
    where
        E: QueryExecutor + ?Sized,
    {
        let started = Instant::now();
        let limit = self.limits.resolve(request.limit)?;
        let table = query.table();
        let kinds = sort.validate(table)?;
        let signature =
            OrderSignature::new(table.name, sort.order_by, sort.secondary, request.direction);

        let cursor = match request.cursor.as_deref() {
            Some(token) => Some(decode_cursor(token, &signature, kinds).inspect_err(|e| {
                metrics::incr("pagination.invalid_cursor");
                debug!(table = table.name, error = %e, "rejected cursor");
            })?),
            None => None,
        };
        let navigation = cursor.as_ref().map(|c| c.navigation).unwrap_or(Navigation::Next);

        let windowed = window(query, sort, request.direction, cursor.as_ref(), limit);
        let mut rows = executor.fetch_all(&windowed).await?;

        let has_more = rows.len() > limit;
        rows.truncate(limit);
        if navigation == Navigation::Prev {
            rows.reverse();
        }

        // An empty backward page has nothing after it to return to
        let (has_next, has_prev) = match navigation {
            Navigation::Next => (has_more, cursor.is_some()),
            Navigation::Prev => (!rows.is_empty(), has_more),
        };

        let incoming = cursor.map(|c| c.key);
        let next_cursor = if has_next {
            issue(&signature, Navigation::Next, sort, rows.last(), incoming.as_ref())?
        } else {
            None
        };
        let prev_cursor = if has_prev {
            issue(&signature, Navigation::Prev, sort, rows.first(), incoming.as_ref())?
        } else {
            None
        };

        let elapsed = started.elapsed().as_millis() as u64;
        metrics::incr("pagination.pages");
        metrics::count("pagination.items", rows.len() as u64);
        metrics::time("pagination.page_ms", elapsed);
        debug!(
            table = table.name,
            order_by = sort.order_by,
            direction = %request.direction,
            limit,
            items = rows.len(),
            has_next = next_cursor.is_some(),
            has_prev = prev_cursor.is_some(),
            elapsed_ms = elapsed,
            "page fetched"
        );

        Ok(Page::new(rows, next_cursor, prev_cursor))
    }

    /// [`Paginator::paginate`] followed by conversion of every row into `T`
    pub async fn paginate_as<T, E>(
        &self,
        executor: &E,
        query: ListQuery,
        sort: SortSpec,
        request: &PageRequest,
    ) -> PaginationResult<Page<T>>
    where
        T: FromRecord,
        E: QueryExecutor + ?Sized,
    {
        let page = self.paginate(executor, query, sort, request).await?;
        Ok(page.try_map(|record| T::from_record(&record))?)
    }
}

/// Add the keyset bound, ordering and `limit + 1` window to `query`.
///
/// `prev` navigation scans the opposite way from the cursor key; the caller
/// reverses the fetched rows back into `direction`.
fn window(
    mut query: ListQuery,
    sort: SortSpec,
    direction: Direction,
    cursor: Option<&Cursor>,
    limit: usize,
) -> ListQuery {
    let scan = match cursor.map(|c| c.navigation) {
        Some(Navigation::Prev) => direction.reverse(),
        _ => direction,
    };

    query.keyset = cursor.map(|c| KeysetBound {
        primary: sort.order_by,
        primary_value: c.key.primary.clone(),
        secondary: sort.secondary,
        secondary_value: c.key.secondary.clone(),
        op: match (scan, c.inclusive) {
            (Direction::Asc, false) => CompareOp::Gt,
            (Direction::Asc, true) => CompareOp::Ge,
            (Direction::Desc, false) => CompareOp::Lt,
            (Direction::Desc, true) => CompareOp::Le,
        },
    });
    query.order = vec![
        OrderTerm { column: sort.order_by, direction: scan },
        OrderTerm { column: sort.secondary, direction: scan },
    ];
    query.limit = Some(limit + 1);
    query
}

// An empty page reissues the incoming key inclusively so that navigating
// away from the gap still reaches the row the incoming cursor pointed at
fn issue(
    signature: &OrderSignature,
    navigation: Navigation,
    sort: SortSpec,
    boundary: Option<&Record>,
    incoming: Option<&CursorKey>,
) -> PaginationResult<Option<String>> {
    let cursor = match (boundary, incoming) {
        (Some(record), _) => Cursor::new(navigation, sort.key_of(record)?),
        (None, Some(key)) => Cursor::new(navigation, key.clone()).inclusive(),
        (None, None) => return Ok(None),
    };
    encode_cursor(signature, &cursor).map(Some)
}
