//! Round trips against a live PostgreSQL database.
//!
//! Run with `HIBACHI_DATABASE__URL=postgresql://... cargo test -- --ignored`.
//! Each test works inside its own customers/bookings id range and cleans up.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hibachi_pager::config::DatabaseConfig;
use hibachi_pager::core::{Direction, FromRecord, QueryExecutor};
use hibachi_pager::database::models::BOOKING_CUSTOMER;
use hibachi_pager::database::{
    BookingFilter, BookingRepository, BookingSort, BookingStatus, BookingWithCustomer,
    CatalogRepository, Database, PgExecutor,
};
use hibachi_pager::pagination::{PageRequest, PaginationError, Paginator};
use hibachi_pager::query::{CompareOp, ListQuery, with_related};
use std::sync::Arc;

fn database_config() -> DatabaseConfig {
    let _ = dotenvy::dotenv();
    DatabaseConfig {
        url: std::env::var("HIBACHI_DATABASE__URL")
            .unwrap_or_else(|_| "postgresql://localhost/hibachi_test".to_string()),
        max_connections: 4,
        timeout_seconds: 5,
    }
}

fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 17, 0, 0).unwrap() + Duration::minutes(minute)
}

async fn setup(base: i64) -> (Arc<Database>, CatalogRepository<PgExecutor>) {
    let database = Arc::new(Database::new(&database_config()).await.expect("database available"));
    database.migrate().await.expect("migrations apply");
    cleanup(&database, base).await;

    sqlx::query("INSERT INTO customers (id, name, email, created_at) VALUES ($1, $2, $3, $4)")
        .bind(base)
        .bind("Integration Guest")
        .bind(format!("guest-{}@example.com", base))
        .bind(at(0))
        .execute(&database.pool)
        .await
        .unwrap();

    // Ties on created_at in pairs so the tie-breaker is exercised
    for offset in 1..=9i64 {
        sqlx::query(
            "INSERT INTO bookings (id, customer_id, status, guest_count, event_start, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(base + offset)
        .bind(if offset == 9 { None } else { Some(base) })
        .bind(if offset % 3 == 0 { "pending" } else { "confirmed" })
        .bind(6 + offset)
        .bind(at(10_000 - offset))
        .bind(at(offset / 2))
        .execute(&database.pool)
        .await
        .unwrap();
    }

    let repository =
        CatalogRepository::new(Arc::new(PgExecutor::from_database(&database)), Paginator::default());
    (database, repository)
}

async fn cleanup(database: &Database, base: i64) {
    sqlx::query("DELETE FROM bookings WHERE id BETWEEN $1 AND $2")
        .bind(base)
        .bind(base + 999)
        .execute(&database.pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(base)
        .execute(&database.pool)
        .await
        .unwrap();
}

fn own_filter(base: i64) -> BookingFilter {
    BookingFilter { status: None, customer_id: Some(base) }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn pages_bookings_with_customers_in_both_directions() {
    let base = 910_000;
    let (database, repository) = setup(base).await;
    let filter = own_filter(base);

    let mut seen = Vec::new();
    let mut pages = Vec::new();
    let mut request = PageRequest::first(3);
    loop {
        let page = repository.list_bookings(&filter, BookingSort::CreatedAt, &request).await.unwrap();
        assert!(page.items.iter().all(|b| b.customer.as_ref().map(|c| c.id) == Some(base)));
        seen.extend(page.items.iter().map(|b| b.booking.id - base));
        let next = page.next_cursor.clone();
        pages.push(page);
        match next {
            Some(cursor) => request = PageRequest::first(3).with_cursor(cursor),
            None => break,
        }
    }
    assert_eq!(seen, (1..=8).collect::<Vec<_>>());

    let back = repository
        .list_bookings(
            &filter,
            BookingSort::CreatedAt,
            &PageRequest::first(3).with_cursor(pages[2].prev_cursor.clone().unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(back.items, pages[1].items);

    cleanup(&database, base).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn descending_event_start_with_status_filter() {
    let base = 920_000;
    let (database, repository) = setup(base).await;

    let filter = BookingFilter { status: Some(BookingStatus::Pending), customer_id: Some(base) };
    let page = repository
        .list_bookings(
            &filter,
            BookingSort::EventStart,
            &PageRequest::first(10).with_direction(Direction::Desc),
        )
        .await
        .unwrap();

    // event_start decreases with the offset
    let offsets: Vec<i64> = page.items.iter().map(|b| b.booking.id - base).collect();
    assert_eq!(offsets, vec![3, 6]);
    assert!(!page.has_next);

    cleanup(&database, base).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn booking_without_customer_has_none() {
    let base = 930_000;
    let (database, repository) = setup(base).await;

    let query = with_related(
        ListQuery::of::<BookingWithCustomer>().filter("id", CompareOp::Eq, base + 9),
        BOOKING_CUSTOMER,
    );
    let rows = repository.executor().fetch_all(&query).await.unwrap();
    assert_eq!(rows.len(), 1);
    let orphan = BookingWithCustomer::from_record(&rows[0]).unwrap();
    assert_eq!(orphan.booking.customer_id, None);
    assert!(orphan.customer.is_none());

    let result = repository
        .list_bookings(
            &own_filter(base),
            BookingSort::CreatedAt,
            &PageRequest::first(3).with_cursor("garbage"),
        )
        .await;
    assert!(matches!(result, Err(PaginationError::InvalidCursor(_))));

    cleanup(&database, base).await;
}
