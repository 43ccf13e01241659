//! Tests for the paginator

#[cfg(test)]
mod tests {
    use crate::core::executor::QueryExecutor;
    use crate::core::memory::InMemoryStore;
    use crate::core::record::Record;
    use crate::core::types::{Column, Direction, TableSchema, Value, ValueKind};
    use crate::pagination::{
        OrderSignature, Page, PageLimits, PageRequest, PaginationError, Paginator, SortSpec,
        decode_cursor,
    };
    use crate::query::{CompareOp, ListQuery};
    use chrono::{DateTime, TimeZone, Utc};

    static EVENTS: TableSchema = TableSchema {
        name: "events",
        columns: &[
            Column::new("id", ValueKind::Int).unique(),
            Column::new("created_at", ValueKind::Timestamp),
            Column::new("note", ValueKind::Text).nullable(),
        ],
    };

    const BY_CREATED: SortSpec = SortSpec::new("created_at", "id");

    fn t(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, n, 0).unwrap()
    }

    fn event(id: i64, minute: u32) -> Record {
        Record::new().with("id", id).with("created_at", t(minute))
    }

    // (t1,1),(t1,2),(t2,3),(t3,4),(t3,5)
    fn scenario_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        // Inserted out of order; the paginator must not rely on insertion order
        store.insert_many(
            &EVENTS,
            [event(4, 3), event(1, 1), event(5, 3), event(3, 2), event(2, 1)],
        );
        store
    }

    fn ids(page: &Page<Record>) -> Vec<i64> {
        page.items.iter().map(|r| r.int("id").unwrap()).collect()
    }

    async fn fetch(store: &InMemoryStore, request: &PageRequest) -> Page<Record> {
        Paginator::default()
            .paginate(store, ListQuery::from_table(&EVENTS), BY_CREATED, request)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let store = scenario_store();
        let signature = OrderSignature::new("events", "created_at", "id", Direction::Asc);
        let kinds = (ValueKind::Timestamp, ValueKind::Int);

        let first = fetch(&store, &PageRequest::first(2)).await;
        assert_eq!(ids(&first), vec![1, 2]);
        assert!(first.has_next);
        assert!(!first.has_prev);
        assert!(first.prev_cursor.is_none());
        let next = decode_cursor(first.next_cursor.as_deref().unwrap(), &signature, kinds).unwrap();
        assert_eq!(next.key.primary, Value::Timestamp(t(1)));
        assert_eq!(next.key.secondary, Value::Int(2));

        let second =
            fetch(&store, &PageRequest::first(2).with_cursor(first.next_cursor.clone().unwrap()))
                .await;
        assert_eq!(ids(&second), vec![3, 4]);
        assert!(second.has_next);
        assert!(second.has_prev);
        let next = decode_cursor(second.next_cursor.as_deref().unwrap(), &signature, kinds).unwrap();
        assert_eq!(next.key.primary, Value::Timestamp(t(3)));
        assert_eq!(next.key.secondary, Value::Int(4));

        let third =
            fetch(&store, &PageRequest::first(2).with_cursor(second.next_cursor.clone().unwrap()))
                .await;
        assert_eq!(ids(&third), vec![5]);
        assert!(!third.has_next);
        assert!(third.next_cursor.is_none());
        assert!(third.has_prev);

        let back =
            fetch(&store, &PageRequest::first(2).with_cursor(second.prev_cursor.clone().unwrap()))
                .await;
        assert_eq!(ids(&back), vec![1, 2]);
        assert!(!back.has_prev);
        assert!(back.has_next);
    }

    #[tokio::test]
    async fn test_descending_order() {
        let store = scenario_store();
        let request = PageRequest::first(3).with_direction(Direction::Desc);

        let first = fetch(&store, &request).await;
        assert_eq!(ids(&first), vec![5, 4, 3]);

        let second =
            fetch(&store, &request.clone().with_cursor(first.next_cursor.clone().unwrap())).await;
        assert_eq!(ids(&second), vec![2, 1]);
        assert!(!second.has_next);

        let back =
            fetch(&store, &request.clone().with_cursor(second.prev_cursor.clone().unwrap())).await;
        assert_eq!(ids(&back), vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn test_cursor_from_other_direction_is_rejected() {
        let store = scenario_store();
        let first = fetch(&store, &PageRequest::first(2)).await;

        let request = PageRequest::first(2)
            .with_direction(Direction::Desc)
            .with_cursor(first.next_cursor.unwrap());
        let result = Paginator::default()
            .paginate(&store, ListQuery::from_table(&EVENTS), BY_CREATED, &request)
            .await;
        assert!(matches!(result, Err(PaginationError::InvalidCursor(_))));
    }

    #[tokio::test]
    async fn test_invalid_cursor_issues_no_query() {
        let store = scenario_store();
        let request = PageRequest::first(2).with_cursor("%%%garbage");
        let result = Paginator::default()
            .paginate(&store, ListQuery::from_table(&EVENTS), BY_CREATED, &request)
            .await;

        let err = result.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.code(), "invalid_cursor");
        assert_eq!(store.queries_issued(), 0);
    }

    #[tokio::test]
    async fn test_limit_bounds() {
        let store = scenario_store();
        let paginator = Paginator::new(PageLimits { default_limit: 2, max_limit: 3 });

        for limit in [0, -1, 4] {
            let result = paginator
                .paginate(
                    &store,
                    ListQuery::from_table(&EVENTS),
                    BY_CREATED,
                    &PageRequest::first(limit),
                )
                .await;
            assert!(matches!(result, Err(PaginationError::InvalidLimit { .. })), "limit {}", limit);
        }

        let page = paginator
            .paginate(&store, ListQuery::from_table(&EVENTS), BY_CREATED, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_sort_columns() {
        let store = scenario_store();
        let query = || ListQuery::from_table(&EVENTS);
        let request = PageRequest::first(2);
        let paginator = Paginator::default();

        for sort in [
            SortSpec::new("missing", "id"),
            SortSpec::new("note", "id"),
            SortSpec::new("id", "created_at"),
        ] {
            let result = paginator.paginate(&store, query(), sort, &request).await;
            let err = result.unwrap_err();
            assert!(matches!(err, PaginationError::InvalidSort(_)), "{:?}", sort);
            assert!(!err.is_client_error());
        }
    }

    #[tokio::test]
    async fn test_filters_compose_with_window() {
        let store = scenario_store();
        let query = ListQuery::from_table(&EVENTS).filter("id", CompareOp::Ne, 3i64);

        let page = Paginator::default()
            .paginate(&store, query, BY_CREATED, &PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![1, 2, 4, 5]);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_cursor_past_end_of_shrinking_dataset() {
        let store = scenario_store();
        let first = fetch(&store, &PageRequest::first(4)).await;
        assert_eq!(ids(&first), vec![1, 2, 3, 4]);

        store.delete_where(&EVENTS, |r| r.int("id").unwrap() >= 5);
        let empty =
            fetch(&store, &PageRequest::first(4).with_cursor(first.next_cursor.unwrap())).await;
        assert!(empty.is_empty());
        assert!(!empty.has_next);
        assert!(empty.has_prev);

        // The reissued prev cursor still leads back to the rows before the gap
        let back =
            fetch(&store, &PageRequest::first(2).with_cursor(empty.prev_cursor.unwrap())).await;
        assert_eq!(ids(&back), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_prev_cursor_into_emptied_dataset() {
        let store = scenario_store();
        let first = fetch(&store, &PageRequest::first(2)).await;
        let second =
            fetch(&store, &PageRequest::first(2).with_cursor(first.next_cursor.unwrap())).await;
        assert_eq!(ids(&second), vec![3, 4]);

        store.delete_where(&EVENTS, |_| true);
        let back =
            fetch(&store, &PageRequest::first(2).with_cursor(second.prev_cursor.unwrap())).await;
        assert!(back.is_empty());
        assert!(!back.has_next);
        assert!(back.next_cursor.is_none());
        assert!(!back.has_prev);
        assert!(back.prev_cursor.is_none());
    }

    #[tokio::test]
    async fn test_one_query_per_page() {
        let store = scenario_store();
        let first = fetch(&store, &PageRequest::first(2)).await;
        fetch(&store, &PageRequest::first(2).with_cursor(first.next_cursor.unwrap())).await;
        assert_eq!(store.queries_issued(), 2);

        // Nothing else reached the store between pages
        let rows = store.fetch_all(&ListQuery::from_table(&EVENTS)).await.unwrap();
        assert_eq!(rows.len(), 5);
    }
}
