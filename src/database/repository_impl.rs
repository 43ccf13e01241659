//! Implementation of the repository traits over any query executor

use crate::core::executor::QueryExecutor;
use crate::core::record::FromRecord;
use crate::database::models::{BOOKING_CUSTOMER, BookingWithCustomer, Customer};
use crate::database::repository::{BookingFilter, BookingRepository, BookingSort};
use crate::pagination::{Page, PageRequest, PaginationResult, Paginator, SortSpec};
use crate::query::{CompareOp, ListQuery, with_related};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

const CUSTOMER_SORT: SortSpec = SortSpec::new("created_at", "id");

/// Booking catalog backed by a [`QueryExecutor`]
pub struct CatalogRepository<E: ?Sized> {
    executor: Arc<E>,
    paginator: Paginator,
}

impl<E: ?Sized> Clone for CatalogRepository<E> {
    fn clone(&self) -> Self {
        Self { executor: self.executor.clone(), paginator: self.paginator.clone() }
    }
}

impl<E> CatalogRepository<E>
where
    E: QueryExecutor + ?Sized,
{
    pub fn new(executor: Arc<E>, paginator: Paginator) -> Self {
        Self { executor, paginator }
    }

    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    fn bookings_query(filter: &BookingFilter) -> ListQuery {
        let query = ListQuery::of::<BookingWithCustomer>()
            .filter_opt("status", CompareOp::Eq, filter.status.map(|s| s.as_str()))
            .filter_opt("customer_id", CompareOp::Eq, filter.customer_id);
        with_related(query, BOOKING_CUSTOMER)
    }
}

#[async_trait]
impl<E> BookingRepository for CatalogRepository<E>
where
    E: QueryExecutor + ?Sized + 'static,
{
    #[instrument(skip(self, request), fields(sort = %sort))]
    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        sort: BookingSort,
        request: &PageRequest,
    ) -> PaginationResult<Page<BookingWithCustomer>> {
        let query = Self::bookings_query(filter);
        self.paginator.paginate_as(self.executor.as_ref(), query, sort.spec(), request).await
    }

    #[instrument(skip(self, request))]
    async fn list_customers(&self, request: &PageRequest) -> PaginationResult<Page<Customer>> {
        self.paginator
            .paginate_as(self.executor.as_ref(), ListQuery::of::<Customer>(), CUSTOMER_SORT, request)
            .await
    }

    async fn get_customer(&self, id: i64) -> PaginationResult<Option<Customer>> {
        let query = ListQuery::of::<Customer>().filter("id", CompareOp::Eq, id);
        let rows = self.executor.fetch_all(&query).await?;
        Ok(rows.first().map(Customer::from_record).transpose()?)
    }
}
