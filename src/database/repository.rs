//! Repository traits for the booking catalog
use crate::database::models::{BookingStatus, BookingWithCustomer, Customer};
use crate::pagination::{Page, PageRequest, PaginationResult, SortSpec};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Orderings a booking listing can be paged by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSort {
    #[default]
    CreatedAt,
    EventStart,
}

impl BookingSort {
    pub fn spec(&self) -> SortSpec {
        match self {
            Self::CreatedAt => SortSpec::new("created_at", "id"),
            Self::EventStart => SortSpec::new("event_start", "id"),
        }
    }
}

impl fmt::Display for BookingSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().order_by)
    }
}

impl FromStr for BookingSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "event_start" => Ok(Self::EventStart),
            other => Err(format!("unknown booking sort: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub customer_id: Option<i64>,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Page through bookings with their customer pre-fetched
    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        sort: BookingSort,
        request: &PageRequest,
    ) -> PaginationResult<Page<BookingWithCustomer>>;

    /// Page through customers by creation time
    async fn list_customers(&self, request: &PageRequest) -> PaginationResult<Page<Customer>>;

    /// Get a single customer
    async fn get_customer(&self, id: i64) -> PaginationResult<Option<Customer>>;
}
