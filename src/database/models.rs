use crate::core::record::{Entity, FromRecord, Record, RecordError};
use crate::core::types::{Column, TableSchema, ValueKind};
use crate::query::Relationship;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    columns: &[
        Column::new("id", ValueKind::Int).unique(),
        Column::new("name", ValueKind::Text),
        Column::new("email", ValueKind::Text).unique(),
        Column::new("phone", ValueKind::Text).nullable(),
        Column::new("created_at", ValueKind::Timestamp),
    ],
};

pub static BOOKINGS: TableSchema = TableSchema {
    name: "bookings",
    columns: &[
        Column::new("id", ValueKind::Int).unique(),
        Column::new("customer_id", ValueKind::Int).nullable(),
        Column::new("status", ValueKind::Text),
        Column::new("guest_count", ValueKind::Int),
        Column::new("event_start", ValueKind::Timestamp),
        Column::new("created_at", ValueKind::Timestamp),
    ],
};

/// Booking has one customer
pub static BOOKING_CUSTOMER: Relationship =
    Relationship::new("customer", &CUSTOMERS, "customer_id", "id");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FromRecord for Customer {
    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: record.int("id")?,
            name: record.text("name")?,
            email: record.text("email")?,
            phone: record.opt_text("phone")?,
            created_at: record.timestamp("created_at")?,
        })
    }
}

impl Entity for Customer {
    const SCHEMA: &'static TableSchema = &CUSTOMERS;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub status: BookingStatus,
    pub guest_count: i64,
    pub event_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FromRecord for Booking {
    fn from_record(record: &Record) -> Result<Self, RecordError> {
        let status = record.text("status")?;
        Ok(Self {
            id: record.int("id")?,
            customer_id: record.opt_int("customer_id")?,
            status: status.parse().map_err(|message| RecordError::InvalidValue {
                field: "status".to_string(),
                message,
            })?,
            guest_count: record.int("guest_count")?,
            event_start: record.timestamp("event_start")?,
            created_at: record.timestamp("created_at")?,
        })
    }
}

impl Entity for Booking {
    const SCHEMA: &'static TableSchema = &BOOKINGS;
}

/// Booking row with its customer pre-fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingWithCustomer {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: Option<Customer>,
}

impl FromRecord for BookingWithCustomer {
    fn from_record(record: &Record) -> Result<Self, RecordError> {
        let customer = match record.related(BOOKING_CUSTOMER.name)? {
            Some(related) => Some(Customer::from_record(related)?),
            None => None,
        };
        Ok(Self { booking: Booking::from_record(record)?, customer })
    }
}

impl Entity for BookingWithCustomer {
    const SCHEMA: &'static TableSchema = &BOOKINGS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_booking_requires_loaded_customer() {
        let at = Utc.with_ymd_and_hms(2025, 8, 2, 17, 0, 0).unwrap();
        let mut record = Record::new()
            .with("id", 10i64)
            .with("customer_id", 3i64)
            .with("status", "confirmed")
            .with("guest_count", 12i64)
            .with("event_start", at)
            .with("created_at", at);

        assert_eq!(
            BookingWithCustomer::from_record(&record),
            Err(RecordError::RelationNotLoaded("customer".to_string()))
        );

        record.set_related(
            "customer",
            Some(
                Record::new()
                    .with("id", 3i64)
                    .with("name", "Kenji")
                    .with("email", "kenji@example.com")
                    .with("created_at", at),
            ),
        );
        let booking = BookingWithCustomer::from_record(&record).unwrap();
        assert_eq!(booking.booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.customer.unwrap().name, "Kenji");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let at = Utc.with_ymd_and_hms(2025, 8, 2, 17, 0, 0).unwrap();
        let record = Record::new()
            .with("id", 1i64)
            .with("status", "teppanyaki")
            .with("guest_count", 2i64)
            .with("event_start", at)
            .with("created_at", at);

        assert!(matches!(Booking::from_record(&record), Err(RecordError::InvalidValue { .. })));
    }
}
