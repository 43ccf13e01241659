//! Database module for PostgreSQL interactions
pub mod client;
pub mod error;
pub mod executor;
pub mod models;
pub mod repository;
pub mod repository_impl;


// Re-export most commonly used types
pub use client::Database;
pub use error::Error;
pub use executor::PgExecutor;
pub use models::{Booking, BookingStatus, BookingWithCustomer, Customer};
pub use repository::{BookingFilter, BookingRepository, BookingSort};
pub use repository_impl::CatalogRepository;
