//! Hibachi Pager - cursor pagination for the booking catalog
//!
//! Provides keyset pagination with opaque cursors over list queries that can
//! pre-fetch related records, backed by PostgreSQL or an in-memory store.

pub mod api;
pub mod config;
pub mod core;
pub mod database;
pub mod error;
pub mod metrics;
pub mod pagination;
pub mod query;
