//! Core record model and the query executor seam
pub mod executor;
pub mod memory;
pub mod record;
pub mod types;

// Re-export common types
pub use executor::{QueryExecutor, StoreError, load_related_per_row, validate_query};
pub use memory::InMemoryStore;
pub use record::{Entity, FromRecord, Record, RecordError};
pub use types::{Column, Direction, TableSchema, Value, ValueKind};
