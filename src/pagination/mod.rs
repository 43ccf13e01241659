//! Cursor-based pagination over list queries.

pub mod cursor;
pub mod error;
pub mod page;
pub mod paginator;
pub mod request;

#[cfg(test)]
mod paginator_tests;

pub use cursor::{Cursor, CursorKey, Navigation, OrderSignature, decode_cursor, encode_cursor};
pub use error::{PaginationError, PaginationResult};
pub use page::Page;
pub use paginator::{Paginator, SortSpec};
pub use request::{PageLimits, PageRequest};
