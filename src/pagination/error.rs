//! Pagination error types.

use crate::core::executor::StoreError;
use crate::core::record::RecordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("invalid limit {requested}: must be between 1 and {max}")]
    InvalidLimit { requested: i64, max: u32 },

    #[error("invalid sort: {0}")]
    InvalidSort(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("decode error: {0}")]
    Decode(#[from] RecordError),
}

impl PaginationError {
    /// Errors caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCursor(_) | Self::InvalidLimit { .. })
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::InvalidLimit { .. } => "invalid_limit",
            Self::InvalidSort(_) => "invalid_sort",
            Self::Store(_) => "store_error",
            Self::Decode(_) => "decode_error",
        }
    }
}

pub type PaginationResult<T> = Result<T, PaginationError>;
