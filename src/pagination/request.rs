//! Page requests and limit bounds.

use crate::config::PaginationConfig;
use crate::core::types::Direction;
use crate::pagination::error::{PaginationError, PaginationResult};
use serde::Deserialize;

/// Input to a paginated query
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    /// Opaque token from a previous page; absent for the first page
    #[serde(default)]
    pub cursor: Option<String>,
    /// Requested page size; absent uses the configured default
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub direction: Direction,
}

impl PageRequest {
    pub fn first(limit: i64) -> Self {
        Self { cursor: None, limit: Some(limit), direction: Direction::Asc }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Bounds applied to requested page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default_limit: 50, max_limit: 200 }
    }
}

impl From<&PaginationConfig> for PageLimits {
    fn from(config: &PaginationConfig) -> Self {
        Self { default_limit: config.default_limit, max_limit: config.max_limit }
    }
}

impl PageLimits {
    /// Resolve a requested limit, rejecting values outside `1..=max_limit`
    pub fn resolve(&self, requested: Option<i64>) -> PaginationResult<usize> {
        let limit = requested.unwrap_or(i64::from(self.default_limit));
        if limit < 1 || limit > i64::from(self.max_limit) {
            return Err(PaginationError::InvalidLimit { requested: limit, max: self.max_limit });
        }
        Ok(limit as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limits() {
        let limits = PageLimits::default();

        assert_eq!(limits.resolve(None).unwrap(), 50);
        assert_eq!(limits.resolve(Some(1)).unwrap(), 1);
        assert_eq!(limits.resolve(Some(200)).unwrap(), 200);
        assert!(matches!(
            limits.resolve(Some(0)),
            Err(PaginationError::InvalidLimit { requested: 0, max: 200 })
        ));
        assert!(matches!(limits.resolve(Some(-5)), Err(PaginationError::InvalidLimit { .. })));
        assert!(matches!(limits.resolve(Some(201)), Err(PaginationError::InvalidLimit { .. })));
    }

    #[test]
    fn test_request_deserializes_from_query_params() {
        let request: PageRequest =
            serde_json::from_value(serde_json::json!({ "limit": 10, "direction": "desc" })).unwrap();
        assert_eq!(request.limit, Some(10));
        assert_eq!(request.direction, Direction::Desc);
        assert_eq!(request.cursor, None);
    }
}
