//! Page results.

use serde::Serialize;

/// One page of items plus navigation cursors.
///
/// `has_next`/`has_prev` are always consistent with the presence of the
/// matching cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>, prev_cursor: Option<String>) -> Self {
        Self {
            items,
            has_next: next_cursor.is_some(),
            has_prev: prev_cursor.is_some(),
            next_cursor,
            prev_cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            prev_cursor: self.prev_cursor,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
            next_cursor: self.next_cursor,
            prev_cursor: self.prev_cursor,
            has_next: self.has_next,
            has_prev: self.has_prev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_cursors() {
        let page = Page::new(vec![1, 2], Some("n".to_string()), None);
        assert!(page.has_next);
        assert!(!page.has_prev);

        let json = serde_json::to_value(page.map(|n| n * 10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": [10, 20],
                "next_cursor": "n",
                "prev_cursor": null,
                "has_next": true,
                "has_prev": false,
            })
        );
    }
}
