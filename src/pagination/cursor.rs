//! Opaque cursor tokens.
//!
//! A token is URL-safe base64 (no padding) of a small JSON payload carrying a
//! version, the signature of the ordering it was issued under, the navigation
//! it performs, and the composite key of the row it points at.

use crate::core::types::{Direction, Value, ValueKind};
use crate::pagination::error::{PaginationError, PaginationResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;

const CURSOR_VERSION: u8 = 1;
const MAX_CURSOR_LEN: usize = 512;

/// Which side of the cursor key a page is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    Next,
    Prev,
}

/// Identifies an ordering configuration; cursors only decode under their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSignature(String);

impl OrderSignature {
    pub fn new(table: &str, order_by: &str, secondary: &str, direction: Direction) -> Self {
        let material = format!("{}|{}|{}|{}", table, order_by, secondary, direction);
        let hash = blake3::hash(material.as_bytes());
        Self(hex::encode(&hash.as_bytes()[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite ordering key of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorKey {
    pub primary: Value,
    pub secondary: Value,
}

/// A decoded position: the rows strictly after (`Next`) or before (`Prev`)
/// `key`, or including it when `inclusive` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub navigation: Navigation,
    pub key: CursorKey,
    pub inclusive: bool,
}

impl Cursor {
    pub fn new(navigation: Navigation, key: CursorKey) -> Self {
        Self { navigation, key, inclusive: false }
    }

    pub fn inclusive(mut self) -> Self {
        self.inclusive = true;
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CursorPayload {
    v: u8,
    sig: String,
    nav: Navigation,
    key: (Value, Value),
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    incl: bool,
}

pub fn encode_cursor(signature: &OrderSignature, cursor: &Cursor) -> PaginationResult<String> {
    let payload = CursorPayload {
        v: CURSOR_VERSION,
        sig: signature.0.clone(),
        nav: cursor.navigation,
        key: (cursor.key.primary.clone(), cursor.key.secondary.clone()),
        incl: cursor.inclusive,
    };
    let bytes = serde_json::to_vec(&payload)
        .map_err(|e| PaginationError::InvalidCursor(format!("unencodable key: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode `token`, checking it was issued under `signature` and that its key
/// matches the kinds of the ordering columns.
pub fn decode_cursor(
    token: &str,
    signature: &OrderSignature,
    kinds: (ValueKind, ValueKind),
) -> PaginationResult<Cursor> {
    if token.is_empty() {
        return Err(PaginationError::InvalidCursor("empty cursor".to_string()));
    }
    if token.len() > MAX_CURSOR_LEN {
        return Err(PaginationError::InvalidCursor("cursor exceeds max length".to_string()));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| PaginationError::InvalidCursor(format!("malformed encoding: {}", e)))?;
    let payload: CursorPayload = serde_json::from_slice(&bytes)
        .map_err(|e| PaginationError::InvalidCursor(format!("malformed payload: {}", e)))?;

    if payload.v != CURSOR_VERSION {
        return Err(PaginationError::InvalidCursor(format!(
            "unsupported cursor version: {}",
            payload.v
        )));
    }
    if payload.sig != signature.0 {
        return Err(PaginationError::InvalidCursor(
            "cursor was issued under a different ordering".to_string(),
        ));
    }

    let (primary, secondary) = payload.key;
    if primary.kind() != Some(kinds.0) || secondary.kind() != Some(kinds.1) {
        return Err(PaginationError::InvalidCursor(format!(
            "cursor key does not match ordering columns ({}, {})",
            kinds.0, kinds.1
        )));
    }

    Ok(Cursor {
        navigation: payload.nav,
        key: CursorKey { primary, secondary },
        inclusive: payload.incl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn signature() -> OrderSignature {
        OrderSignature::new("bookings", "created_at", "id", Direction::Asc)
    }

    fn key() -> CursorKey {
        CursorKey {
            primary: Value::Timestamp(Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap()),
            secondary: Value::Int(42),
        }
    }

    const KINDS: (ValueKind, ValueKind) = (ValueKind::Timestamp, ValueKind::Int);

    #[test]
    fn test_decode_recovers_key_and_navigation() {
        let token = encode_cursor(&signature(), &Cursor::new(Navigation::Prev, key())).unwrap();
        let cursor = decode_cursor(&token, &signature(), KINDS).unwrap();

        assert_eq!(cursor.navigation, Navigation::Prev);
        assert_eq!(cursor.key, key());
        assert!(!cursor.inclusive);

        let token =
            encode_cursor(&signature(), &Cursor::new(Navigation::Next, key()).inclusive()).unwrap();
        assert!(decode_cursor(&token, &signature(), KINDS).unwrap().inclusive);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = encode_cursor(&signature(), &Cursor::new(Navigation::Next, key())).unwrap();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_rejects_corrupted_base64() {
        let err = decode_cursor("not*base64!", &signature(), KINDS).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidCursor(ref m) if m.starts_with("malformed encoding")));
    }

    #[test]
    fn test_rejects_valid_base64_with_wrong_shape() {
        let token = URL_SAFE_NO_PAD.encode(br#"{"v":1,"sig":"x","nav":"next"}"#);
        let err = decode_cursor(&token, &signature(), KINDS).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidCursor(ref m) if m.starts_with("malformed payload")));
    }

    #[test]
    fn test_rejects_other_ordering() {
        let token = encode_cursor(&signature(), &Cursor::new(Navigation::Next, key())).unwrap();
        let descending = OrderSignature::new("bookings", "created_at", "id", Direction::Desc);
        let by_event = OrderSignature::new("bookings", "event_start", "id", Direction::Asc);

        assert!(matches!(
            decode_cursor(&token, &descending, KINDS),
            Err(PaginationError::InvalidCursor(_))
        ));
        assert!(matches!(
            decode_cursor(&token, &by_event, KINDS),
            Err(PaginationError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_rejects_key_of_wrong_kind() {
        let key = CursorKey { primary: Value::Text("2025-03-14".into()), secondary: Value::Int(1) };
        let token = encode_cursor(&signature(), &Cursor::new(Navigation::Next, key)).unwrap();
        assert!(matches!(
            decode_cursor(&token, &signature(), KINDS),
            Err(PaginationError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_and_empty_tokens() {
        assert!(decode_cursor("", &signature(), KINDS).is_err());
        assert!(decode_cursor(&"a".repeat(MAX_CURSOR_LEN + 1), &signature(), KINDS).is_err());
    }

    #[test]
    fn test_rejects_future_version() {
        let payload = serde_json::json!({
            "v": 2,
            "sig": signature().as_str(),
            "nav": "next",
            "key": [{"t": "int", "v": 1}, {"t": "int", "v": 2}],
        });
        let token = URL_SAFE_NO_PAD.encode(payload.to_string());
        let err = decode_cursor(&token, &signature(), KINDS).unwrap_err();
        assert!(err.to_string().contains("unsupported cursor version"));
    }
}
