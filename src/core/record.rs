//! Row representation shared by every query executor

use crate::core::types::{TableSchema, Value, ValueKind};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while mapping a [`Record`] into a typed entity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing field: {0}")]
    MissingField(String),

    #[error("field {field} expected {expected}, found {found}")]
    TypeMismatch { field: String, expected: ValueKind, found: String },

    #[error("relationship {0} was not loaded")]
    RelationNotLoaded(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// A fetched row: column values plus any pre-fetched related rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
    related: BTreeMap<String, Option<Record>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Value of a field, treating a missing field as `Null`
    pub fn value(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&Value::Null)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attach a pre-fetched related record (or its confirmed absence)
    pub fn set_related(&mut self, name: impl Into<String>, record: Option<Record>) {
        self.related.insert(name.into(), record);
    }

    /// Related record for a pre-fetched relationship.
    ///
    /// Errors when the relationship was never loaded, which is how a caller
    /// notices it forgot to eager-load instead of silently seeing `None`.
    pub fn related(&self, name: &str) -> Result<Option<&Record>, RecordError> {
        match self.related.get(name) {
            Some(record) => Ok(record.as_ref()),
            None => Err(RecordError::RelationNotLoaded(name.to_string())),
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.related.contains_key(name)
    }

    /// Keep only the columns declared by `schema`
    pub fn project(&self, schema: &TableSchema) -> Record {
        let fields = schema
            .columns
            .iter()
            .filter_map(|c| self.fields.get(c.name).map(|v| (c.name.to_string(), v.clone())))
            .collect();
        Record { fields, related: BTreeMap::new() }
    }

    fn require(&self, field: &str) -> Result<&Value, RecordError> {
        self.fields.get(field).ok_or_else(|| RecordError::MissingField(field.to_string()))
    }

    fn mismatch(field: &str, expected: ValueKind, found: &Value) -> RecordError {
        RecordError::TypeMismatch {
            field: field.to_string(),
            expected,
            found: found.kind().map(|k| k.to_string()).unwrap_or_else(|| "null".to_string()),
        }
    }

    pub fn int(&self, field: &str) -> Result<i64, RecordError> {
        match self.require(field)? {
            Value::Int(v) => Ok(*v),
            other => Err(Self::mismatch(field, ValueKind::Int, other)),
        }
    }

    pub fn opt_int(&self, field: &str) -> Result<Option<i64>, RecordError> {
        match self.value(field) {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(field, ValueKind::Int, other)),
        }
    }

    pub fn text(&self, field: &str) -> Result<String, RecordError> {
        match self.require(field)? {
            Value::Text(v) => Ok(v.clone()),
            other => Err(Self::mismatch(field, ValueKind::Text, other)),
        }
    }

    pub fn opt_text(&self, field: &str) -> Result<Option<String>, RecordError> {
        match self.value(field) {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            other => Err(Self::mismatch(field, ValueKind::Text, other)),
        }
    }

    pub fn bool(&self, field: &str) -> Result<bool, RecordError> {
        match self.require(field)? {
            Value::Bool(v) => Ok(*v),
            other => Err(Self::mismatch(field, ValueKind::Bool, other)),
        }
    }

    pub fn timestamp(&self, field: &str) -> Result<DateTime<Utc>, RecordError> {
        match self.require(field)? {
            Value::Timestamp(v) => Ok(*v),
            other => Err(Self::mismatch(field, ValueKind::Timestamp, other)),
        }
    }

    pub fn uuid(&self, field: &str) -> Result<Uuid, RecordError> {
        match self.require(field)? {
            Value::Uuid(v) => Ok(*v),
            other => Err(Self::mismatch(field, ValueKind::Uuid, other)),
        }
    }
}

/// Typed entities built from a [`Record`]
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self, RecordError>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(record.clone())
    }
}

/// Entities backed by a table
pub trait Entity: FromRecord {
    const SCHEMA: &'static TableSchema;
}
