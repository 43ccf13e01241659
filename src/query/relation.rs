//! Single-valued relationship declarations

use crate::core::types::TableSchema;

/// A many-to-one (or one-to-one) link from a base table to a related table.
///
/// `base.local_key = target.foreign_key`, where `foreign_key` identifies at
/// most one row of the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub name: &'static str,
    pub target: &'static TableSchema,
    pub local_key: &'static str,
    pub foreign_key: &'static str,
}

impl Relationship {
    pub const fn new(
        name: &'static str,
        target: &'static TableSchema,
        local_key: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self { name, target, local_key, foreign_key }
    }
}
