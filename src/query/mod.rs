//! Eager-loading list query builder.

pub mod builder;
pub mod relation;

pub use builder::{CompareOp, Filter, KeysetBound, ListQuery, OrderTerm, with_related};
pub use relation::Relationship;
