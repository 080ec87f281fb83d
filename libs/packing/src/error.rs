//! Error types for packing operations

use std::fmt;

use common::error::DatabaseError;
use thiserror::Error;

/// Kind of entity a failed lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    List,
    Category,
    Item,
    Template,
    ModerationRecord,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "User",
            EntityKind::List => "List",
            EntityKind::Category => "Category",
            EntityKind::Item => "Item",
            EntityKind::Template => "Template",
            EntityKind::ModerationRecord => "ModerationRecord",
        };
        f.write_str(name)
    }
}

/// Error raised by every packing operation
///
/// Failures are raised as soon as they are detected and end the operation;
/// there is no partial-success result.
#[derive(Error, Debug)]
pub enum PackingError {
    /// A lookup-by-id required by the operation came back empty
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The acting user may not perform this operation on the target
    #[error("Unauthorized")]
    Unauthorized,

    /// Input rejected at the boundary
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The underlying store failed
    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

impl PackingError {
    /// Build a `NotFound` for the given kind and id
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        PackingError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Type alias for packing results
pub type PackingResult<T> = Result<T, PackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_kind_and_id() {
        let err = PackingError::not_found(EntityKind::Category, "abc");
        assert_eq!(err.to_string(), "Category not found: abc");
    }

    #[test]
    fn store_errors_convert() {
        let err: PackingError = DatabaseError::Transaction("already committed".to_string()).into();
        assert!(matches!(err, PackingError::Store(_)));
    }
}
