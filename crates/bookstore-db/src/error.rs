//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (bookstore-core) ──┐                                  │
//! │  SQLite Error (sqlx::Error) ────────┼──► DbError (this module)         │
//! │                                     │         │                         │
//! │                                     │         ▼                         │
//! │                                     │   caller / presentation layer     │
//! │                                     │   (turns NotFound into a 404)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is retried or swallowed here: the first error wins.

use bookstore_core::{CoreError, ValidationError};
use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - A book, cart, author, genre, review or user ID does not exist
    /// - Cart operations on a book ID that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate genre title
    /// - Slug collision (same name saved twice within one second)
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A referenced row is deleted between the existence check and the
    ///   insert that needs it
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The pool could not open or reuse a connection.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An embedded migration could not be applied.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement for a reason not classified above
    /// (CHECK constraints included).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Input rejected before reaching SQL.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Domain rule violated.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for [`DbError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Classifies sqlx failures.
///
/// ## Error Mapping
/// ```text
/// RowNotFound                    → NotFound { entity: "Record" }
/// Database, kind UniqueViolation → UniqueViolation { field: "<table>.<column>" }
/// Database, kind ForeignKey...   → ForeignKeyViolation
/// Database, anything else        → QueryFailed
/// PoolTimedOut                   → PoolExhausted
/// PoolClosed                     → ConnectionFailed
/// everything else                → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => classify_constraint(db_err.as_ref()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

fn classify_constraint(db_err: &dyn DatabaseError) -> DbError {
    let message = db_err.message();

    match db_err.kind() {
        ErrorKind::UniqueViolation => {
            // SQLite reports "UNIQUE constraint failed: genres.title"
            let field = message
                .split_once(": ")
                .map_or("unknown", |(_, columns)| columns);
            DbError::UniqueViolation {
                field: field.to_string(),
            }
        }
        ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
            message: message.to_string(),
        },
        _ => DbError::QueryFailed(message.to_string()),
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Book", "b-1");
        assert_eq!(err.to_string(), "Book not found: b-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_converts() {
        let err: DbError = ValidationError::Required {
            field: "title".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(!err.is_not_found());
    }
}
