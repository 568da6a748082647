//! # User Repository
//!
//! Minimal owner records for reviews and carts. Deleting a user removes
//! their reviews and carts, and through the carts their line items.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use bookstore_core::validation::ValidationResult;
use bookstore_core::{User, ValidationError};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user with a fresh ID.
    pub async fn create(&self, username: &str) -> DbResult<User> {
        validate_username(username)?;

        let user = User {
            id: generate_id(),
            username: username.trim().to_string(),
        };

        debug!(id = %user.id, username = %user.username, "Creating user");

        sqlx::query("INSERT INTO users (id, username) VALUES (?1, ?2)")
            .bind(&user.id)
            .bind(&user.username)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Deletes a user and, in cascade, their reviews and carts.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts users (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn validate_username(username: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::*;
    use crate::DbError;

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, _) = test_db().await;
        let user = user(&db, "reader").await;

        let found = db.users().get_by_id(&user.id).await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (db, _) = test_db().await;
        user(&db, "reader").await;

        let err = db.users().create("reader").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let (db, _) = test_db().await;
        let err = db.users().delete("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
