//! # Repository Module
//!
//! One repository per table family. Each holds a cloned pool handle, so
//! creating one is cheap: `db.books()`, `db.carts()`, ...
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Account owners (identity lives elsewhere)
//! - [`author::AuthorRepository`] - Authors with slug-once semantics
//! - [`genre::GenreRepository`] - Genres with slug-once semantics
//! - [`book::BookRepository`] - Books, relations and derived views
//! - [`review::ReviewRepository`] - Reviews per book and user
//! - [`cart::CartRepository`] - Carts and the line-item engine

pub mod author;
pub mod book;
pub mod cart;
pub mod genre;
pub mod review;
pub mod user;

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Generates a new primary key.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fails with `NotFound` unless `table` has a row with this `id`.
///
/// `table` is always a literal from this crate, never caller input.
pub(crate) async fn ensure_exists<'c, E>(
    executor: E,
    table: &'static str,
    entity: &'static str,
    id: &str,
) -> DbResult<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DbError::not_found(entity, id)),
    }
}

/// A row a write depends on: `(table, entity, id)`.
pub(crate) type Parent<'a> = (&'static str, &'static str, &'a str);

/// Turns a foreign key failure into `NotFound` for the first missing parent.
///
/// Writes run before these lookups, so a transaction never holds a read
/// snapshot while waiting for the write lock. Other errors pass through.
pub(crate) async fn explain_missing_parent(
    pool: &SqlitePool,
    err: DbError,
    parents: &[Parent<'_>],
) -> DbError {
    if !matches!(err, DbError::ForeignKeyViolation { .. }) {
        return err;
    }

    for &(table, entity, id) in parents {
        if let Err(missing) = ensure_exists(pool, table, entity, id).await {
            return missing;
        }
    }

    err
}
