//! # Genre Repository
//!
//! Genres are listed by title. The slug is derived from the title once, at
//! creation; renaming a genre keeps its slug.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use bookstore_core::slug::generate_slug;
use bookstore_core::validation::{validate_genre, validate_genre_title};
use bookstore_core::{Book, Clock, Genre, NewGenre};

/// Repository for genre database operations.
#[derive(Debug, Clone)]
pub struct GenreRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl GenreRepository {
    /// Creates a new GenreRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        GenreRepository { pool, clock }
    }

    /// Inserts a genre, assigning its ID and slug.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - title already taken
    pub async fn create(&self, new: &NewGenre) -> DbResult<Genre> {
        validate_genre(new)?;

        let title = new.title.trim();
        let genre = Genre {
            id: generate_id(),
            title: title.to_string(),
            slug: generate_slug(title, self.clock.as_ref()),
        };

        debug!(id = %genre.id, slug = %genre.slug, "Creating genre");

        sqlx::query("INSERT INTO genres (id, title, slug) VALUES (?1, ?2, ?3)")
            .bind(&genre.id)
            .bind(&genre.title)
            .bind(&genre.slug)
            .execute(&self.pool)
            .await?;

        Ok(genre)
    }

    /// Renames a genre. The slug is left as it was.
    pub async fn update(&self, genre: &Genre) -> DbResult<()> {
        validate_genre_title(&genre.title)?;

        debug!(id = %genre.id, "Updating genre");

        let result = sqlx::query("UPDATE genres SET title = ?2 WHERE id = ?1")
            .bind(&genre.id)
            .bind(genre.title.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Genre", &genre.id));
        }

        Ok(())
    }

    /// Gets a genre by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, title, slug FROM genres WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(genre)
    }

    /// Gets a genre by slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Genre>> {
        let genre =
            sqlx::query_as::<_, Genre>("SELECT id, title, slug FROM genres WHERE slug = ?1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(genre)
    }

    /// Lists all genres by title.
    pub async fn list(&self) -> DbResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, title, slug FROM genres ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(genres)
    }

    /// Books tagged with this genre.
    pub async fn books(&self, genre_id: &str) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.description, b.publish_date,
                   b.price_cents, b.stock, b.cover_image
            FROM books b
            JOIN book_genres bg ON bg.book_id = b.id
            WHERE bg.genre_id = ?1
            ORDER BY b.title
            "#,
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Deletes a genre. Book links go with it; books stay.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting genre");

        let result = sqlx::query("DELETE FROM genres WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Genre", id));
        }

        Ok(())
    }
}
