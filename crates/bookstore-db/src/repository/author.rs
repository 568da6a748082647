//! # Author Repository
//!
//! ## Slug Lifecycle
//! ```text
//! create(NewAuthor)  ──► slug = generate_slug(first + last, clock)   (once)
//! update(&Author)    ──► first_name / last_name only; slug column untouched
//! ```

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use bookstore_core::slug::{author_slug_source, generate_slug};
use bookstore_core::validation::{validate_author, validate_author_names};
use bookstore_core::{Author, Book, Clock, NewAuthor};

/// Repository for author database operations.
#[derive(Debug, Clone)]
pub struct AuthorRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl AuthorRepository {
    /// Creates a new AuthorRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        AuthorRepository { pool, clock }
    }

    /// Inserts an author, assigning its ID and slug.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - slug collision (same name, same second)
    pub async fn create(&self, new: &NewAuthor) -> DbResult<Author> {
        validate_author(new)?;

        let author = Author {
            id: generate_id(),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            slug: generate_slug(
                &author_slug_source(new.first_name.trim(), new.last_name.trim()),
                self.clock.as_ref(),
            ),
        };

        debug!(id = %author.id, slug = %author.slug, "Creating author");

        sqlx::query(
            r#"
            INSERT INTO authors (id, first_name, last_name, slug)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&author.id)
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.slug)
        .execute(&self.pool)
        .await?;

        Ok(author)
    }

    /// Saves name changes. The slug keeps the value assigned at creation.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Author doesn't exist
    pub async fn update(&self, author: &Author) -> DbResult<()> {
        validate_author_names(&author.first_name, &author.last_name)?;

        debug!(id = %author.id, "Updating author");

        let result = sqlx::query(
            r#"
            UPDATE authors SET
                first_name = ?2,
                last_name = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&author.id)
        .bind(author.first_name.trim())
        .bind(author.last_name.trim())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Author", &author.id));
        }

        Ok(())
    }

    /// Gets an author by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, slug FROM authors WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }

    /// Gets an author by slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, slug FROM authors WHERE slug = ?1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }

    /// Lists all authors in natural order (by last name).
    pub async fn list(&self) -> DbResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, first_name, last_name, slug
            FROM authors
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// Books linked to this author through the relation.
    pub async fn books(&self, author_id: &str) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.description, b.publish_date,
                   b.price_cents, b.stock, b.cover_image
            FROM books b
            JOIN book_authors ba ON ba.book_id = b.id
            WHERE ba.author_id = ?1
            ORDER BY b.title
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Deletes an author. Book links go with it; books stay.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting author");

        let result = sqlx::query("DELETE FROM authors WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Author", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::NewAuthor;

    use crate::repository::test_support::*;
    use crate::DbError;

    fn new_author(first: &str, last: &str) -> NewAuthor {
        NewAuthor {
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_slug() {
        let (db, _) = test_db().await;
        let author = db
            .authors()
            .create(&new_author("Taras", "Shevchenko"))
            .await
            .unwrap();

        assert_eq!(author.slug, format!("tarasshevchenko-{T0}"));
        let by_slug = db.authors().get_by_slug(&author.slug).await.unwrap();
        assert_eq!(by_slug, Some(author));
    }

    #[tokio::test]
    async fn test_update_keeps_slug() {
        let (db, clock) = test_db().await;
        let mut author = db
            .authors()
            .create(&new_author("Ivan", "Franko"))
            .await
            .unwrap();
        let original_slug = author.slug.clone();

        clock.advance(3600);
        author.first_name = "Ivan Yakovych".to_string();
        author.slug = "tampered".to_string();
        db.authors().update(&author).await.unwrap();

        let stored = db.authors().get_by_id(&author.id).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Ivan Yakovych");
        assert_eq!(stored.slug, original_slug);
    }

    #[tokio::test]
    async fn test_same_name_same_second_collides() {
        let (db, clock) = test_db().await;
        db.authors().create(&new_author("Anna", "K")).await.unwrap();

        let err = db.authors().create(&new_author("Anna", "K")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        clock.advance(1);
        let second = db.authors().create(&new_author("Anna", "K")).await.unwrap();
        assert_eq!(second.slug, format!("annak-{}", T0 + 1));
    }

    #[tokio::test]
    async fn test_list_orders_by_last_name() {
        let (db, clock) = test_db().await;
        for (first, last) in [("Lina", "Kostenko"), ("Oles", "Honchar"), ("Vasyl", "Stus")] {
            db.authors().create(&new_author(first, last)).await.unwrap();
            clock.advance(1);
        }

        let names: Vec<String> = db
            .authors()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.last_name)
            .collect();
        assert_eq!(names, ["Honchar", "Kostenko", "Stus"]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (db, _) = test_db().await;
        let err = db.authors().create(&new_author("", "Nobody")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_author() {
        let (db, _) = test_db().await;
        let mut author = db.authors().create(&new_author("A", "B")).await.unwrap();
        author.id = "missing".to_string();
        assert!(db.authors().update(&author).await.unwrap_err().is_not_found());
    }
}
