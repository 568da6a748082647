//! # Book Repository
//!
//! Database operations for books, their genre/author relations and the
//! derived views shown on a book page.
//!
//! ## Derived Views
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  genre_titles(book)  ──► ["Classics", "Drama"]         (title order)    │
//! │  genres_text(book)   ──► "Classics\nDrama"                              │
//! │  author_names(book)  ──► ["Lesya Ukrainka", ...]       (last_name order)│
//! │  authors_text(book)  ──► "Lesya Ukrainka\n..."                          │
//! │  reviews(book)       ──► [Review, ...]                                  │
//! │                                                                         │
//! │  The legacy `author` byline never feeds author_names.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{explain_missing_parent, generate_id};
use bookstore_core::validation::{validate_book, validate_book_fields, validate_cover_filename};
use bookstore_core::{cover_upload_path, Book, Clock, NewBook, Review, DEFAULT_COVER_IMAGE};

const BOOK_COLUMNS: &str =
    "id, title, author, description, publish_date, price_cents, stock, cover_image";

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        BookRepository { pool, clock }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Inserts a book.
    ///
    /// A missing `publish_date` becomes today's date at the moment of this
    /// insert, not a date frozen when the schema was defined.
    pub async fn create(&self, new: &NewBook) -> DbResult<Book> {
        validate_book(new)?;

        let book = Book {
            id: generate_id(),
            title: new.title.trim().to_string(),
            author: new.author.trim().to_string(),
            description: new.description.clone(),
            publish_date: new.publish_date.unwrap_or_else(|| self.clock.today()),
            price_cents: new.price.cents(),
            stock: new.stock,
            cover_image: new
                .cover_image
                .clone()
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
        };

        debug!(id = %book.id, title = %book.title, "Creating book");

        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, author, description, publish_date,
                price_cents, stock, cover_image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.publish_date)
        .bind(book.price_cents)
        .bind(book.stock)
        .bind(&book.cover_image)
        .execute(&self.pool)
        .await?;

        Ok(book)
    }

    /// Gets a book by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Gets a book by ID, failing with `NotFound` if it doesn't exist.
    pub async fn get(&self, id: &str) -> DbResult<Book> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Book", id))
    }

    /// Lists all books by title.
    pub async fn list(&self) -> DbResult<Vec<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY title");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Updates every stored field of a book.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Book doesn't exist
    pub async fn update(&self, book: &Book) -> DbResult<()> {
        validate_book_fields(&book.title, &book.author, book.price_cents)?;

        debug!(id = %book.id, "Updating book");

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = ?2,
                author = ?3,
                description = ?4,
                publish_date = ?5,
                price_cents = ?6,
                stock = ?7,
                cover_image = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&book.id)
        .bind(book.title.trim())
        .bind(book.author.trim())
        .bind(&book.description)
        .bind(book.publish_date)
        .bind(book.price_cents)
        .bind(book.stock)
        .bind(&book.cover_image)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", &book.id));
        }

        Ok(())
    }

    /// Changes stock by `delta`. Stock is allowed to go negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let result = sqlx::query("UPDATE books SET stock = stock + ?2 WHERE id = ?1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    /// Records an uploaded cover and returns its media path
    /// (`books/<id>/<filename>`). Storing the bytes is the caller's job.
    pub async fn set_cover_image(&self, id: &str, filename: &str) -> DbResult<String> {
        validate_cover_filename(filename)?;

        let path = cover_upload_path(id, filename);
        debug!(id = %id, path = %path, "Setting cover image");

        let result = sqlx::query("UPDATE books SET cover_image = ?2 WHERE id = ?1")
            .bind(id)
            .bind(&path)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(path)
    }

    /// Deletes a book together with its reviews, cart line items and
    /// genre/author links.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting book");

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Tags a book with a genre. Linking twice is a no-op.
    pub async fn add_genre(&self, book_id: &str, genre_id: &str) -> DbResult<()> {
        self.link("book_genres", "genre_id", "genres", "Genre", book_id, genre_id)
            .await
    }

    /// Removes a genre tag. Missing links are ignored.
    pub async fn remove_genre(&self, book_id: &str, genre_id: &str) -> DbResult<()> {
        debug!(book_id = %book_id, genre_id = %genre_id, "Unlinking genre");

        sqlx::query("DELETE FROM book_genres WHERE book_id = ?1 AND genre_id = ?2")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Credits an author on a book. Linking twice is a no-op.
    pub async fn add_author(&self, book_id: &str, author_id: &str) -> DbResult<()> {
        self.link("book_authors", "author_id", "authors", "Author", book_id, author_id)
            .await
    }

    /// Removes an author credit. Missing links are ignored.
    pub async fn remove_author(&self, book_id: &str, author_id: &str) -> DbResult<()> {
        debug!(book_id = %book_id, author_id = %author_id, "Unlinking author");

        sqlx::query("DELETE FROM book_authors WHERE book_id = ?1 AND author_id = ?2")
            .bind(book_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Inserts a junction row; a missing end surfaces as `NotFound`.
    async fn link(
        &self,
        junction: &'static str,
        other_column: &'static str,
        other_table: &'static str,
        other_entity: &'static str,
        book_id: &str,
        other_id: &str,
    ) -> DbResult<()> {
        debug!(book_id = %book_id, other_id = %other_id, junction, "Linking");

        let sql = format!(
            "INSERT INTO {junction} (book_id, {other_column}) VALUES (?1, ?2) \
             ON CONFLICT DO NOTHING"
        );
        let inserted = sqlx::query(&sql)
            .bind(book_id)
            .bind(other_id)
            .execute(&self.pool)
            .await;

        if let Err(e) = inserted {
            let parents = [("books", "Book", book_id), (other_table, other_entity, other_id)];
            return Err(explain_missing_parent(&self.pool, e.into(), &parents).await);
        }

        Ok(())
    }

    // =========================================================================
    // Derived Views
    // =========================================================================

    /// Titles of this book's genres, in genre order.
    pub async fn genre_titles(&self, book_id: &str) -> DbResult<Vec<String>> {
        let titles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT g.title
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = ?1
            ORDER BY g.title
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(titles)
    }

    /// Genre titles joined by newlines.
    pub async fn genres_text(&self, book_id: &str) -> DbResult<String> {
        Ok(self.genre_titles(book_id).await?.join("\n"))
    }

    /// "first last" for every credited author, in author order.
    pub async fn author_names(&self, book_id: &str) -> DbResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.first_name || ' ' || a.last_name
            FROM authors a
            JOIN book_authors ba ON ba.author_id = a.id
            WHERE ba.book_id = ?1
            ORDER BY a.last_name, a.first_name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Author names joined by newlines.
    pub async fn authors_text(&self, book_id: &str) -> DbResult<String> {
        Ok(self.author_names(book_id).await?.join("\n"))
    }

    /// Reviews of this book, oldest first.
    pub async fn reviews(&self, book_id: &str) -> DbResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, book_id, user_id, text, publish_date, latitude, longitude
            FROM reviews
            WHERE book_id = ?1
            ORDER BY publish_date, rowid
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Counts books (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
