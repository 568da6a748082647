//! # Review Repository
//!
//! A review belongs to one book and one user and disappears with either.
//! Coordinates are stored as the caller gave them; nothing parses them.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{explain_missing_parent, generate_id};
use bookstore_core::{
    Clock, NewReview, Review, DEFAULT_REVIEW_LATITUDE, DEFAULT_REVIEW_LONGITUDE,
};

const REVIEW_COLUMNS: &str = "id, book_id, user_id, text, publish_date, latitude, longitude";

/// Repository for review database operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl ReviewRepository {
    /// Creates a new ReviewRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        ReviewRepository { pool, clock }
    }

    /// Inserts a review.
    ///
    /// Missing date and coordinates are filled in here: today's date from
    /// the clock, and the default map position.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - book or user doesn't exist
    pub async fn create(&self, new: &NewReview) -> DbResult<Review> {
        let review = Review {
            id: generate_id(),
            book_id: new.book_id.clone(),
            user_id: new.user_id.clone(),
            text: new.text.clone(),
            publish_date: new.publish_date.unwrap_or_else(|| self.clock.today()),
            latitude: new
                .latitude
                .clone()
                .unwrap_or_else(|| DEFAULT_REVIEW_LATITUDE.to_string()),
            longitude: new
                .longitude
                .clone()
                .unwrap_or_else(|| DEFAULT_REVIEW_LONGITUDE.to_string()),
        };

        debug!(id = %review.id, book_id = %review.book_id, "Creating review");

        let inserted = sqlx::query(
            r#"
            INSERT INTO reviews (
                id, book_id, user_id, text, publish_date, latitude, longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&review.id)
        .bind(&review.book_id)
        .bind(&review.user_id)
        .bind(&review.text)
        .bind(review.publish_date)
        .bind(&review.latitude)
        .bind(&review.longitude)
        .execute(&self.pool)
        .await;

        if let Err(e) = inserted {
            let parents = [
                ("books", "Book", review.book_id.as_str()),
                ("users", "User", review.user_id.as_str()),
            ];
            return Err(explain_missing_parent(&self.pool, e.into(), &parents).await);
        }

        Ok(review)
    }

    /// Gets a review by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1");
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    /// Reviews of a book, oldest first.
    pub async fn list_for_book(&self, book_id: &str) -> DbResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = ?1 \
             ORDER BY publish_date, rowid"
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    /// Reviews written by a user, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = ?1 \
             ORDER BY publish_date, rowid"
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    /// Title of the reviewed book, for listings.
    pub async fn book_title(&self, review_id: &str) -> DbResult<String> {
        let title: Option<String> = sqlx::query_scalar(
            r#"
            SELECT b.title
            FROM reviews r
            JOIN books b ON b.id = r.book_id
            WHERE r.id = ?1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        title.ok_or_else(|| DbError::not_found("Review", review_id))
    }

    /// Deletes a review.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting review");

        let result = sqlx::query("DELETE FROM reviews WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Review", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::{NewReview, DEFAULT_REVIEW_LATITUDE, DEFAULT_REVIEW_LONGITUDE};
    use chrono::NaiveDate;

    use crate::repository::test_support::*;
    use crate::DbError;

    fn new_review(book_id: &str, user_id: &str, text: &str) -> NewReview {
        NewReview {
            book_id: book_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (db, _) = test_db().await;
        let reader = user(&db, "reader").await;
        let reviewed = book(&db, "Kobzar", 100).await;

        let review = db
            .reviews()
            .create(&new_review(&reviewed.id, &reader.id, "Timeless"))
            .await
            .unwrap();

        assert_eq!(review.publish_date, NaiveDate::from_ymd_opt(2020, 2, 24).unwrap());
        assert_eq!(review.latitude, DEFAULT_REVIEW_LATITUDE);
        assert_eq!(review.longitude, DEFAULT_REVIEW_LONGITUDE);

        let stored = db.reviews().get_by_id(&review.id).await.unwrap();
        assert_eq!(stored, Some(review));
    }

    #[tokio::test]
    async fn test_coordinates_stored_verbatim() {
        let (db, _) = test_db().await;
        let reader = user(&db, "reader").await;
        let reviewed = book(&db, "Kobzar", 100).await;

        let review = db
            .reviews()
            .create(&NewReview {
                latitude: Some("not a number".to_string()),
                longitude: Some("-0.0000".to_string()),
                ..new_review(&reviewed.id, &reader.id, "")
            })
            .await
            .unwrap();

        let stored = db.reviews().get_by_id(&review.id).await.unwrap().unwrap();
        assert_eq!(stored.latitude, "not a number");
        assert_eq!(stored.longitude, "-0.0000");
    }

    #[tokio::test]
    async fn test_unknown_book_or_user() {
        let (db, _) = test_db().await;
        let reader = user(&db, "reader").await;
        let reviewed = book(&db, "Kobzar", 100).await;

        let err = db
            .reviews()
            .create(&new_review("missing", &reader.id, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Book"));

        let err = db
            .reviews()
            .create(&new_review(&reviewed.id, "missing", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "User"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_on_file_database() {
        let (db, path) = file_db(8).await;
        let reader = user(&db, "reader").await;
        let reviewed = book(&db, "Kobzar", 100).await;

        let mut handles = Vec::new();
        for n in 0..24 {
            let reviews = db.reviews();
            // Every fourth review points at a user that doesn't exist.
            let user_id = if n % 4 == 0 { "ghost".to_string() } else { reader.id.clone() };
            let review = new_review(&reviewed.id, &user_id, &format!("take {n}"));
            handles.push(tokio::spawn(async move { reviews.create(&review).await }));
        }

        for (n, handle) in handles.into_iter().enumerate() {
            let created = handle.await.unwrap();
            if n % 4 == 0 {
                let err = created.unwrap_err();
                assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "User"));
            } else {
                assert!(created.is_ok(), "create failed: {created:?}");
            }
        }

        assert_eq!(db.reviews().list_for_book(&reviewed.id).await.unwrap().len(), 18);

        remove_file_db(db, path).await;
    }

    #[tokio::test]
    async fn test_book_title() {
        let (db, _) = test_db().await;
        let reader = user(&db, "reader").await;
        let reviewed = book(&db, "Zapovit", 100).await;
        let review = db
            .reviews()
            .create(&new_review(&reviewed.id, &reader.id, "short"))
            .await
            .unwrap();

        assert_eq!(db.reviews().book_title(&review.id).await.unwrap(), "Zapovit");
        assert!(db.reviews().book_title("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deleting_user_removes_their_reviews() {
        let (db, _) = test_db().await;
        let reader = user(&db, "reader").await;
        let other = user(&db, "other").await;
        let reviewed = book(&db, "Kobzar", 100).await;

        db.reviews()
            .create(&new_review(&reviewed.id, &reader.id, "mine"))
            .await
            .unwrap();
        db.reviews()
            .create(&new_review(&reviewed.id, &other.id, "theirs"))
            .await
            .unwrap();

        db.users().delete(&reader.id).await.unwrap();

        assert!(db.reviews().list_for_user(&reader.id).await.unwrap().is_empty());
        let left = db.reviews().list_for_book(&reviewed.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text, "theirs");
    }

    #[tokio::test]
    async fn test_deleting_book_removes_its_reviews() {
        let (db, _) = test_db().await;
        let reader = user(&db, "reader").await;
        let reviewed = book(&db, "Kobzar", 100).await;
        let review = db
            .reviews()
            .create(&new_review(&reviewed.id, &reader.id, "gone soon"))
            .await
            .unwrap();

        db.books().delete(&reviewed.id).await.unwrap();

        assert!(db.reviews().get_by_id(&review.id).await.unwrap().is_none());
        assert!(db.reviews().delete(&review.id).await.unwrap_err().is_not_found());
    }
}
