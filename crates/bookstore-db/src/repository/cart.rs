//! # Cart Repository
//!
//! Carts, their line items, and the quantity engine behind
//! `add_to_cart` / `remove_from_cart`.
//!
//! ## Line Item Engine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        add_to_cart(cart, book)                          │
//! │                                                                         │
//! │  INSERT (qty 1) ON CONFLICT (book_id, cart_id)                          │
//! │    DO UPDATE SET quantity = quantity + 1  RETURNING row                 │
//! │   └── FK failure ──► which parent is missing? ──► NotFound (book/cart)  │
//! │                                                                         │
//! │                     remove_from_cart(cart, book)                        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── UPDATE quantity - 1 WHERE quantity > 1 RETURNING row ──► Some     │
//! │   ├── else DELETE row (quantity was 1)                     ──► None     │
//! │   └── nothing touched: book / cart exist? no ──► NotFound               │
//! │                                                        yes ──► None     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The first statement of every write is the write itself, so it waits   │
//! │  on the write lock (busy timeout) instead of upgrading a read snapshot. │
//! │  No read-then-write window between callers on the same line item.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart States
//! `active = true` is an open cart. `close` records the order metadata and
//! flips it to closed. Which cart is "the" active one for a user is up to
//! the caller; nothing enforces a single open cart.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{ensure_exists, explain_missing_parent, generate_id};
use bookstore_core::validation::validate_checkout;
use bookstore_core::{BookOrder, Cart, CheckoutDetails, CoreError, Price};

const CART_COLUMNS: &str = "id, user_id, active, order_date, payment_type, payment_id";
const ORDER_COLUMNS: &str = "id, book_id, cart_id, quantity";

/// Repository for carts and their line items.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// Opens a new empty cart for a user.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - User doesn't exist
    pub async fn create(&self, user_id: &str) -> DbResult<Cart> {
        let cart = Cart {
            id: generate_id(),
            user_id: user_id.to_string(),
            active: true,
            order_date: None,
            payment_type: None,
            payment_id: None,
        };

        debug!(id = %cart.id, user_id = %user_id, "Creating cart");

        let inserted = sqlx::query("INSERT INTO carts (id, user_id, active) VALUES (?1, ?2, 1)")
            .bind(&cart.id)
            .bind(&cart.user_id)
            .execute(&self.pool)
            .await;

        if let Err(e) = inserted {
            let parents = [("users", "User", user_id)];
            return Err(explain_missing_parent(&self.pool, e.into(), &parents).await);
        }

        Ok(cart)
    }

    /// Closes a cart, recording order date and payment reference.
    ///
    /// No payment is taken here; the fields are stored as given.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Cart doesn't exist
    /// * `Err(DbError::Domain(CoreError::CartClosed))` - already closed
    pub async fn close(&self, cart_id: &str, details: &CheckoutDetails) -> DbResult<Cart> {
        validate_checkout(details)?;

        let sql = format!(
            r#"
            UPDATE carts SET
                active = 0,
                order_date = ?2,
                payment_type = ?3,
                payment_id = ?4
            WHERE id = ?1 AND active = 1
            RETURNING {CART_COLUMNS}
            "#
        );
        let closed = sqlx::query_as::<_, Cart>(&sql)
            .bind(cart_id)
            .bind(details.order_date)
            .bind(details.payment_type.trim())
            .bind(details.payment_id.trim())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(cart) = closed {
            info!(cart_id = %cart_id, "Cart closed");
            return Ok(cart);
        }

        // Nothing updated: either no such cart or it was closed already.
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM carts WHERE id = ?1")
            .bind(cart_id)
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            None => Err(DbError::not_found("Cart", cart_id)),
            Some(_) => Err(CoreError::CartClosed {
                cart_id: cart_id.to_string(),
            }
            .into()),
        }
    }

    /// Deletes a cart and all of its line items.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting cart");

        let result = sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", id));
        }

        Ok(())
    }

    // =========================================================================
    // Line Items
    // =========================================================================

    /// Line items of a cart, in the order they were first added.
    pub async fn line_items(&self, cart_id: &str) -> DbResult<Vec<BookOrder>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM book_orders WHERE cart_id = ?1 ORDER BY rowid");
        let items = sqlx::query_as::<_, BookOrder>(&sql)
            .bind(cart_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// The line item for one book in a cart, if any.
    pub async fn line_item(&self, cart_id: &str, book_id: &str) -> DbResult<Option<BookOrder>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM book_orders WHERE cart_id = ?1 AND book_id = ?2"
        );
        let item = sqlx::query_as::<_, BookOrder>(&sql)
            .bind(cart_id)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Sum of quantity × current book price over the cart's line items.
    pub async fn subtotal(&self, cart_id: &str) -> DbResult<Price> {
        ensure_exists(&self.pool, "carts", "Cart", cart_id).await?;

        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(bo.quantity * b.price_cents), 0)
            FROM book_orders bo
            JOIN books b ON b.id = bo.book_id
            WHERE bo.cart_id = ?1
            "#,
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Price::from_cents(cents))
    }

    /// Puts one more copy of a book into the cart.
    ///
    /// Creates the line item at quantity 1 or bumps an existing one.
    ///
    /// ## Returns
    /// The line item after the change.
    /// * `Err(DbError::NotFound)` - book or cart doesn't exist
    pub async fn add_to_cart(&self, cart_id: &str, book_id: &str) -> DbResult<BookOrder> {
        let sql = format!(
            r#"
            INSERT INTO book_orders (id, book_id, cart_id, quantity)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT (book_id, cart_id) DO UPDATE SET quantity = quantity + 1
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let upserted = sqlx::query_as::<_, BookOrder>(&sql)
            .bind(generate_id())
            .bind(book_id)
            .bind(cart_id)
            .fetch_one(&self.pool)
            .await;

        let item = match upserted {
            Ok(item) => item,
            Err(e) => {
                let parents = [("books", "Book", book_id), ("carts", "Cart", cart_id)];
                return Err(explain_missing_parent(&self.pool, e.into(), &parents).await);
            }
        };

        debug!(cart_id = %cart_id, book_id = %book_id, quantity = item.quantity, "Added to cart");
        Ok(item)
    }

    /// Takes one copy of a book out of the cart.
    ///
    /// A line item at quantity 1 is deleted rather than left at 0.
    /// Removing a book that isn't in the cart does nothing.
    ///
    /// ## Returns
    /// * `Some(item)` - the line item after decrementing
    /// * `None` - the line item is gone (or never existed)
    /// * `Err(DbError::NotFound)` - book or cart doesn't exist
    pub async fn remove_from_cart(
        &self,
        cart_id: &str,
        book_id: &str,
    ) -> DbResult<Option<BookOrder>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE book_orders SET quantity = quantity - 1
            WHERE book_id = ?1 AND cart_id = ?2 AND quantity > 1
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let decremented = sqlx::query_as::<_, BookOrder>(&sql)
            .bind(book_id)
            .bind(cart_id)
            .fetch_optional(&mut *tx)
            .await?;

        if decremented.is_none() {
            let result = sqlx::query("DELETE FROM book_orders WHERE book_id = ?1 AND cart_id = ?2")
                .bind(book_id)
                .bind(cart_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                // Already holding the write lock; these reads can't deadlock.
                ensure_exists(&mut *tx, "books", "Book", book_id).await?;
                ensure_exists(&mut *tx, "carts", "Cart", cart_id).await?;
                debug!(cart_id = %cart_id, book_id = %book_id, "Nothing to remove");
            }
        }

        tx.commit().await?;

        debug!(
            cart_id = %cart_id,
            book_id = %book_id,
            quantity = decremented.as_ref().map_or(0, |item| item.quantity),
            "Removed from cart"
        );
        Ok(decremented)
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::{CartStatus, CheckoutDetails, CoreError, Price};
    use chrono::NaiveDate;

    use crate::repository::test_support::*;
    use crate::DbError;

    fn checkout() -> CheckoutDetails {
        CheckoutDetails {
            order_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            payment_type: "card".to_string(),
            payment_id: "pay-001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_three_times_yields_one_line_of_three() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;

        for expected in 1..=3 {
            let line = db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();
            assert_eq!(line.quantity, expected);
        }

        let lines = db.carts().line_items(&cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].book_id, item.id);
        assert_eq!(lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_then_remove_is_net_zero() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;

        db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();
        let left = db.carts().remove_from_cart(&cart.id, &item.id).await.unwrap();

        assert!(left.is_none());
        assert!(db.carts().line_item(&cart.id, &item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_decrements_then_deletes() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;

        db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();
        db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();

        let line = db.carts().remove_from_cart(&cart.id, &item.id).await.unwrap();
        assert_eq!(line.map(|l| l.quantity), Some(1));

        // Quantity 1 goes away instead of dropping to 0.
        let line = db.carts().remove_from_cart(&cart.id, &item.id).await.unwrap();
        assert!(line.is_none());
        assert!(db.carts().line_items(&cart.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_line_is_noop() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let kept = book(&db, "Kept", 100).await;
        let absent = book(&db, "Absent", 100).await;

        db.carts().add_to_cart(&cart.id, &kept.id).await.unwrap();

        let result = db.carts().remove_from_cart(&cart.id, &absent.id).await.unwrap();
        assert!(result.is_none());

        let lines = db.carts().line_items(&cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_unknown_book_is_not_found_and_cart_unchanged() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;
        db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();

        let err = db.carts().add_to_cart(&cart.id, "no-such-book").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Book"));

        let err = db
            .carts()
            .remove_from_cart(&cart.id, "no-such-book")
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let lines = db.carts().line_items(&cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_unknown_cart_is_not_found() {
        let (db, _) = test_db().await;
        let item = book(&db, "Kobzar", 100).await;

        let err = db.carts().add_to_cart("no-such-cart", &item.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Cart"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_and_removes_on_file_database() {
        const CALLS: i64 = 32;

        let (db, path) = file_db(8).await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;

        let mut handles = Vec::new();
        for _ in 0..CALLS {
            let carts = db.carts();
            let (cart_id, book_id) = (cart.id.clone(), item.id.clone());
            handles.push(tokio::spawn(async move {
                carts.add_to_cart(&cart_id, &book_id).await
            }));
        }
        for handle in handles {
            let added = handle.await.unwrap();
            assert!(added.is_ok(), "add_to_cart failed: {added:?}");
        }

        let line = db.carts().line_item(&cart.id, &item.id).await.unwrap().unwrap();
        assert_eq!(line.quantity, CALLS);

        let mut handles = Vec::new();
        for _ in 0..CALLS {
            let carts = db.carts();
            let (cart_id, book_id) = (cart.id.clone(), item.id.clone());
            handles.push(tokio::spawn(async move {
                carts.remove_from_cart(&cart_id, &book_id).await
            }));
        }
        for handle in handles {
            let removed = handle.await.unwrap();
            assert!(removed.is_ok(), "remove_from_cart failed: {removed:?}");
        }

        assert!(db.carts().line_items(&cart.id).await.unwrap().is_empty());

        remove_file_db(db, path).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_report_missing_parents_on_file_database() {
        let (db, path) = file_db(8).await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..16 {
            let carts = db.carts();
            let cart_id = cart.id.clone();
            handles.push(tokio::spawn(async move {
                carts.add_to_cart(&cart_id, &format!("missing-{n}")).await
            }));
        }
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Book"));
        }

        assert!(db.carts().line_items(&cart.id).await.unwrap().is_empty());

        remove_file_db(db, path).await;
    }

    #[tokio::test]
    async fn test_subtotal() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let cheap = book(&db, "Cheap", 250).await;
        let dear = book(&db, "Dear", 1999).await;

        assert_eq!(db.carts().subtotal(&cart.id).await.unwrap(), Price::zero());

        db.carts().add_to_cart(&cart.id, &cheap.id).await.unwrap();
        db.carts().add_to_cart(&cart.id, &cheap.id).await.unwrap();
        db.carts().add_to_cart(&cart.id, &dear.id).await.unwrap();

        assert_eq!(
            db.carts().subtotal(&cart.id).await.unwrap(),
            Price::from_cents(2 * 250 + 1999)
        );
        assert!(db.carts().subtotal("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_close_records_order() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        assert_eq!(cart.status(), CartStatus::Open);
        assert_eq!(db.carts().find_active(&owner.id).await.unwrap(), Some(cart.clone()));

        let closed = db.carts().close(&cart.id, &checkout()).await.unwrap();
        assert_eq!(closed.status(), CartStatus::Closed);
        assert_eq!(closed.order_date, Some(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()));
        assert_eq!(closed.payment_id.as_deref(), Some("pay-001"));
        assert!(db.carts().find_active(&owner.id).await.unwrap().is_none());

        let err = db.carts().close(&cart.id, &checkout()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CartClosed { .. })));
    }

    #[tokio::test]
    async fn test_close_requires_payment_fields() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();

        let details = CheckoutDetails {
            payment_id: " ".to_string(),
            ..checkout()
        };
        let err = db.carts().close(&cart.id, &details).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let stored = db.carts().get_by_id(&cart.id).await.unwrap().unwrap();
        assert!(stored.active);
    }

    #[tokio::test]
    async fn test_user_may_hold_several_carts() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let first = db.carts().create(&owner.id).await.unwrap();
        let second = db.carts().create(&owner.id).await.unwrap();

        let ids: Vec<String> = db
            .carts()
            .list_for_user(&owner.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, [first.id, second.id.clone()]);
        assert_eq!(db.carts().find_active(&owner.id).await.unwrap().map(|c| c.id), Some(second.id));
    }

    #[tokio::test]
    async fn test_deleting_cart_removes_line_items() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;
        db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();

        db.carts().delete(&cart.id).await.unwrap();

        assert!(db.carts().line_items(&cart.id).await.unwrap().is_empty());
        assert!(db.books().get_by_id(&item.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_book_removes_its_line_items() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let gone = book(&db, "Gone", 100).await;
        let kept = book(&db, "Kept", 100).await;
        db.carts().add_to_cart(&cart.id, &gone.id).await.unwrap();
        db.carts().add_to_cart(&cart.id, &kept.id).await.unwrap();

        db.books().delete(&gone.id).await.unwrap();

        let lines = db.carts().line_items(&cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].book_id, kept.id);
    }

    #[tokio::test]
    async fn test_deleting_user_removes_carts_and_lines() {
        let (db, _) = test_db().await;
        let owner = user(&db, "buyer").await;
        let cart = db.carts().create(&owner.id).await.unwrap();
        let item = book(&db, "Kobzar", 100).await;
        db.carts().add_to_cart(&cart.id, &item.id).await.unwrap();

        db.users().delete(&owner.id).await.unwrap();

        assert!(db.carts().get_by_id(&cart.id).await.unwrap().is_none());
        assert!(db.carts().line_items(&cart.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_cart_for_unknown_user() {
        let (db, _) = test_db().await;
        let err = db.carts().create("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
