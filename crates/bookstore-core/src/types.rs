//! # Domain Types
//!
//! Entity records of the bookstore.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │   Author ◄──── book_authors ────► Book ◄──── book_genres ────► Genre   │
//! │   slug (once)                      │                        slug (once) │
//! │                                    │ 1:N                                │
//! │                    ┌───────────────┴──────────────┐                     │
//! │                    ▼                              ▼                     │
//! │                 Review ──► User ◄── Cart ◄──── BookOrder               │
//! │                                    active        quantity ≥ 1          │
//! │                                                                         │
//! │   Every arrow into Book, Cart and User deletes in cascade.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record's `id` is a UUID v4 string assigned by the store on insert.
//! `New*` structs carry only what the caller supplies.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Price;

// =============================================================================
// User
// =============================================================================

/// Account that owns reviews and carts.
///
/// Authentication lives elsewhere; this record exists so ownership and the
/// user cascade can be expressed in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
}

// =============================================================================
// Author
// =============================================================================

/// A book author. Natural order is by `last_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Author {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Assigned once at creation, never recomputed.
    pub slug: String,
}

impl Author {
    /// "first last", as shown on book pages.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Fields supplied when creating an author.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Genre
// =============================================================================

/// A genre. Natural order is by `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Genre {
    pub id: String,
    pub title: String,
    /// Assigned once at creation, never recomputed.
    pub slug: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Fields supplied when creating a genre.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewGenre {
    pub title: String,
}

// =============================================================================
// Book
// =============================================================================

/// A catalog entry.
///
/// `author` is the legacy free-text byline. It is independent of the
/// `book_authors` relation and never consulted when listing author names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    #[ts(as = "String")]
    pub publish_date: NaiveDate,
    /// Price in cents (fixed-point, 2 decimals).
    pub price_cents: i64,
    /// Units on hand. May go negative.
    pub stock: i64,
    /// Path of the cover image relative to the media root.
    pub cover_image: String,
}

impl Book {
    /// Returns the price as a Price type.
    #[inline]
    pub fn price(&self) -> Price {
        Price::from_cents(self.price_cents)
    }
}

/// Fields supplied when creating a book.
///
/// `publish_date` falls back to the store clock's current date at insert
/// time; `cover_image` falls back to [`crate::DEFAULT_COVER_IMAGE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    #[ts(as = "Option<String>")]
    pub publish_date: Option<NaiveDate>,
    pub price: Price,
    pub stock: i64,
    pub cover_image: Option<String>,
}

/// Media path for an uploaded cover: `books/<book_id>/<filename>`.
///
/// ## Example
/// ```rust
/// use bookstore_core::types::cover_upload_path;
///
/// assert_eq!(cover_upload_path("42", "front.jpg"), "books/42/front.jpg");
/// ```
pub fn cover_upload_path(book_id: &str, filename: &str) -> String {
    ["books", book_id, filename].join("/")
}

// =============================================================================
// Review
// =============================================================================

/// A user's review of a book.
///
/// Coordinates are opaque text exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub text: String,
    #[ts(as = "String")]
    pub publish_date: NaiveDate,
    pub latitude: String,
    pub longitude: String,
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fields supplied when posting a review.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReview {
    pub book_id: String,
    pub user_id: String,
    pub text: String,
    #[ts(as = "Option<String>")]
    pub publish_date: Option<NaiveDate>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// Whether a cart still accepts line-item changes from the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Being filled.
    Open,
    /// An order was placed from it.
    Closed,
}

/// A user's cart.
///
/// A user may own several carts; which one is "current" is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub active: bool,
    #[ts(as = "Option<String>")]
    pub order_date: Option<NaiveDate>,
    pub payment_type: Option<String>,
    pub payment_id: Option<String>,
}

impl Cart {
    /// Open while `active`, closed afterwards.
    pub fn status(&self) -> CartStatus {
        if self.active {
            CartStatus::Open
        } else {
            CartStatus::Closed
        }
    }
}

/// Order metadata recorded when a cart is closed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutDetails {
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub payment_type: String,
    pub payment_id: String,
}

// =============================================================================
// Book Order
// =============================================================================

/// A cart line item: one book, one cart, a quantity of at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BookOrder {
    pub id: String,
    pub book_id: String,
    pub cart_id: String,
    pub quantity: i64,
}

impl BookOrder {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self, unit_price: Price) -> Price {
        unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(active: bool) -> Cart {
        Cart {
            id: "c".to_string(),
            user_id: "u".to_string(),
            active,
            order_date: None,
            payment_type: None,
            payment_id: None,
        }
    }

    #[test]
    fn test_author_full_name() {
        let author = Author {
            id: "a".to_string(),
            first_name: "Lesya".to_string(),
            last_name: "Ukrainka".to_string(),
            slug: "lesyaukrainka-1".to_string(),
        };
        assert_eq!(author.full_name(), "Lesya Ukrainka");
        assert_eq!(author.to_string(), "Lesya Ukrainka");
    }

    #[test]
    fn test_cart_status() {
        assert_eq!(cart(true).status(), CartStatus::Open);
        assert_eq!(cart(false).status(), CartStatus::Closed);
    }

    #[test]
    fn test_cover_upload_path() {
        assert_eq!(
            cover_upload_path("7f3c", "cover.png"),
            "books/7f3c/cover.png"
        );
    }

    #[test]
    fn test_line_total() {
        let line = BookOrder {
            id: "o".to_string(),
            book_id: "b".to_string(),
            cart_id: "c".to_string(),
            quantity: 3,
        };
        assert_eq!(line.line_total(Price::from_cents(1250)).cents(), 3750);
    }

    #[test]
    fn test_cart_status_serializes_snake_case() {
        let json = serde_json::to_string(&CartStatus::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
    }
}
