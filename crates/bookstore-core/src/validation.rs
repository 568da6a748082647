//! # Validation Module
//!
//! Field rules for bookstore records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Repository (Rust)                                            │
//! │  └── THIS MODULE: lengths, required fields, price range                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (slugs, genre title, cart line items)          │
//! │  ├── CHECK constraints (quantity ≥ 1, price ≥ 0)                       │
//! │  └── Foreign key constraints with cascade                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Length limits match the column widths of the original schema.

use crate::error::ValidationError;
use crate::types::{CheckoutDetails, NewAuthor, NewBook, NewGenre};
use crate::MAX_PRICE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_AUTHOR_NAME_LEN: usize = 100;
pub const MAX_GENRE_TITLE_LEN: usize = 50;
pub const MAX_BOOK_TITLE_LEN: usize = 200;
pub const MAX_BYLINE_LEN: usize = 200;
pub const MAX_PAYMENT_FIELD_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a trimmed value is present and at most `max` characters.
fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    optional(field, value, max)
}

/// Checks only the upper length bound.
fn optional(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an author's first and last name.
///
/// ## Example
/// ```rust
/// use bookstore_core::types::NewAuthor;
/// use bookstore_core::validation::validate_author;
///
/// let ok = NewAuthor { first_name: "Ivan".into(), last_name: "Franko".into() };
/// assert!(validate_author(&ok).is_ok());
///
/// let missing = NewAuthor { first_name: "".into(), last_name: "Franko".into() };
/// assert!(validate_author(&missing).is_err());
/// ```
pub fn validate_author(author: &NewAuthor) -> ValidationResult<()> {
    validate_author_names(&author.first_name, &author.last_name)
}

/// Validates author name fields on their own (used by updates).
pub fn validate_author_names(first_name: &str, last_name: &str) -> ValidationResult<()> {
    required("first_name", first_name, MAX_AUTHOR_NAME_LEN)?;
    required("last_name", last_name, MAX_AUTHOR_NAME_LEN)
}

/// Validates a genre title.
pub fn validate_genre(genre: &NewGenre) -> ValidationResult<()> {
    validate_genre_title(&genre.title)
}

/// Validates a genre title on its own (used by updates).
pub fn validate_genre_title(title: &str) -> ValidationResult<()> {
    required("title", title, MAX_GENRE_TITLE_LEN)
}

/// Validates the caller-supplied fields of a book.
pub fn validate_book(book: &NewBook) -> ValidationResult<()> {
    validate_book_fields(&book.title, &book.author, book.price.cents())
}

/// Validates title, legacy byline and price.
pub fn validate_book_fields(title: &str, byline: &str, price_cents: i64) -> ValidationResult<()> {
    required("title", title, MAX_BOOK_TITLE_LEN)?;
    optional("author", byline, MAX_BYLINE_LEN)?;
    validate_price_cents(price_cents)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative
/// - Must fit 8 digits with 2 decimals (≤ 999999.99)
///
/// ## Example
/// ```rust
/// use bookstore_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(99_999_999).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// assert!(validate_price_cents(100_000_000).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Checkout / Media Validators
// =============================================================================

/// Validates the order metadata recorded when a cart closes.
pub fn validate_checkout(details: &CheckoutDetails) -> ValidationResult<()> {
    required("payment_type", &details.payment_type, MAX_PAYMENT_FIELD_LEN)?;
    required("payment_id", &details.payment_id, MAX_PAYMENT_FIELD_LEN)
}

/// Validates an uploaded cover filename.
///
/// ## Rules
/// - Must not be empty
/// - Must not contain path separators or be a relative path component
pub fn validate_cover_filename(filename: &str) -> ValidationResult<()> {
    if filename.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "filename".to_string(),
        });
    }

    if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
        return Err(ValidationError::InvalidFormat {
            field: "filename".to_string(),
            reason: "must be a bare file name".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
