//! # bookstore-core: Pure Domain Model for the Bookstore
//!
//! This crate holds the catalog, review and cart records together with the
//! rules that do not need a database: price arithmetic, slug generation and
//! field validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookstore Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation layer (not in this workspace)         │   │
//! │  │    Catalog pages ──► Book detail ──► Cart ──► Checkout          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ bookstore-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   slug    │  │ validation│  │   │
//! │  │   │  Book     │  │   Price   │  │  Clock    │  │   rules   │  │   │
//! │  │   │  Cart     │  │           │  │  slugify  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • INJECTED CLOCK           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bookstore-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, repositories, cart engine    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity records (Author, Genre, Book, Review, Cart, BookOrder)
//! - [`money`] - Fixed-point `Price` in cents
//! - [`clock`] - Time source abstraction (`SystemClock`, `FixedClock`)
//! - [`slug`] - URL-safe identifiers derived from display names
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules mirrored from the schema
//!
//! ## Example Usage
//!
//! ```rust
//! use bookstore_core::clock::FixedClock;
//! use bookstore_core::slug::generate_slug;
//!
//! let clock = FixedClock::from_timestamp(1_582_576_920);
//! assert_eq!(generate_slug("War and Peace", &clock), "war-and-peace-1582576920");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod money;
pub mod slug;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Price;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cover image stored for books that never had one uploaded.
pub const DEFAULT_COVER_IMAGE: &str = "books/empty_cover.jpg";

/// Latitude recorded on a review when the client sends none.
pub const DEFAULT_REVIEW_LATITUDE: &str = "50.45466";

/// Longitude recorded on a review when the client sends none.
pub const DEFAULT_REVIEW_LONGITUDE: &str = "30.5238";

/// Largest storable price: 8 digits with 2 of them after the point.
pub const MAX_PRICE_CENTS: i64 = 99_999_999;
