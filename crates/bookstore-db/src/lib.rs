//! # bookstore-db: Database Layer for the Bookstore
//!
//! SQLite persistence for the catalog, reviews and carts, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookstore Data Flow                              │
//! │                                                                         │
//! │  Storefront request (browse / add to cart)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bookstore-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  authors      │    │  001_catalog │  │   │
//! │  │   │ SqlitePool    │◄───│  genres       │    │  002_carts   │  │   │
//! │  │   │ Clock         │    │  books        │    │  003_genres  │  │   │
//! │  │   │               │    │  reviews      │    │              │  │   │
//! │  │   │               │    │  carts        │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (foreign keys ON, cascade deletes)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookstore_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bookstore.db")).await?;
//!
//! let genre = db.genres().create(&NewGenre { title: "Poetry".into() }).await?;
//! let titles = db.books().genre_titles(&book.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::author::AuthorRepository;
pub use repository::book::BookRepository;
pub use repository::cart::CartRepository;
pub use repository::genre::GenreRepository;
pub use repository::review::ReviewRepository;
pub use repository::user::UserRepository;
