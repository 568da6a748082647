//! # Slug Generator
//!
//! Derives URL-safe identifiers from display names.
//!
//! ## Format
//! ```text
//! "Léon Tolstoï"  ──transliterate──►  "Leon Tolstoi"
//!                 ──slugify────────►  "leon-tolstoi"
//!                 ──suffix─────────►  "leon-tolstoi-1582576920"
//!                                                   └── Unix seconds
//! ```
//!
//! The timestamp suffix makes repeated titles unique without asking the store
//! whether a slug is taken. Two saves of the same title within one second
//! still collide and surface as a unique-constraint error from the database.

use deunicode::deunicode;

use crate::clock::Clock;

/// Normalizes free text into a lowercase, hyphenated, ASCII-only token.
///
/// ## Rules
/// - Non-ASCII letters are transliterated (`é` → `e`, `Ж` → `Zh`)
/// - Characters other than letters, digits, `_`, `-` and whitespace are dropped
/// - Runs of whitespace and hyphens become a single `-`
/// - Leading and trailing `-`/`_` are stripped
///
/// ## Example
/// ```rust
/// use bookstore_core::slug::slugify;
///
/// assert_eq!(slugify("  Crime & Punishment "), "crime-punishment");
/// assert_eq!(slugify("Ça ira"), "ca-ira");
/// ```
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Builds a unique slug: `slugify(title)` + `-` + current Unix seconds.
///
/// Never fails. A title with no usable characters yields `-<timestamp>`.
pub fn generate_slug(title: &str, clock: &dyn Clock) -> String {
    format!("{}-{}", slugify(title), clock.unix_timestamp())
}

/// Text an author's slug is derived from: first and last name run together.
pub fn author_slug_source(first_name: &str, last_name: &str) -> String {
    format!("{first_name}{last_name}")
}

// =============================================================================
// Unit Tests
// =============================================================================
