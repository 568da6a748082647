//! # Seed Data Generator
//!
//! Populates the database with a small catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 books (default)
//! cargo run -p bookstore-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p bookstore-db --bin seed -- --books 200
//!
//! # Specify database path (otherwise BOOKSTORE_DB_PATH, then ./bookstore.db)
//! cargo run -p bookstore-db --bin seed -- --db ./data/bookstore.db
//! ```
//!
//! ## Generated Data
//! - One genre per entry in `GENRES`
//! - One author per entry in `WORKS`
//! - `--books` books cycling through `WORKS`, each credited to its author,
//!   tagged with one or two genres, priced 4.99 - 24.99
//! - A demo reader with one review and an open cart

use std::env;

use bookstore_core::{NewAuthor, NewBook, NewGenre, NewReview, Price};
use bookstore_db::{Database, DbConfig};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_BOOKS: usize = 50;

const GENRES: &[&str] = &["Classics", "Drama", "Poetry", "Novel", "Short Stories"];

/// (first name, last name, title, genre indexes)
const WORKS: &[(&str, &str, &str, &[usize])] = &[
    ("Taras", "Shevchenko", "Kobzar", &[0, 2]),
    ("Lesya", "Ukrainka", "The Forest Song", &[1, 2]),
    ("Ivan", "Franko", "Zakhar Berkut", &[0, 3]),
    ("Mykhailo", "Kotsiubynsky", "Shadows of Forgotten Ancestors", &[3]),
    ("Olha", "Kobylianska", "The Land", &[0, 3]),
    ("Vasyl", "Stefanyk", "The Stone Cross", &[4]),
    ("Lina", "Kostenko", "Marusia Churai", &[2]),
    ("Oles", "Honchar", "The Cathedral", &[3]),
    ("Valerian", "Pidmohylny", "The City", &[0, 3]),
    ("Mykola", "Khvylovy", "I Am (Romance)", &[4]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bookstore=debug,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut books: usize = DEFAULT_BOOKS;
    let mut config = DbConfig::from_env();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--books" | "-b" => {
                if i + 1 < args.len() {
                    books = parse_book_count(&args[i + 1]);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bookstore Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --books <N>    Number of books to generate (default: {DEFAULT_BOOKS})");
                println!("  -d, --db <PATH>    Database file path (default: $BOOKSTORE_DB_PATH or ./bookstore.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Bookstore Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!("Books:    {}", books);
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.books().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let mut genre_ids = Vec::with_capacity(GENRES.len());
    for title in GENRES {
        let genre = db
            .genres()
            .create(&NewGenre {
                title: title.to_string(),
            })
            .await?;
        genre_ids.push(genre.id);
    }
    println!("✓ Created {} genres", genre_ids.len());

    let mut author_ids = Vec::with_capacity(WORKS.len());
    for (first_name, last_name, _, _) in WORKS {
        let author = db
            .authors()
            .create(&NewAuthor {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
            .await?;
        author_ids.push(author.id);
    }
    println!("✓ Created {} authors", author_ids.len());

    let mut book_ids = Vec::with_capacity(books);
    for n in 0..books {
        let (first_name, last_name, title, genres) = WORKS[n % WORKS.len()];
        let edition = n / WORKS.len();
        let title = if edition == 0 {
            title.to_string()
        } else {
            format!("{} (edition {})", title, edition + 1)
        };

        let book = match db.books().create(&generate_book(&title, first_name, last_name, n)).await {
            Ok(book) => book,
            Err(e) => {
                eprintln!("Failed to insert {}: {}", title, e);
                continue;
            }
        };

        db.books()
            .add_author(&book.id, &author_ids[n % WORKS.len()])
            .await?;
        for &genre in genres {
            db.books().add_genre(&book.id, &genre_ids[genre]).await?;
        }

        book_ids.push(book.id);
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} books in {:?}", book_ids.len(), elapsed);

    if let Some(first_book) = book_ids.first() {
        let reader = db.users().create("demo-reader").await?;

        db.reviews()
            .create(&NewReview {
                book_id: first_book.clone(),
                user_id: reader.id.clone(),
                text: "A book to return to.".to_string(),
                ..Default::default()
            })
            .await?;

        let cart = db.carts().create(&reader.id).await?;
        for book_id in book_ids.iter().take(3) {
            db.carts().add_to_cart(&cart.id, book_id).await?;
        }
        db.carts().add_to_cart(&cart.id, first_book).await?;

        println!();
        println!("Demo reader:");
        println!("  Review on: {}", db.books().get(first_book).await?.title);
        println!(
            "  Cart: {} line items, subtotal {}",
            db.carts().line_items(&cart.id).await?.len(),
            db.carts().subtotal(&cart.id).await?
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Reads `--books`, keeping the default (with a warning) on bad input.
fn parse_book_count(raw: &str) -> usize {
    match raw.parse::<usize>() {
        Ok(count) => count,
        Err(_) => {
            warn!(value = %raw, default = DEFAULT_BOOKS, "Ignoring invalid --books");
            DEFAULT_BOOKS
        }
    }
}

/// Builds one book with deterministic price and stock.
fn generate_book(title: &str, first_name: &str, last_name: &str, seed: usize) -> NewBook {
    // 4.99 - 24.99
    let price_cents = 499 + ((seed * 137) % 2001) as i64;

    NewBook {
        title: title.to_string(),
        author: format!("{} {}", first_name, last_name),
        description: format!("{} by {} {}.", title, first_name, last_name),
        publish_date: None,
        price: Price::from_cents(price_cents),
        stock: (seed % 25) as i64,
        cover_image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_count() {
        assert_eq!(parse_book_count("200"), 200);
        assert_eq!(parse_book_count("0"), 0);
        assert_eq!(parse_book_count("lots"), DEFAULT_BOOKS);
        assert_eq!(parse_book_count("-3"), DEFAULT_BOOKS);
    }
}
