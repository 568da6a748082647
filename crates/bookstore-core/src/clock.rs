//! # Clock
//!
//! Time source abstraction.
//!
//! Slug suffixes and default publish dates both depend on "now". Reading the
//! wall clock directly would make them untestable, so every caller receives a
//! [`Clock`] instead.
//!
//! ```text
//! ┌──────────────────┐        ┌──────────────────────────────┐
//! │   SystemClock    │        │          FixedClock          │
//! │  Utc::now()      │        │  settable instant (tests)    │
//! └────────┬─────────┘        └──────────────┬───────────────┘
//!          └───────────────┬─────────────────┘
//!                          ▼
//!              generate_slug / default dates
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};

/// A source of the current instant.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Returns the current Unix timestamp in whole seconds.
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// ## Usage
/// ```rust
/// use bookstore_core::clock::{Clock, FixedClock};
///
/// let clock = FixedClock::from_timestamp(1_700_000_000);
/// assert_eq!(clock.unix_timestamp(), 1_700_000_000);
///
/// clock.advance(5);
/// assert_eq!(clock.unix_timestamp(), 1_700_000_005);
/// ```
#[derive(Debug)]
pub struct FixedClock {
    /// Seconds since the Unix epoch.
    seconds: AtomicI64,
}

impl FixedClock {
    /// Creates a clock frozen at the given Unix timestamp.
    pub fn from_timestamp(seconds: i64) -> Self {
        FixedClock {
            seconds: AtomicI64::new(seconds),
        }
    }

    /// Creates a clock frozen at the given instant (sub-second part dropped).
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::from_timestamp(instant.timestamp())
    }

    /// Moves the clock to a new Unix timestamp.
    pub fn set(&self, seconds: i64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let seconds = self.seconds.load(Ordering::SeqCst);
        // Out-of-range timestamps collapse to the epoch.
        DateTime::from_timestamp(seconds, 0).unwrap_or_default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
