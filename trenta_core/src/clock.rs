//! Clock abstraction for date/time stamping.
//!
//! Engines that stamp completion dates or history entries take a `Clock`
//! rather than calling `Utc::now()` directly, so tests can pin the date.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current time and local calendar date
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Today as a calendar date (used for completion stamps and daily keys)
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
