//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for pledges and payments.
//! These fixtures are designed to be consistent and predictable for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, FixedClock, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Shorthand for a GHS amount
    pub fn ghs(amount: Decimal) -> Money {
        Money::new(amount, Currency::GHS)
    }

    /// The 10,000.00 GHS building-fund pledge total
    pub fn pledge_total() -> Money {
        Self::ghs(dec!(10000.00))
    }

    /// A first installment of 3,000.00 GHS
    pub fn first_installment() -> Money {
        Self::ghs(dec!(3000.00))
    }

    /// A GHS zero amount
    pub fn ghs_zero() -> Money {
        Money::zero(Currency::GHS)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for dates and instants
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// First Sunday of 2024, when the sample pledge starts
    pub fn pledge_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
    }

    /// A Sunday in mid-March 2024
    pub fn march_sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 17).unwrap()
    }

    /// Midday UTC on `march_sunday`
    pub fn march_sunday_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 17, 12, 0, 0).unwrap()
    }

    /// A clock pinned to `march_sunday`
    pub fn march_clock() -> FixedClock {
        FixedClock::new(Self::march_sunday_instant())
    }
}
