//! Installment schedules
//!
//! A pledge is paid in a fixed number of installments at a regular cadence.
//! This module projects due dates and per-installment amounts; it never
//! advances a ledger's `next_due_date` on its own.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Money, TemporalError};
use crate::error::PledgeError;

/// Payment cadence of a pledge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Returns the date one period after `date`
    ///
    /// Month-based steps clamp to the last day of shorter months
    /// (Jan 31 + 1 month = Feb 29 in a leap year).
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
            Frequency::Quarterly => date.checked_add_months(Months::new(3)),
            Frequency::Annual => date.checked_add_months(Months::new(12)),
        }
    }

    /// Returns the date `n` periods after `start`
    ///
    /// Computed from `start` rather than by repeated stepping, so a schedule
    /// starting on the 31st keeps landing on month ends.
    pub fn nth_after(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(n))),
            Frequency::Monthly => start.checked_add_months(Months::new(n)),
            Frequency::Quarterly => start.checked_add_months(Months::new(n.checked_mul(3)?)),
            Frequency::Annual => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annual => "annual",
        };
        f.write_str(s)
    }
}

/// Planned installments of a pledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeSchedule {
    /// Number of planned payments
    pub installments: u32,
    /// Cadence between payments
    pub frequency: Frequency,
    /// First installment date
    pub start_date: NaiveDate,
    /// Last date payments are expected, if bounded
    pub end_date: Option<NaiveDate>,
    /// Next installment due; advanced externally, cleared on completion
    pub next_due_date: Option<NaiveDate>,
}

impl PledgeSchedule {
    /// Creates a schedule whose first installment is due on `start_date`
    pub fn new(installments: u32, frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            installments,
            frequency,
            start_date,
            end_date: None,
            next_due_date: Some(start_date),
        }
    }

    /// Sets the end date
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Overrides the next due date
    pub fn with_next_due_date(mut self, next_due_date: Option<NaiveDate>) -> Self {
        self.next_due_date = next_due_date;
        self
    }

    /// Checks that the schedule is usable
    pub fn validate(&self) -> Result<(), PledgeError> {
        if self.installments == 0 {
            return Err(PledgeError::InvalidSchedule(
                "a pledge needs at least one installment".to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(TemporalError::InvalidDateRange {
                    start: self.start_date,
                    end,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Projected due dates, stopping at `end_date` when set
    pub fn due_dates(&self) -> Vec<NaiveDate> {
        (0..self.installments)
            .map_while(|n| self.frequency.nth_after(self.start_date, n))
            .take_while(|date| self.end_date.map_or(true, |end| *date <= end))
            .collect()
    }

    /// Splits `total` into per-installment amounts that sum exactly to `total`
    pub fn installment_amounts(&self, total: &Money) -> Result<Vec<Money>, PledgeError> {
        Ok(total.allocate(self.installments)?)
    }
}
