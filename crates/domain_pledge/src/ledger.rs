//! Pledge ledger
//!
//! This module provides the append-only record of payments against a pledge
//! and derives the balance state from it.
//!
//! # Invariants
//!
//! - `paid_amount() + remaining_amount() == total_amount` after every append
//! - `paid_amount()` never exceeds `total_amount`; an append that would
//!   overpay is refused, never clamped
//! - Payments are never modified or removed
//! - `Pending -> Completed` is the only status transition

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{error, info};

use core_kernel::{MemberId, Money, PledgeId};
use crate::error::PledgeError;
use crate::payment::PaymentRecord;
use crate::schedule::PledgeSchedule;

/// Pledge status as informed by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PledgeStatus {
    /// Balance still outstanding
    Pending,
    /// Fully paid
    Completed,
}

/// Read-only snapshot of a ledger's derived state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub pledge_id: PledgeId,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub remaining_amount: Money,
    pub is_complete: bool,
    pub status: PledgeStatus,
    pub next_due_date: Option<NaiveDate>,
    pub is_overdue: bool,
    pub payment_count: usize,
    pub last_payment_date: Option<NaiveDate>,
    pub progress_percent: Decimal,
}

/// Payment ledger of a single pledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeLedger {
    pledge_id: PledgeId,
    member_id: Option<MemberId>,
    description: Option<String>,
    total_amount: Money,
    schedule: PledgeSchedule,
    status: PledgeStatus,
    payments: Vec<PaymentRecord>,
    receipt_sequence: u32,
    version: u64,
}

impl PledgeLedger {
    /// Opens an empty ledger for a pledge
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the total is not positive
    /// - `InvalidSchedule` if the schedule is malformed
    pub fn new(
        pledge_id: PledgeId,
        total_amount: Money,
        schedule: PledgeSchedule,
    ) -> Result<Self, PledgeError> {
        if !total_amount.is_positive() {
            return Err(PledgeError::InvalidAmount(format!(
                "pledge total must be positive, got {}",
                total_amount
            )));
        }
        schedule.validate()?;

        Ok(Self {
            pledge_id,
            member_id: None,
            description: None,
            total_amount,
            schedule,
            status: PledgeStatus::Pending,
            payments: Vec::new(),
            receipt_sequence: 0,
            version: 0,
        })
    }

    /// Sets the pledging member
    pub fn with_member(mut self, member_id: MemberId) -> Self {
        self.member_id = Some(member_id);
        self
    }

    /// Sets a description, e.g. the building fund campaign
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn pledge_id(&self) -> PledgeId {
        self.pledge_id
    }

    pub fn member_id(&self) -> Option<MemberId> {
        self.member_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn schedule(&self) -> &PledgeSchedule {
        &self.schedule
    }

    pub fn status(&self) -> PledgeStatus {
        self.status
    }

    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.schedule.next_due_date
    }

    /// Payments in the order they were recorded
    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn last_payment(&self) -> Option<&PaymentRecord> {
        self.payments.last()
    }

    /// Number of receipts issued so far
    pub fn receipt_sequence(&self) -> u32 {
        self.receipt_sequence
    }

    /// Sequence number the next receipt will carry
    pub fn next_receipt_sequence(&self) -> Result<u32, PledgeError> {
        self.receipt_sequence
            .checked_add(1)
            .ok_or_else(|| PledgeError::InvariantViolation("receipt sequence exhausted".to_string()))
    }

    /// Optimistic-concurrency version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Marks the ledger as persisted at `version`; only stores call this
    pub fn mark_saved(&mut self, version: u64) {
        self.version = version;
    }

    /// Updates the next due date; ignored once the pledge is complete
    pub fn set_next_due_date(&mut self, next_due_date: Option<NaiveDate>) {
        if self.status == PledgeStatus::Pending {
            self.schedule.next_due_date = next_due_date;
        }
    }

    /// Sum of all payments
    pub fn paid_amount(&self) -> Result<Money, PledgeError> {
        Ok(Money::sum(
            self.total_amount.currency(),
            self.payments.iter().map(|p| &p.amount),
        )?)
    }

    /// Outstanding balance
    ///
    /// # Errors
    ///
    /// `InvariantViolation` if payments exceed the total; the balance is
    /// never clamped to zero.
    pub fn remaining_amount(&self) -> Result<Money, PledgeError> {
        let remaining = self.total_amount.checked_sub(&self.paid_amount()?)?;
        if remaining.is_negative() {
            error!(
                pledge_id = %self.pledge_id,
                remaining = %remaining,
                "Ledger remaining balance is negative"
            );
            return Err(PledgeError::InvariantViolation(format!(
                "remaining balance on {} is negative ({})",
                self.pledge_id, remaining
            )));
        }
        Ok(remaining)
    }

    /// True once nothing remains to be paid
    pub fn is_complete(&self) -> Result<bool, PledgeError> {
        Ok(!self.remaining_amount()?.is_positive())
    }

    /// True if a due date is set, the pledge is outstanding, and `as_of` is past it
    pub fn is_overdue(&self, as_of: NaiveDate) -> Result<bool, PledgeError> {
        match self.schedule.next_due_date {
            Some(due) if as_of > due => Ok(!self.is_complete()?),
            _ => Ok(false),
        }
    }

    /// Paid share of the total, as a percentage rounded to 2 places
    pub fn progress_percent(&self) -> Result<Decimal, PledgeError> {
        let paid = self.paid_amount()?;
        let share = paid
            .amount()
            .checked_div(self.total_amount.amount())
            .ok_or_else(|| {
                error!(pledge_id = %self.pledge_id, total = %self.total_amount, "Pledge total is not usable");
                PledgeError::InvariantViolation(format!(
                    "pledge {} has a total of {}",
                    self.pledge_id, self.total_amount
                ))
            })?;
        Ok((share * dec!(100)).round_dp(2))
    }

    /// Appends a payment
    ///
    /// Re-verifies that the payment belongs to this pledge, is in the ledger
    /// currency, and does not overpay. On success bumps the receipt sequence
    /// and, when the balance reaches zero, completes the pledge and clears
    /// its next due date.
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if the payment belongs to another pledge
    /// - `CurrencyMismatch` if the currency differs
    /// - `OverpaymentRejected` if the payment exceeds the remaining balance
    pub fn append(&mut self, payment: PaymentRecord) -> Result<(), PledgeError> {
        if payment.pledge_id != self.pledge_id {
            return Err(PledgeError::InvariantViolation(format!(
                "payment {} belongs to {}, not {}",
                payment.id, payment.pledge_id, self.pledge_id
            )));
        }

        let remaining = self.remaining_amount()?;
        if remaining.checked_cmp(&payment.amount)? == Ordering::Less {
            error!(
                pledge_id = %self.pledge_id,
                proposed = %payment.amount,
                remaining = %remaining,
                "Overpayment reached the ledger; validation was bypassed"
            );
            return Err(PledgeError::OverpaymentRejected {
                pledge_id: self.pledge_id,
                proposed: payment.amount,
                remaining,
            });
        }

        self.receipt_sequence = self.receipt_sequence.max(payment.receipt_number.sequence());
        self.payments.push(payment);
        self.refresh_status()?;
        Ok(())
    }

    fn refresh_status(&mut self) -> Result<(), PledgeError> {
        if self.status == PledgeStatus::Pending && self.is_complete()? {
            self.status = PledgeStatus::Completed;
            self.schedule.next_due_date = None;
            info!(pledge_id = %self.pledge_id, total = %self.total_amount, "Pledge completed");
        }
        Ok(())
    }

    /// Derived state as of a calendar date
    pub fn state(&self, as_of: NaiveDate) -> Result<LedgerState, PledgeError> {
        let remaining_amount = self.remaining_amount()?;
        Ok(LedgerState {
            pledge_id: self.pledge_id,
            total_amount: self.total_amount,
            paid_amount: self.paid_amount()?,
            remaining_amount,
            is_complete: !remaining_amount.is_positive(),
            status: self.status,
            next_due_date: self.schedule.next_due_date,
            is_overdue: self.is_overdue(as_of)?,
            payment_count: self.payments.len(),
            last_payment_date: self.last_payment().map(|p| p.date),
            progress_percent: self.progress_percent()?,
        })
    }
}
