//! Payment records
//!
//! A `PaymentRecord` is one immutable payment against a pledge. Records are
//! only created through [`create_payment`] and never change once appended.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, PaymentRecordId, PledgeId};
use crate::error::PledgeError;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed in at church
    Cash,
    /// Bank transfer
    BankTransfer,
    /// Mobile money wallet
    MobileMoney,
    /// Check/cheque
    Check,
    /// Debit or credit card
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Check => "check",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "mobile_money" => Ok(PaymentMethod::MobileMoney),
            "check" | "cheque" => Ok(PaymentMethod::Check),
            "card" => Ok(PaymentMethod::Card),
            other => Err(PledgeError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Human-readable receipt identifier, sequential per pledge (`PAY-001`, `PAY-002`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiptNumber(u32);

impl ReceiptNumber {
    pub const PREFIX: &'static str = "PAY";

    /// Creates the receipt number for the n-th payment (1-based)
    pub fn from_sequence(sequence: u32) -> Result<Self, PledgeError> {
        if sequence == 0 {
            return Err(PledgeError::InvariantViolation(
                "receipt sequence starts at 1".to_string(),
            ));
        }
        Ok(Self(sequence))
    }

    pub fn sequence(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", Self::PREFIX, self.0)
    }
}

impl FromStr for ReceiptNumber {
    type Err = PledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("PAY-")
            .ok_or_else(|| PledgeError::InvariantViolation(format!("malformed receipt number: {}", s)))?;
        let sequence = digits
            .parse::<u32>()
            .map_err(|_| PledgeError::InvariantViolation(format!("malformed receipt number: {}", s)))?;
        Self::from_sequence(sequence)
    }
}

impl TryFrom<String> for ReceiptNumber {
    type Error = PledgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReceiptNumber> for String {
    fn from(receipt: ReceiptNumber) -> String {
        receipt.to_string()
    }
}

/// One payment against a pledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier
    pub id: PaymentRecordId,
    /// Pledge the payment counts toward
    pub pledge_id: PledgeId,
    /// Amount paid; always positive
    pub amount: Money,
    /// Calendar date of the payment
    pub date: NaiveDate,
    /// Payment method
    pub method: PaymentMethod,
    /// Sequential receipt identifier
    pub receipt_number: ReceiptNumber,
    /// Free-text notes from the treasurer
    pub notes: Option<String>,
    /// When the payment was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Fields a caller supplies for a new payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Money,
    pub method: PaymentMethod,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// Builds a payment record for `pledge_id` with the given receipt sequence
///
/// The amount is re-checked here even though callers validate first.
/// Blank notes are dropped. Nothing is appended to any ledger.
pub fn create_payment(
    pledge_id: PledgeId,
    sequence: u32,
    payment: NewPayment,
    recorded_at: DateTime<Utc>,
) -> Result<PaymentRecord, PledgeError> {
    if !payment.amount.is_positive() {
        return Err(PledgeError::InvalidAmount(format!(
            "payment amount must be positive, got {}",
            payment.amount
        )));
    }

    let notes = payment
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(PaymentRecord {
        id: PaymentRecordId::new_v7(),
        pledge_id,
        amount: payment.amount,
        date: payment.date,
        method: payment.method,
        receipt_number: ReceiptNumber::from_sequence(sequence)?,
        notes,
        recorded_at,
    })
}
