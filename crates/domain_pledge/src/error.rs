//! Pledge domain errors

use thiserror::Error;

use core_kernel::{Money, MoneyError, PledgeId, PortError, TemporalError};

/// Errors that can occur while reconciling payments against a pledge
#[derive(Debug, Error)]
pub enum PledgeError {
    /// Arithmetic between amounts of different currencies
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    /// Proposed payment is zero or negative
    #[error("Payment amount must be greater than zero, got {0}")]
    NonPositiveAmount(Money),

    /// A payment record was constructed with an unusable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Currency code is not one the ledger knows
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Payment method string is not one of the supported methods
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Proposed payment is larger than what is still owed
    #[error("Payment of {proposed} exceeds remaining balance of {remaining}")]
    ExceedsRemainingBalance {
        proposed: Money,
        remaining: Money,
    },

    /// The ledger refused an append that would overpay the pledge
    #[error("Overpayment rejected on pledge {pledge_id}: {proposed} against remaining {remaining}")]
    OverpaymentRejected {
        pledge_id: PledgeId,
        proposed: Money,
        remaining: Money,
    },

    /// Ledger data is internally inconsistent
    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),

    /// Installment schedule is malformed
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// No ledger exists for the pledge
    #[error("Pledge not found: {0}")]
    PledgeNotFound(PledgeId),

    /// Another writer saved the ledger first
    #[error("Pledge {0} was modified concurrently; reload and retry")]
    ConcurrentModification(PledgeId),

    /// Persistence collaborator failed
    #[error("Ledger store error: {0}")]
    Store(#[source] PortError),
}

impl PledgeError {
    /// Returns true for errors the person entering the payment can correct
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PledgeError::NonPositiveAmount(_)
                | PledgeError::InvalidAmount(_)
                | PledgeError::UnknownCurrency(_)
                | PledgeError::UnknownPaymentMethod(_)
                | PledgeError::ExceedsRemainingBalance { .. }
                | PledgeError::CurrencyMismatch(_, _)
                | PledgeError::InvalidSchedule(_)
        )
    }

    /// Maps a store failure for a specific pledge
    pub fn from_port(pledge_id: PledgeId, err: PortError) -> Self {
        if err.is_not_found() {
            PledgeError::PledgeNotFound(pledge_id)
        } else if err.is_conflict() {
            PledgeError::ConcurrentModification(pledge_id)
        } else {
            PledgeError::Store(err)
        }
    }
}

impl From<MoneyError> for PledgeError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::CurrencyMismatch(a, b) => PledgeError::CurrencyMismatch(a, b),
            MoneyError::UnknownCurrency(code) => PledgeError::UnknownCurrency(code),
            other => PledgeError::InvalidAmount(other.to_string()),
        }
    }
}

impl From<TemporalError> for PledgeError {
    fn from(err: TemporalError) -> Self {
        PledgeError::InvalidSchedule(err.to_string())
    }
}
