//! Payment validation
//!
//! Pure checks run before a payment is created. They read the ledger but
//! never modify it.

use std::cmp::Ordering;

use core_kernel::Money;
use crate::error::PledgeError;
use crate::ledger::PledgeLedger;

/// Validates a proposed payment amount against a ledger
///
/// Checks run in this order:
/// 1. `NonPositiveAmount` if the amount is zero or negative, whatever the balance
/// 2. `InvalidAmount` if the amount is finer than the currency's minor unit
/// 3. `CurrencyMismatch` if the amount is not in the pledge currency
/// 4. `ExceedsRemainingBalance` if the amount is larger than what is owed
///
/// Paying exactly the remaining balance is allowed.
pub fn validate(ledger: &PledgeLedger, proposed: &Money) -> Result<(), PledgeError> {
    if !proposed.is_positive() {
        return Err(PledgeError::NonPositiveAmount(*proposed));
    }

    if proposed.round_to_currency() != *proposed {
        return Err(PledgeError::InvalidAmount(format!(
            "{} is not a whole number of minor units",
            proposed.amount()
        )));
    }

    let remaining = ledger.remaining_amount()?;
    if proposed.checked_cmp(&remaining)? == Ordering::Greater {
        return Err(PledgeError::ExceedsRemainingBalance {
            proposed: *proposed,
            remaining,
        });
    }

    Ok(())
}
