//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_pledge::PledgeLedger;

/// Asserts that two Money values are exactly equal, currency included
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Money amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that paid plus remaining equals the pledge total
///
/// # Panics
///
/// Panics if the ledger cannot derive its balances or they do not reconcile
pub fn assert_ledger_reconciles(ledger: &PledgeLedger) {
    let paid = ledger.paid_amount().expect("paid amount");
    let remaining = ledger.remaining_amount().expect("remaining amount");
    let sum = paid.checked_add(&remaining).expect("same currency");

    assert_eq!(
        sum,
        ledger.total_amount(),
        "Ledger {} does not reconcile: paid {} + remaining {} != total {}",
        ledger.pledge_id(),
        paid,
        remaining,
        ledger.total_amount()
    );
}

/// Asserts receipts run PAY-001, PAY-002, ... in recording order
pub fn assert_receipts_sequential(ledger: &PledgeLedger) {
    for (i, payment) in ledger.payments().iter().enumerate() {
        let expected = format!("PAY-{:03}", i + 1);
        assert_eq!(
            payment.receipt_number.to_string(),
            expected,
            "Payment {} carries receipt {}, expected {}",
            i,
            payment.receipt_number,
            expected
        );
    }
}
