//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating pledge totals and payment
//! sequences that respect domain invariants.

use core_kernel::{Currency, Money};
use domain_pledge::PaymentMethod;
use proptest::prelude::*;

/// Strategy for pledge currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::GHS),
        Just(Currency::NGN),
        Just(Currency::KES),
        Just(Currency::USD),
        Just(Currency::JPY),
    ]
}

/// Strategy for payment methods
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::MobileMoney),
        Just(PaymentMethod::Check),
        Just(PaymentMethod::Card),
    ]
}

/// Strategy for pledge totals in minor units
pub fn pledge_total_minor_strategy() -> impl Strategy<Value = i64> {
    100i64..100_000_000i64
}

/// Strategy for a pledge total in GHS
pub fn ghs_pledge_total_strategy() -> impl Strategy<Value = Money> {
    pledge_total_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::GHS))
}

/// Strategy for a GHS total plus proposed payments in minor units
///
/// Proposed payments may add up to more than the total, so tests see both
/// accepted and rejected appends.
pub fn ghs_pledge_with_payments_strategy() -> impl Strategy<Value = (Money, Vec<Money>)> {
    pledge_total_minor_strategy().prop_flat_map(|total_minor| {
        let payment = (-(total_minor / 10)..=total_minor / 2)
            .prop_map(|minor| Money::from_minor(minor, Currency::GHS));
        (
            Just(Money::from_minor(total_minor, Currency::GHS)),
            prop::collection::vec(payment, 0..12),
        )
    })
}
