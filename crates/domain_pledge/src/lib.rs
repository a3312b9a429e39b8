//! Pledge Domain - Installment Payment Ledger
//!
//! This crate reconciles payments against member pledges. A pledge is a
//! committed giving total paid in installments; its ledger is the
//! append-only list of payments plus the balance state derived from it.
//!
//! # Flow
//!
//! ```text
//! caller -> validate -> create_payment -> PledgeLedger::append -> LedgerStore::save
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, Utc};
//! use core_kernel::{Currency, Money, PledgeId};
//! use domain_pledge::{reconcile, Frequency, NewPayment, PaymentMethod, PledgeLedger, PledgeSchedule};
//! use rust_decimal_macros::dec;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
//! let ledger = PledgeLedger::new(
//!     PledgeId::new(),
//!     Money::new(dec!(10000.00), Currency::GHS),
//!     PledgeSchedule::new(10, Frequency::Monthly, start),
//! ).unwrap();
//!
//! let (ledger, receipt) = reconcile(
//!     &ledger,
//!     NewPayment {
//!         amount: Money::new(dec!(3000.00), Currency::GHS),
//!         method: PaymentMethod::BankTransfer,
//!         date: start,
//!         notes: None,
//!     },
//!     Utc::now(),
//! ).unwrap();
//!
//! assert_eq!(receipt.receipt_number.to_string(), "PAY-001");
//! assert_eq!(ledger.remaining_amount().unwrap().amount(), dec!(7000.00));
//! ```

pub mod ledger;
pub mod payment;
pub mod schedule;
pub mod validation;
pub mod reconciliation;
pub mod ports;
pub mod adapters;
pub mod error;

pub use ledger::{PledgeLedger, PledgeStatus, LedgerState};
pub use payment::{PaymentRecord, PaymentMethod, ReceiptNumber, NewPayment, create_payment};
pub use schedule::{Frequency, PledgeSchedule};
pub use validation::validate;
pub use reconciliation::{reconcile, ReconciliationService, RecordPaymentRequest, RecordedPayment};
pub use ports::LedgerStore;
pub use adapters::InMemoryLedgerStore;
pub use error::PledgeError;
