//! Payment reconciliation
//!
//! Reconciliation validates a new payment, creates its record, appends it to
//! a copy of the ledger, and returns the new snapshot. The service wraps that
//! pure step with loading, per-pledge serialization, and a versioned save.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use core_kernel::{Clock, Money, PledgeId};
use crate::error::PledgeError;
use crate::ledger::{LedgerState, PledgeLedger};
use crate::payment::{create_payment, NewPayment, PaymentMethod, PaymentRecord};
use crate::ports::LedgerStore;
use crate::validation::validate;

/// Applies a payment to a ledger without touching the original
///
/// 1. Validates the amount (errors are returned unchanged)
/// 2. Creates the payment record with the next receipt sequence
/// 3. Appends it to a copy of the ledger, which re-checks the balance and
///    completes the pledge when nothing remains
///
/// # Returns
///
/// The updated ledger and the new payment record
pub fn reconcile(
    ledger: &PledgeLedger,
    payment: NewPayment,
    recorded_at: DateTime<Utc>,
) -> Result<(PledgeLedger, PaymentRecord), PledgeError> {
    validate(ledger, &payment.amount)?;

    let record = create_payment(
        ledger.pledge_id(),
        ledger.next_receipt_sequence()?,
        payment,
        recorded_at,
    )?;

    let mut updated = ledger.clone();
    updated.append(record.clone())?;

    Ok((updated, record))
}

/// Input for recording a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Money,
    pub method: PaymentMethod,
    /// Payment date; the clock's current date when absent
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Outcome of a recorded payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedPayment {
    pub ledger: PledgeLedger,
    pub payment: PaymentRecord,
}

/// Write lock for one pledge plus the number of callers using it
#[derive(Default)]
struct PledgeLock {
    mutex: Arc<Mutex<()>>,
    holders: usize,
}

type PledgeLocks = std::sync::Mutex<HashMap<PledgeId, PledgeLock>>;

/// A caller's claim on a pledge lock
///
/// The map entry is removed when the last claim is dropped, so the map only
/// holds pledges with a write in flight.
struct PledgeLockEntry<'a> {
    locks: &'a PledgeLocks,
    pledge_id: PledgeId,
    mutex: Arc<Mutex<()>>,
}

impl Drop for PledgeLockEntry<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Entry::Occupied(mut slot) = locks.entry(self.pledge_id) {
            let lock = slot.get_mut();
            lock.holders = lock.holders.saturating_sub(1);
            if lock.holders == 0 {
                slot.remove();
            }
        }
    }
}

/// Service for recording payments against pledges
///
/// Calls for the same pledge are serialized, and every write is a versioned
/// save, so two payments can neither share a receipt number nor both pass
/// validation against the same stale balance.
pub struct ReconciliationService {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    pledge_locks: PledgeLocks,
}

impl ReconciliationService {
    /// Creates a service over a ledger store and a clock
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            pledge_locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// The clock used for payment dates and overdue checks
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Number of pledges with a payment currently being recorded
    pub fn active_pledge_locks(&self) -> usize {
        self.pledge_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_entry(&self, pledge_id: PledgeId) -> PledgeLockEntry<'_> {
        let mut locks = self.pledge_locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = locks.entry(pledge_id).or_default();
        lock.holders += 1;
        PledgeLockEntry {
            locks: &self.pledge_locks,
            pledge_id,
            mutex: lock.mutex.clone(),
        }
    }

    /// Stores a newly created ledger
    ///
    /// # Errors
    ///
    /// - `InvalidSchedule` / `InvalidAmount` for a malformed ledger
    /// - `ConcurrentModification` if a ledger already exists for the pledge
    #[instrument(skip(self, ledger), fields(pledge_id = %ledger.pledge_id()))]
    pub async fn open_ledger(&self, mut ledger: PledgeLedger) -> Result<PledgeLedger, PledgeError> {
        let pledge_id = ledger.pledge_id();
        ledger.schedule().validate()?;
        if !ledger.total_amount().is_positive() {
            return Err(PledgeError::InvalidAmount(format!(
                "pledge total must be positive, got {}",
                ledger.total_amount()
            )));
        }
        if !ledger.payments().is_empty() {
            return Err(PledgeError::InvariantViolation(
                "a new ledger cannot carry payments".to_string(),
            ));
        }

        let version = self
            .store
            .save(&ledger, 0)
            .await
            .map_err(|e| PledgeError::from_port(pledge_id, e))?;
        ledger.mark_saved(version);

        info!(total = %ledger.total_amount(), "Opened pledge ledger");
        Ok(ledger)
    }

    /// Records a payment against a pledge
    ///
    /// # Errors
    ///
    /// - Validation errors from [`validate`], unchanged
    /// - `PledgeNotFound` if the pledge has no ledger
    /// - `ConcurrentModification` if another writer saved first
    /// - `OverpaymentRejected` / `InvariantViolation` for inconsistent ledgers
    #[instrument(skip(self, request), fields(pledge_id = %pledge_id, amount = %request.amount))]
    pub async fn record_payment(
        &self,
        pledge_id: PledgeId,
        request: RecordPaymentRequest,
    ) -> Result<RecordedPayment, PledgeError> {
        let entry = self.lock_entry(pledge_id);
        let _guard = entry.mutex.lock().await;

        let ledger = self
            .store
            .load_ledger(pledge_id)
            .await
            .map_err(|e| PledgeError::from_port(pledge_id, e))?;

        let payment = NewPayment {
            amount: request.amount,
            method: request.method,
            date: request.date.unwrap_or_else(|| self.clock.today()),
            notes: request.notes,
        };

        let (mut updated, record) = match reconcile(&ledger, payment, self.clock.now()) {
            Ok(result) => result,
            Err(e) if e.is_user_error() => {
                warn!(error = %e, "Payment rejected");
                return Err(e);
            }
            Err(e) => {
                error!(error = %e, "Payment reconciliation failed");
                return Err(e);
            }
        };

        let version = self
            .store
            .save(&updated, ledger.version())
            .await
            .map_err(|e| PledgeError::from_port(pledge_id, e))?;
        updated.mark_saved(version);

        info!(
            receipt = %record.receipt_number,
            method = %record.method,
            status = ?updated.status(),
            "Payment recorded"
        );

        Ok(RecordedPayment {
            ledger: updated,
            payment: record,
        })
    }

    /// Loads a ledger
    pub async fn get_ledger(&self, pledge_id: PledgeId) -> Result<PledgeLedger, PledgeError> {
        self.store
            .load_ledger(pledge_id)
            .await
            .map_err(|e| PledgeError::from_port(pledge_id, e))
    }

    /// Derived balance state of a pledge as of the clock's current date
    #[instrument(skip(self), fields(pledge_id = %pledge_id))]
    pub async fn get_ledger_state(&self, pledge_id: PledgeId) -> Result<LedgerState, PledgeError> {
        let ledger = self.get_ledger(pledge_id).await?;
        ledger.state(self.clock.today())
    }
}
