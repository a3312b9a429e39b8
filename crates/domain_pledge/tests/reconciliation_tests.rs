//! Tests for the reconciliation service and the in-memory ledger store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{
    AdapterHealth, Clock, DomainPort, HealthCheckResult, HealthCheckable, PledgeId, PortError,
};
use domain_pledge::{
    InMemoryLedgerStore, LedgerStore, PaymentMethod, PledgeError, PledgeLedger, PledgeStatus,
    ReconciliationService, RecordPaymentRequest,
};
use test_utils::{assert_receipts_sequential, MoneyFixtures, TemporalFixtures, TestLedgerBuilder};

fn request(amount: rust_decimal::Decimal) -> RecordPaymentRequest {
    RecordPaymentRequest {
        amount: MoneyFixtures::ghs(amount),
        method: PaymentMethod::BankTransfer,
        date: None,
        notes: Some("Building fund".to_string()),
    }
}

fn service_with(store: Arc<dyn LedgerStore>) -> ReconciliationService {
    ReconciliationService::new(store, Arc::new(TemporalFixtures::march_clock()))
}

async fn opened(service: &ReconciliationService, ledger: PledgeLedger) -> PledgeId {
    service.open_ledger(ledger).await.unwrap().pledge_id()
}

// ============================================================================
// Recording payments
// ============================================================================

mod record_payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_payments_are_persisted() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let service = service_with(store.clone());
        let pledge_id = opened(&service, TestLedgerBuilder::new().build()).await;

        let first = service.record_payment(pledge_id, request(dec!(3000.00))).await.unwrap();
        assert_eq!(first.payment.receipt_number.to_string(), "PAY-001");
        assert_eq!(first.payment.date, TemporalFixtures::march_sunday());
        assert_eq!(first.payment.notes.as_deref(), Some("Building fund"));

        let stored = store.load_ledger(pledge_id).await.unwrap();
        assert_eq!(stored.payments().len(), 1);
        assert_eq!(stored.version(), first.ledger.version());
    }

    #[tokio::test]
    async fn test_rejected_payment_is_not_persisted() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let service = service_with(store.clone());
        let pledge_id = opened(&service, TestLedgerBuilder::new().build()).await;
        service.record_payment(pledge_id, request(dec!(3000.00))).await.unwrap();

        let err = service.record_payment(pledge_id, request(dec!(7000.01))).await.unwrap_err();
        assert!(matches!(err, PledgeError::ExceedsRemainingBalance { .. }));

        let stored = store.load_ledger(pledge_id).await.unwrap();
        assert_eq!(stored.payments().len(), 1);
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn test_exact_payoff_completes_pledge() {
        let service = service_with(Arc::new(InMemoryLedgerStore::new()));
        let pledge_id = opened(&service, TestLedgerBuilder::new().build()).await;

        service.record_payment(pledge_id, request(dec!(3000.00))).await.unwrap();
        let last = service.record_payment(pledge_id, request(dec!(7000.00))).await.unwrap();

        assert_eq!(last.payment.receipt_number.to_string(), "PAY-002");
        assert_eq!(last.ledger.status(), PledgeStatus::Completed);

        let state = service.get_ledger_state(pledge_id).await.unwrap();
        assert!(state.is_complete);
        assert!(state.remaining_amount.is_zero());
        assert_eq!(state.next_due_date, None);
        assert!(!state.is_overdue);
    }

    #[tokio::test]
    async fn test_explicit_date_is_kept() {
        let service = service_with(Arc::new(InMemoryLedgerStore::new()));
        let pledge_id = opened(&service, TestLedgerBuilder::new().build()).await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 25).unwrap();

        let recorded = service
            .record_payment(
                pledge_id,
                RecordPaymentRequest {
                    date: Some(date),
                    ..request(dec!(50))
                },
            )
            .await
            .unwrap();

        assert_eq!(recorded.payment.date, date);
    }

    #[tokio::test]
    async fn test_open_ledger_twice_conflicts() {
        let service = service_with(Arc::new(InMemoryLedgerStore::new()));
        let ledger = TestLedgerBuilder::new().build();
        service.open_ledger(ledger.clone()).await.unwrap();

        let err = service.open_ledger(ledger).await.unwrap_err();
        assert!(matches!(err, PledgeError::ConcurrentModification(_)));
    }

    #[tokio::test]
    async fn test_open_ledger_rejects_existing_payments() {
        let service = service_with(Arc::new(InMemoryLedgerStore::new()));
        let ledger = TestLedgerBuilder::new().with_payment(MoneyFixtures::ghs(dec!(1))).build();

        let err = service.open_ledger(ledger).await.unwrap_err();
        assert!(matches!(err, PledgeError::InvariantViolation(_)));
    }
}

// ============================================================================
// Ledger state
// ============================================================================

mod ledger_state_tests {
    use super::*;

    #[tokio::test]
    async fn test_overdue_uses_injected_clock() {
        let clock = Arc::new(TemporalFixtures::march_clock());
        let service = ReconciliationService::new(Arc::new(InMemoryLedgerStore::new()), clock.clone());
        let ledger = TestLedgerBuilder::new()
            .with_next_due_date(Some(NaiveDate::from_ymd_opt(2024, 4, 7).unwrap()))
            .build();
        let pledge_id = opened(&service, ledger).await;

        assert!(!service.get_ledger_state(pledge_id).await.unwrap().is_overdue);

        clock.set(
            NaiveDate::from_ymd_opt(2024, 4, 8)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
                .and_utc(),
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 4, 8).unwrap());
        assert!(service.get_ledger_state(pledge_id).await.unwrap().is_overdue);
    }

    #[tokio::test]
    async fn test_unknown_pledge() {
        let service = service_with(Arc::new(InMemoryLedgerStore::new()));
        let err = service.get_ledger_state(PledgeId::new()).await.unwrap_err();
        assert!(matches!(err, PledgeError::PledgeNotFound(_)));
    }
}

// ============================================================================
// Concurrency
// ============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_payments_get_unique_receipts() {
        let service = Arc::new(service_with(Arc::new(InMemoryLedgerStore::new())));
        let pledge_id = opened(&service, TestLedgerBuilder::new().build()).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.record_payment(pledge_id, request(dec!(100.00))).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let ledger = service.get_ledger(pledge_id).await.unwrap();
        assert_eq!(ledger.payments().len(), 20);
        assert_eq!(ledger.paid_amount().unwrap(), MoneyFixtures::ghs(dec!(2000.00)));
        assert_receipts_sequential(&ledger);
        assert_eq!(service.active_pledge_locks(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_payoffs_cannot_both_pass() {
        let service = Arc::new(service_with(Arc::new(InMemoryLedgerStore::new())));
        let ledger = TestLedgerBuilder::new().with_total(MoneyFixtures::ghs(dec!(500))).build();
        let pledge_id = opened(&service, ledger).await;

        let a = {
            let service = service.clone();
            tokio::spawn(async move { service.record_payment(pledge_id, request(dec!(500))).await })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move { service.record_payment(pledge_id, request(dec!(500))).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(PledgeError::ExceedsRemainingBalance { .. })))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(rejected, 1);
        assert_eq!(service.active_pledge_locks(), 0);
    }

    /// Store whose every save loses the race to another writer
    struct AlwaysStaleStore(InMemoryLedgerStore);

    impl DomainPort for AlwaysStaleStore {}

    #[async_trait]
    impl HealthCheckable for AlwaysStaleStore {
        async fn health_check(&self) -> HealthCheckResult {
            let mut result = self.0.health_check().await;
            result.status = AdapterHealth::Degraded;
            result
        }
    }

    #[async_trait]
    impl LedgerStore for AlwaysStaleStore {
        async fn load_ledger(&self, pledge_id: PledgeId) -> Result<PledgeLedger, PortError> {
            self.0.load_ledger(pledge_id).await
        }

        async fn save(&self, ledger: &PledgeLedger, expected_version: u64) -> Result<u64, PortError> {
            if expected_version == 0 {
                return self.0.save(ledger, 0).await;
            }
            Err(PortError::conflict("another writer saved first"))
        }

        async fn list_pledges(&self) -> Result<Vec<PledgeId>, PortError> {
            self.0.list_pledges().await
        }
    }

    #[tokio::test]
    async fn test_version_conflict_surfaces_as_concurrent_modification() {
        let store = Arc::new(AlwaysStaleStore(InMemoryLedgerStore::new()));
        let service = service_with(store.clone());
        let pledge_id = opened(&service, TestLedgerBuilder::new().build()).await;

        let err = service.record_payment(pledge_id, request(dec!(10))).await.unwrap_err();
        assert!(matches!(err, PledgeError::ConcurrentModification(id) if id == pledge_id));
        assert!(!err.is_user_error());
        assert_eq!(store.health_check().await.status, AdapterHealth::Degraded);
    }
}
