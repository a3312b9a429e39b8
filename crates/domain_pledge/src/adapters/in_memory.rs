//! In-memory ledger store
//!
//! Keeps ledgers in a `HashMap` behind a tokio `RwLock`. Data lives as long
//! as the process.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PledgeId, PortError};
use crate::ledger::PledgeLedger;
use crate::ports::LedgerStore;

/// `LedgerStore` backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    ledgers: RwLock<HashMap<PledgeId, PledgeLedger>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store, each ledger at version 1
    pub async fn with_ledgers(ledgers: Vec<PledgeLedger>) -> Self {
        let store = Self::new();
        {
            let mut map = store.ledgers.write().await;
            for mut ledger in ledgers {
                ledger.mark_saved(1);
                map.insert(ledger.pledge_id(), ledger);
            }
        }
        store
    }

    /// Number of stored ledgers
    pub async fn len(&self) -> usize {
        self.ledgers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledgers.read().await.is_empty()
    }
}

impl DomainPort for InMemoryLedgerStore {}

#[async_trait]
impl HealthCheckable for InMemoryLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        let count = self.len().await;
        HealthCheckResult {
            adapter_id: "in-memory-ledger-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some(format!("{} ledgers held in memory", count)),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    #[instrument(skip(self), fields(pledge_id = %pledge_id))]
    async fn load_ledger(&self, pledge_id: PledgeId) -> Result<PledgeLedger, PortError> {
        debug!("Loading ledger");
        self.ledgers
            .read()
            .await
            .get(&pledge_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("PledgeLedger", pledge_id))
    }

    #[instrument(skip(self, ledger), fields(pledge_id = %ledger.pledge_id()))]
    async fn save(&self, ledger: &PledgeLedger, expected_version: u64) -> Result<u64, PortError> {
        let mut ledgers = self.ledgers.write().await;
        let stored_version = ledgers.get(&ledger.pledge_id()).map(|l| l.version());

        match stored_version {
            None if expected_version != 0 => {
                return Err(PortError::not_found("PledgeLedger", ledger.pledge_id()));
            }
            Some(current) if current != expected_version => {
                return Err(PortError::conflict(format!(
                    "ledger {} is at version {}, write expected {}",
                    ledger.pledge_id(),
                    current,
                    expected_version
                )));
            }
            _ => {}
        }

        let new_version = expected_version + 1;
        let mut stored = ledger.clone();
        stored.mark_saved(new_version);
        ledgers.insert(stored.pledge_id(), stored);

        debug!(version = new_version, "Saved ledger");
        Ok(new_version)
    }

    async fn list_pledges(&self) -> Result<Vec<PledgeId>, PortError> {
        Ok(self.ledgers.read().await.keys().copied().collect())
    }
}
