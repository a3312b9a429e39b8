//! Pledge Domain Ports
//!
//! This module defines the persistence port the reconciliation service
//! depends on. Implementations decide where ledgers live:
//!
//! - **In-memory adapter**: `InMemoryLedgerStore`, used by the API server and tests
//! - **Database adapter**: provided by the hosting application
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_pledge::{InMemoryLedgerStore, ReconciliationService};
//! use core_kernel::SystemClock;
//! use std::sync::Arc;
//!
//! let service = ReconciliationService::new(
//!     Arc::new(InMemoryLedgerStore::new()),
//!     Arc::new(SystemClock::default()),
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PledgeId, PortError};
use crate::ledger::PledgeLedger;

/// Persistence port for pledge ledgers
///
/// `save` is the single write path and carries an optimistic-concurrency
/// check: it succeeds only if the stored version equals `expected_version`
/// (`0` meaning "not stored yet") and returns the new version.
#[async_trait]
pub trait LedgerStore: DomainPort + HealthCheckable {
    /// Loads the ledger of a pledge
    ///
    /// # Returns
    ///
    /// The ledger, or `PortError::NotFound`
    async fn load_ledger(&self, pledge_id: PledgeId) -> Result<PledgeLedger, PortError>;

    /// Stores a ledger if nobody else wrote it since `expected_version`
    ///
    /// # Returns
    ///
    /// The version now stored, or `PortError::Conflict` on a stale write
    async fn save(&self, ledger: &PledgeLedger, expected_version: u64) -> Result<u64, PortError>;

    /// Lists the pledges that have a ledger
    async fn list_pledges(&self) -> Result<Vec<PledgeId>, PortError>;
}
