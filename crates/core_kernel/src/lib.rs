//! Core Kernel - Foundational types and utilities for the pledge ledger
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Clock and timezone abstractions for deterministic date handling
//! - Strongly-typed identifiers
//! - Port traits and errors for the ports-and-adapters boundary

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Clock, SystemClock, FixedClock, Timezone, TemporalError};
pub use identifiers::{PledgeId, PaymentRecordId, MemberId};
pub use ports::{PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable};
pub use error::CoreError;
