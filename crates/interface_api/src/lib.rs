//! HTTP API Layer
//!
//! This crate provides the REST API for recording pledge payments using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for health and pledges
//! - **Middleware**: Tracing and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(service, config)?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware as axum_middleware,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};
use tracing::info;

use core_kernel::{CoreError, Currency, Money, PledgeId};
use domain_pledge::{Frequency, PledgeError, PledgeLedger, PledgeSchedule, ReconciliationService};

use crate::config::ApiConfig;
use crate::middleware::audit_middleware;
use crate::handlers::{health, pledges};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReconciliationService>,
    pub config: ApiConfig,
    pub default_currency: Currency,
}

impl AppState {
    /// Builds the state, parsing the configured default currency once
    pub fn new(service: Arc<ReconciliationService>, config: ApiConfig) -> Result<Self, CoreError> {
        let default_currency = config.currency()?;
        Ok(Self {
            service,
            config,
            default_currency,
        })
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared service and configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let pledge_routes = Router::new()
        .route("/:id/ledger", get(pledges::get_ledger_state))
        .route(
            "/:id/payments",
            get(pledges::list_payments).post(pledges::record_payment),
        );

    let api_routes = Router::new()
        .nest("/pledges", pledge_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Opens a sample 10,000 pledge paid in ten monthly installments from `start`
pub async fn seed_demo_pledge(
    service: &ReconciliationService,
    currency: Currency,
    start: NaiveDate,
) -> Result<PledgeId, PledgeError> {
    let total = Money::new(Decimal::from(10_000), currency);
    let schedule = PledgeSchedule::new(10, Frequency::Monthly, start);
    let ledger = PledgeLedger::new(PledgeId::new(), total, schedule)?
        .with_description("Building fund");

    let ledger = service.open_ledger(ledger).await?;
    info!(pledge_id = %ledger.pledge_id(), total = %ledger.total_amount(), "Seeded demo pledge");
    Ok(ledger.pledge_id())
}
