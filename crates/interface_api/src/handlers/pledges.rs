//! Pledge handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::{Clock, PledgeId};

use crate::dto::pledges::*;
use crate::{error::ApiError, AppState};

fn parse_pledge_id(raw: &str) -> Result<PledgeId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid pledge id: {}", raw)))
}

/// Gets the derived balance state of a pledge
pub async fn get_ledger_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LedgerStateResponse>, ApiError> {
    let pledge_id = parse_pledge_id(&id)?;
    let ledger_state = state.service.get_ledger_state(pledge_id).await?;
    Ok(Json(ledger_state.into()))
}

/// Lists the payments of a pledge in the order they were recorded
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let pledge_id = parse_pledge_id(&id)?;
    let ledger = state.service.get_ledger(pledge_id).await?;
    Ok(Json(ledger.payments().iter().map(PaymentResponse::from).collect()))
}

/// Records a payment against a pledge
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RecordPaymentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), ApiError> {
    let pledge_id = parse_pledge_id(&id)?;
    let Json(body) = payload?;
    body.validate()?;

    let request = body.into_request(state.default_currency)?;
    let recorded = state.service.record_payment(pledge_id, request).await?;
    let ledger_state = recorded.ledger.state(state.service.clock().today())?;

    let response = RecordPaymentResponse {
        receipt_number: recorded.payment.receipt_number.to_string(),
        payment: PaymentResponse::from(&recorded.payment),
        ledger: ledger_state.into(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
