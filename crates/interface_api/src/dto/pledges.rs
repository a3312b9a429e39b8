//! Pledge DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Currency, Money};
use domain_pledge::{
    LedgerState, PaymentMethod, PaymentRecord, PledgeError, PledgeStatus, RecordPaymentRequest,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RecordPaymentBody {
    pub amount: Decimal,
    /// ISO currency code; the configured default when absent
    #[validate(length(equal = 3, message = "currency must be a three-letter code"))]
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub method: String,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "notes are limited to 500 characters"))]
    pub notes: Option<String>,
}

impl RecordPaymentBody {
    /// Converts the body into a domain request
    ///
    /// Amounts finer than the currency's minor unit are rejected here rather
    /// than rounded. Sign and balance are left to the domain validator so
    /// that the API reports the same errors as any other caller.
    pub fn into_request(self, default_currency: Currency) -> Result<RecordPaymentRequest, PledgeError> {
        let currency = match self.currency.as_deref() {
            Some(code) => code.parse::<Currency>()?,
            None => default_currency,
        };

        Ok(RecordPaymentRequest {
            amount: Money::try_new(self.amount, currency)?,
            method: self.method.parse::<PaymentMethod>()?,
            date: self.date,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub receipt_number: String,
    pub amount: Decimal,
    pub currency: String,
    pub formatted_amount: String,
    pub date: NaiveDate,
    pub method: String,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<&PaymentRecord> for PaymentResponse {
    fn from(payment: &PaymentRecord) -> Self {
        Self {
            id: payment.id.to_string(),
            receipt_number: payment.receipt_number.to_string(),
            amount: payment.amount.amount(),
            currency: payment.amount.currency().code().to_string(),
            formatted_amount: payment.amount.format_with_code(),
            date: payment.date,
            method: payment.method.to_string(),
            notes: payment.notes.clone(),
            recorded_at: payment.recorded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerStateResponse {
    pub pledge_id: String,
    pub currency: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub formatted_remaining: String,
    pub is_complete: bool,
    pub status: PledgeStatus,
    pub next_due_date: Option<NaiveDate>,
    pub is_overdue: bool,
    pub payment_count: usize,
    pub last_payment_date: Option<NaiveDate>,
    pub progress_percent: Decimal,
}

impl From<LedgerState> for LedgerStateResponse {
    fn from(state: LedgerState) -> Self {
        Self {
            pledge_id: state.pledge_id.to_string(),
            currency: state.total_amount.currency().code().to_string(),
            total_amount: state.total_amount.amount(),
            paid_amount: state.paid_amount.amount(),
            remaining_amount: state.remaining_amount.amount(),
            formatted_remaining: state.remaining_amount.format_with_code(),
            is_complete: state.is_complete,
            status: state.status,
            next_due_date: state.next_due_date,
            is_overdue: state.is_overdue,
            payment_count: state.payment_count,
            last_payment_date: state.last_payment_date,
            progress_percent: state.progress_percent,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub receipt_number: String,
    pub payment: PaymentResponse,
    pub ledger: LedgerStateResponse,
}
