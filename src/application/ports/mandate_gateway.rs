use async_trait::async_trait;

use crate::app_error::AppResult;

/// One direct-debit attempt as submitted to the gateway. The reference is
/// generated locally and echoed back by the gateway's asynchronous callback.
#[derive(Debug, Clone)]
pub struct DirectDebitCharge {
    pub reference: String,
    pub bvn: String,
    pub account_number: String,
    pub bank_name: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub amount: i64,
    pub currency: String,
}

/// Direct-debit gateway port.
///
/// `submit_direct_debit` blocks until the gateway answers (the adapter bounds
/// this with an HTTP timeout) and returns the raw success payload for audit
/// storage. Failures surface as `AppError::PaymentDeclined` with the
/// gateway's human-readable detail.
#[async_trait]
pub trait MandateGateway: Send + Sync {
    async fn submit_direct_debit(&self, charge: &DirectDebitCharge) -> AppResult<String>;
}
