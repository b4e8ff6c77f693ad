use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::mandate_gateway::{DirectDebitCharge, MandateGateway},
};

/// Direct-debit client for an OnePipe-compatible gateway.
///
/// The gateway exposes a single `transact` operation; the final outcome also
/// arrives asynchronously on the callback route, keyed by our reference.
pub struct OnePipeClient {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct TransactEnvelope {
    status: String,
    message: Option<String>,
}

impl OnePipeClient {
    pub fn new(base_url: Url, api_key: SecretString, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn transact_url(&self) -> String {
        format!("{}v2/transact", self.base_url)
    }
}

#[async_trait]
impl MandateGateway for OnePipeClient {
    async fn submit_direct_debit(&self, charge: &DirectDebitCharge) -> AppResult<String> {
        let payload = json!({
            "request_ref": charge.reference,
            "request_type": "collect",
            "transaction": {
                "transaction_ref": charge.reference,
                "transaction_desc": "Subscription direct debit",
                "amount": charge.amount,
                "currency": charge.currency,
                "customer": {
                    "firstname": charge.first_name,
                    "surname": charge.last_name,
                    "mobile_no": charge.phone_number,
                },
                "details": {
                    "bvn": charge.bvn,
                    "account_number": charge.account_number,
                    "bank_name": charge.bank_name,
                },
            },
        });

        let response = self
            .client
            .post(self.transact_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::PaymentDeclined(format!("Gateway request failed: {e}")))?;

        let http_status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::PaymentDeclined(format!("Gateway response unreadable: {e}")))?;

        if !http_status.is_success() {
            return Err(AppError::PaymentDeclined(format!(
                "Gateway returned {http_status}: {body}"
            )));
        }

        let envelope: TransactEnvelope = serde_json::from_str(&body).map_err(|e| {
            AppError::PaymentDeclined(format!("Gateway returned malformed payload: {e}"))
        })?;

        if envelope.status.eq_ignore_ascii_case("successful") {
            Ok(body)
        } else {
            Err(AppError::PaymentDeclined(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Gateway status: {}", envelope.status)),
            ))
        }
    }
}
