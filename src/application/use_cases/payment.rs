use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::mandate_gateway::{DirectDebitCharge, MandateGateway},
    application::use_cases::subscription::SubscriptionRepo,
    domain::entities::{
        payment::{Payment, PaymentStatus},
        subscription::{SubscriptionStatus, tier_amount},
    },
};

const CURRENCY: &str = "NGN";

#[async_trait]
pub trait PaymentRepo: Send + Sync {
    async fn insert(&self, payment: &Payment) -> AppResult<Payment>;
    async fn update(&self, payment: &Payment) -> AppResult<Payment>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;
    async fn get_by_reference(&self, reference: &str) -> AppResult<Option<Payment>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>>;
    async fn list_by_subscription(&self, subscription_id: Uuid) -> AppResult<Vec<Payment>>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentInput {
    pub subscription_id: Uuid,
    pub bvn: String,
    pub account_number: String,
    pub bank_name: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
}

/// Caller-facing view of a payment. Bank identity fields are withheld and
/// the account number is masked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_reference: String,
    pub bank_name: String,
    pub account_number: String,
    pub created_at: NaiveDateTime,
    pub paid_at: Option<NaiveDateTime>,
    pub failure_reason: Option<String>,
}

impl PaymentProfile {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            user_id: payment.user_id,
            subscription_id: payment.subscription_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            status: payment.status,
            payment_reference: payment.payment_reference.clone(),
            bank_name: payment.bank_name.clone(),
            account_number: mask_account_number(&payment.account_number),
            created_at: payment.created_at,
            paid_at: payment.paid_at,
            failure_reason: payment.failure_reason.clone(),
        }
    }
}

/// Six mask characters plus the last four digits; a full mask when fewer
/// than four characters are available.
pub fn mask_account_number(account_number: &str) -> String {
    let chars: Vec<char> = account_number.chars().collect();
    if chars.len() < 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("******{tail}")
}

fn generate_payment_reference() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("PAY_{}", token[..16].to_uppercase())
}

pub struct PaymentUseCases {
    payments: Arc<dyn PaymentRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    gateway: Arc<dyn MandateGateway>,
    // One guard per subscription id so two concurrent charges against the
    // same PENDING subscription cannot both pass the status check. Guards
    // with no holder are swept on the next acquisition.
    charge_guards: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl PaymentUseCases {
    pub fn new(
        payments: Arc<dyn PaymentRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        gateway: Arc<dyn MandateGateway>,
    ) -> Self {
        Self {
            payments,
            subscriptions,
            gateway,
            charge_guards: Mutex::new(HashMap::new()),
        }
    }

    fn charge_guard(&self, subscription_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut guards = self.charge_guards.lock().expect("charge guard map poisoned");
        // Guards no in-flight charge holds any more can go; this keeps the
        // map bounded by concurrent charges rather than by history.
        guards.retain(|_, guard| Arc::strong_count(guard) > 1);
        guards
            .entry(subscription_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// A gateway callback can settle the payment while the synchronous charge
    /// call is still in flight. Returns the stored record when it has already
    /// reached a terminal state, in which case the sync path must not write.
    async fn settled_by_callback(&self, payment_id: Uuid) -> AppResult<Option<Payment>> {
        match self.payments.get_by_id(payment_id).await? {
            Some(stored) if stored.status.is_terminal() => {
                warn!(
                    reference = %stored.payment_reference,
                    status = %stored.status,
                    "Payment already settled by gateway callback"
                );
                Ok(Some(stored))
            }
            _ => Ok(None),
        }
    }

    /// Takes a direct debit for the caller's PENDING subscription.
    ///
    /// A PROCESSING payment record is persisted before the gateway is called
    /// so a crash mid-charge still leaves a durable trace. On success the
    /// subscription is activated; on gateway failure the payment is marked
    /// FAILED and the error is surfaced, leaving the subscription PENDING so
    /// the user can retry. Should the gateway's webhook settle the payment
    /// while the synchronous call is in flight, that verdict stands and this
    /// path writes nothing.
    #[instrument(skip(self, input), fields(subscription_id = %input.subscription_id))]
    pub async fn process_payment(
        &self,
        current_user_id: Uuid,
        input: ProcessPaymentInput,
    ) -> AppResult<PaymentProfile> {
        let guard = self.charge_guard(input.subscription_id);
        let _held = guard.lock().await;

        // Re-read under the guard: a racing charge may have settled while we
        // waited for the lock.
        let mut subscription = self
            .subscriptions
            .get_by_id(input.subscription_id)
            .await?
            .ok_or(AppError::NotFound("Subscription"))?;

        if subscription.user_id != current_user_id {
            return Err(AppError::Forbidden(
                "Subscription does not belong to current user".to_string(),
            ));
        }
        if subscription.status != SubscriptionStatus::Pending {
            return Err(AppError::BusinessRule(
                "Subscription is not in pending status".to_string(),
            ));
        }

        let amount = tier_amount(&subscription.tier);
        let reference = generate_payment_reference();
        let now = Utc::now().naive_utc();

        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: current_user_id,
            subscription_id: subscription.id,
            amount,
            currency: CURRENCY.to_string(),
            bvn: input.bvn.clone(),
            account_number: input.account_number.clone(),
            bank_name: input.bank_name.clone(),
            phone_number: input.phone_number.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            status: PaymentStatus::Processing,
            payment_reference: reference.clone(),
            gateway_response: None,
            failure_reason: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        let mut payment = self.payments.insert(&payment).await?;

        let charge = DirectDebitCharge {
            reference: reference.clone(),
            bvn: input.bvn,
            account_number: input.account_number,
            bank_name: input.bank_name,
            phone_number: input.phone_number,
            first_name: input.first_name,
            last_name: input.last_name,
            amount,
            currency: CURRENCY.to_string(),
        };

        match self.gateway.submit_direct_debit(&charge).await {
            Ok(raw_response) => {
                // First writer wins: if the webhook settled this payment
                // while the call was in flight, keep its verdict untouched.
                if let Some(settled) = self.settled_by_callback(payment.id).await? {
                    return Ok(PaymentProfile::from_payment(&settled));
                }

                let now = Utc::now().naive_utc();

                // Subscription first, then payment. There is no multi-record
                // transaction here; a crash between the two writes leaves the
                // subscription ACTIVE with the payment still PROCESSING, to be
                // repaired offline from gateway records.
                subscription.status = SubscriptionStatus::Active;
                subscription.next_billing_date =
                    Some(subscription.billing_cycle.advance(now));
                subscription.updated_at = now;
                self.subscriptions.update(&subscription).await?;

                payment.status = PaymentStatus::Paid;
                payment.gateway_response = Some(raw_response);
                payment.paid_at = Some(now);
                payment.updated_at = now;
                let payment = self.payments.update(&payment).await?;

                info!(reference = %payment.payment_reference, amount, "Payment processed successfully");
                Ok(PaymentProfile::from_payment(&payment))
            }
            Err(gateway_error) => {
                let reason = gateway_error.to_string();
                error!(reference = %reference, error = %reason, "Gateway direct debit failed");

                // Same first-writer rule: never downgrade a payment the
                // webhook already settled.
                if self.settled_by_callback(payment.id).await?.is_none() {
                    payment.status = PaymentStatus::Failed;
                    payment.failure_reason = Some(reason.clone());
                    payment.updated_at = Utc::now().naive_utc();
                    self.payments.update(&payment).await?;
                }

                Err(AppError::PaymentDeclined(reason))
            }
        }
    }

    pub async fn get_payment_by_id(
        &self,
        payment_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<PaymentProfile> {
        let payment = self
            .payments
            .get_by_id(payment_id)
            .await?
            .ok_or(AppError::NotFound("Payment"))?;
        if payment.user_id != current_user_id {
            return Err(AppError::Forbidden(
                "Payment does not belong to current user".to_string(),
            ));
        }
        Ok(PaymentProfile::from_payment(&payment))
    }

    pub async fn get_user_payments(&self, user_id: Uuid) -> AppResult<Vec<PaymentProfile>> {
        let payments = self.payments.list_by_user(user_id).await?;
        Ok(payments.iter().map(PaymentProfile::from_payment).collect())
    }

    pub async fn get_subscription_payments(
        &self,
        subscription_id: Uuid,
    ) -> AppResult<Vec<PaymentProfile>> {
        let payments = self.payments.list_by_subscription(subscription_id).await?;
        Ok(payments.iter().map(PaymentProfile::from_payment).collect())
    }

    /// Settles a payment from the gateway's asynchronous callback.
    ///
    /// The raw callback body is always stored for audit. A callback for a
    /// payment already in a terminal state is ignored; the synchronous path
    /// and the webhook both settle through this terminal check, so whichever
    /// lands first wins and the other becomes a no-op.
    #[instrument(skip(self, raw_response))]
    pub async fn handle_gateway_callback(
        &self,
        reference: &str,
        status: &str,
        raw_response: &str,
    ) -> AppResult<PaymentProfile> {
        let mut payment = self
            .payments
            .get_by_reference(reference)
            .await?
            .ok_or(AppError::NotFound("Payment for gateway reference"))?;

        if payment.status.is_terminal() {
            warn!(
                reference,
                current_status = %payment.status,
                callback_status = status,
                "Ignoring gateway callback for settled payment"
            );
            return Ok(PaymentProfile::from_payment(&payment));
        }

        let now = Utc::now().naive_utc();
        payment.gateway_response = Some(raw_response.to_string());
        payment.updated_at = now;

        if status.eq_ignore_ascii_case("SUCCESS") {
            payment.status = PaymentStatus::Paid;
            payment.paid_at = Some(now);

            let mut subscription = self
                .subscriptions
                .get_by_id(payment.subscription_id)
                .await?
                .ok_or(AppError::NotFound("Subscription"))?;
            subscription.status = SubscriptionStatus::Active;
            subscription.next_billing_date =
                Some(subscription.billing_cycle.advance(now));
            subscription.updated_at = now;
            self.subscriptions.update(&subscription).await?;

            info!(reference, "Payment settled by gateway callback");
        } else {
            payment.status = PaymentStatus::Failed;
            payment.failure_reason = Some(format!("Gateway payment failed: {status}"));
            warn!(reference, status, "Gateway callback reported failure");
        }

        let payment = self.payments.update(&payment).await?;
        Ok(PaymentProfile::from_payment(&payment))
    }
}
