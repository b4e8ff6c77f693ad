//! In-memory mock implementations of the repository and gateway traits.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::mandate_gateway::{DirectDebitCharge, MandateGateway},
    application::use_cases::{payment::PaymentRepo, subscription::SubscriptionRepo},
    domain::entities::{payment::Payment, subscription::Subscription},
};

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if !subscriptions.contains_key(&subscription.id) {
            return Err(AppError::NotFound("Subscription"));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.subscriptions.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let mut items: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|s| s.created_at);
        Ok(items)
    }

    async fn list_due(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.next_billing_date.is_some_and(|d| d <= cutoff))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.subscriptions.lock().unwrap().remove(&id);
        Ok(())
    }
}

// ============================================================================
// InMemoryPaymentRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPaymentRepo {
    pub payments: Mutex<HashMap<Uuid, Payment>>,
}

impl InMemoryPaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl PaymentRepo for InMemoryPaymentRepo {
    async fn insert(&self, payment: &Payment) -> AppResult<Payment> {
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id, payment.clone());
        Ok(payment.clone())
    }

    async fn update(&self, payment: &Payment) -> AppResult<Payment> {
        let mut payments = self.payments.lock().unwrap();
        if !payments.contains_key(&payment.id) {
            return Err(AppError::NotFound("Payment"));
        }
        payments.insert(payment.id, payment.clone());
        Ok(payment.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.payments.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_reference(&self, reference: &str) -> AppResult<Option<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .find(|p| p.payment_reference == reference)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let mut items: Vec<Payment> = self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|p| p.created_at);
        Ok(items)
    }

    async fn list_by_subscription(&self, subscription_id: Uuid) -> AppResult<Vec<Payment>> {
        let mut items: Vec<Payment> = self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.subscription_id == subscription_id)
            .cloned()
            .collect();
        items.sort_by_key(|p| p.created_at);
        Ok(items)
    }
}

// ============================================================================
// MockMandateGateway
// ============================================================================

/// Scripted gateway: returns a fixed outcome, counts calls, and can add
/// latency to widen race windows in concurrency tests.
pub struct MockMandateGateway {
    outcome: Result<String, String>,
    calls: AtomicUsize,
    latency_ms: u64,
}

impl MockMandateGateway {
    pub fn succeeding(payload: &str) -> Self {
        Self {
            outcome: Ok(payload.to_string()),
            calls: AtomicUsize::new(0),
            latency_ms: 0,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            latency_ms: 0,
        }
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MandateGateway for MockMandateGateway {
    async fn submit_direct_debit(&self, _charge: &DirectDebitCharge) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }
        match &self.outcome {
            Ok(payload) => Ok(payload.clone()),
            Err(message) => Err(AppError::PaymentDeclined(message.clone())),
        }
    }
}

/// Repo whose due-listing always fails, for exercising sweep error handling.
#[derive(Default)]
pub struct FailingSubscriptionRepo;

#[async_trait]
impl SubscriptionRepo for FailingSubscriptionRepo {
    async fn insert(&self, _subscription: &Subscription) -> AppResult<Subscription> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn update(&self, _subscription: &Subscription) -> AppResult<Subscription> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn get_by_id(&self, _id: Uuid) -> AppResult<Option<Subscription>> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn list_by_user(&self, _user_id: Uuid) -> AppResult<Vec<Subscription>> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn list_due(&self, _cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::Database("connection refused".to_string()))
    }
}
