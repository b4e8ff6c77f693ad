//! Test app state builder for HTTP-level integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::ports::mandate_gateway::MandateGateway,
    application::use_cases::{payment::PaymentUseCases, subscription::SubscriptionUseCases},
    domain::entities::{payment::Payment, subscription::Subscription},
    infra::config::AppConfig,
    test_utils::mocks::{InMemoryPaymentRepo, InMemorySubscriptionRepo, MockMandateGateway},
};

/// Builder for creating `AppState` backed by in-memory mocks.
///
/// # Example
///
/// ```ignore
/// let subscription = create_test_subscription(user_id, |_| {});
/// let state = TestAppStateBuilder::new()
///     .with_gateway(Arc::new(MockMandateGateway::succeeding("ok")))
///     .with_subscription(&subscription)
///     .build();
/// ```
pub struct TestAppStateBuilder {
    subscriptions: Vec<Subscription>,
    payments: Vec<Payment>,
    gateway: Option<Arc<dyn MandateGateway>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            subscriptions: vec![],
            payments: vec![],
            gateway: None,
        }
    }

    pub fn with_subscription(mut self, subscription: &Subscription) -> Self {
        self.subscriptions.push(subscription.clone());
        self
    }

    pub fn with_payment(mut self, payment: &Payment) -> Self {
        self.payments.push(payment.clone());
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn MandateGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn build(self) -> AppState {
        let subscription_repo = Arc::new(InMemorySubscriptionRepo::new());
        for subscription in &self.subscriptions {
            subscription_repo
                .subscriptions
                .lock()
                .unwrap()
                .insert(subscription.id, subscription.clone());
        }

        let payment_repo = Arc::new(InMemoryPaymentRepo::new());
        for payment in &self.payments {
            payment_repo
                .payments
                .lock()
                .unwrap()
                .insert(payment.id, payment.clone());
        }

        let gateway = self
            .gateway
            .unwrap_or_else(|| Arc::new(MockMandateGateway::succeeding("ok")));

        let subscription_use_cases = SubscriptionUseCases::new(subscription_repo.clone());
        let payment_use_cases =
            PaymentUseCases::new(payment_repo, subscription_repo, gateway);

        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            jwt_secret: SecretString::new("test_jwt_secret".into()),
            access_token_ttl: Duration::hours(24),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            gateway_base_url: Url::parse("http://gateway.test").unwrap(),
            gateway_api_key: SecretString::new("test_gateway_key".into()),
            gateway_timeout_secs: 5,
        });

        AppState {
            config,
            payment_use_cases: Arc::new(payment_use_cases),
            subscription_use_cases: Arc::new(subscription_use_cases),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
