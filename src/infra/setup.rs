use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::postgres_persistence},
    application::ports::mandate_gateway::MandateGateway,
    infra::{config::AppConfig, onepipe_client::OnePipeClient},
    use_cases::{
        payment::{PaymentRepo, PaymentUseCases},
        subscription::{SubscriptionRepo, SubscriptionUseCases},
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let payment_repo_arc = postgres_arc.clone() as Arc<dyn PaymentRepo>;
    let subscription_repo_arc = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;

    let gateway = Arc::new(OnePipeClient::new(
        config.gateway_base_url.clone(),
        config.gateway_api_key.clone(),
        config.gateway_timeout_secs,
    )) as Arc<dyn MandateGateway>;

    let subscription_use_cases = SubscriptionUseCases::new(subscription_repo_arc.clone());
    let payment_use_cases =
        PaymentUseCases::new(payment_repo_arc, subscription_repo_arc, gateway);

    Ok(AppState {
        config: Arc::new(config),
        payment_use_cases: Arc::new(payment_use_cases),
        subscription_use_cases: Arc::new(subscription_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "darkstore_api=debug,tower_http=debug".into());

    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
        .ok();
}
