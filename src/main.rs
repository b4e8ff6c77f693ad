use dotenvy::dotenv;
use tracing::info;

use darkstore_api::infra::{
    app::create_app,
    billing_scheduler::run_billing_loop,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let app_state = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state.clone());

    // Daily billing sweep runs alongside the HTTP server.
    let subscription_use_cases = app_state.subscription_use_cases.clone();
    tokio::spawn(async move {
        run_billing_loop(subscription_use_cases).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
