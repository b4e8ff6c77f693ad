use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{error, info};

use crate::application::use_cases::subscription::SubscriptionUseCases;

/// Duration until the next UTC midnight after `now`.
fn next_midnight_delay(now: DateTime<Utc>) -> Duration {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    let next = (now.date_naive() + chrono::Days::new(1)).and_time(midnight);
    let delta = next - now.naive_utc();
    delta.to_std().unwrap_or(Duration::ZERO)
}

/// One sweep of the billing table. Errors are logged and swallowed so a
/// failing sweep never takes the loop down; missed days are not replayed.
pub async fn run_billing_sweep(use_cases: &SubscriptionUseCases) {
    info!("Running daily billing sweep");
    match use_cases.process_due_subscriptions().await {
        Ok(processed) => info!(processed, "Billing sweep complete"),
        Err(e) => error!(error = %e, "Billing sweep failed"),
    }
}

/// Daily billing loop, intended to run as a background task for the life of
/// the process. Fires at UTC midnight.
pub async fn run_billing_loop(use_cases: Arc<SubscriptionUseCases>) {
    loop {
        let delay = next_midnight_delay(Utc::now());
        info!(delay_secs = delay.as_secs(), "Billing sweep scheduled");
        tokio::time::sleep(delay).await;
        run_billing_sweep(&use_cases).await;
    }
}
