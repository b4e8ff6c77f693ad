use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    application::use_cases::subscription::SubscriptionRepo,
    domain::entities::subscription::Subscription,
};

const SELECT_COLS: &str = r#"id, user_id, tier, billing_cycle, status, delivery_day,
    next_billing_date, created_at, updated_at"#;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            r#"INSERT INTO subscriptions
                   (id, user_id, tier, billing_cycle, status, delivery_day,
                    next_billing_date, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {SELECT_COLS}"#
        ))
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(&subscription.tier)
        .bind(subscription.billing_cycle)
        .bind(subscription.status)
        .bind(&subscription.delivery_day)
        .bind(subscription.next_billing_date)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            r#"UPDATE subscriptions
               SET status = $2,
                   delivery_day = $3,
                   next_billing_date = $4,
                   updated_at = $5
               WHERE id = $1
               RETURNING {SELECT_COLS}"#
        ))
        .bind(subscription.id)
        .bind(subscription.status)
        .bind(&subscription.delivery_day)
        .bind(subscription.next_billing_date)
        .bind(subscription.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            r#"SELECT {SELECT_COLS} FROM subscriptions WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let recs = sqlx::query_as::<_, Subscription>(&format!(
            r#"SELECT {SELECT_COLS} FROM subscriptions
               WHERE user_id = $1
               ORDER BY created_at DESC"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(recs)
    }

    async fn list_due(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>> {
        let recs = sqlx::query_as::<_, Subscription>(&format!(
            r#"SELECT {SELECT_COLS} FROM subscriptions
               WHERE next_billing_date IS NOT NULL AND next_billing_date <= $1
               ORDER BY next_billing_date"#
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(recs)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM subscriptions WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
