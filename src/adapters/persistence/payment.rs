use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    application::use_cases::payment::PaymentRepo,
    domain::entities::payment::Payment,
};

const SELECT_COLS: &str = r#"id, user_id, subscription_id, amount, currency, bvn,
    account_number, bank_name, phone_number, first_name, last_name, status,
    payment_reference, gateway_response, failure_reason, paid_at, created_at, updated_at"#;

#[async_trait]
impl PaymentRepo for PostgresPersistence {
    async fn insert(&self, payment: &Payment) -> AppResult<Payment> {
        let rec = sqlx::query_as::<_, Payment>(&format!(
            r#"INSERT INTO payments
                   (id, user_id, subscription_id, amount, currency, bvn,
                    account_number, bank_name, phone_number, first_name, last_name,
                    status, payment_reference, gateway_response, failure_reason,
                    paid_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                       $12, $13, $14, $15, $16, $17, $18)
               RETURNING {SELECT_COLS}"#
        ))
        .bind(payment.id)
        .bind(payment.user_id)
        .bind(payment.subscription_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.bvn)
        .bind(&payment.account_number)
        .bind(&payment.bank_name)
        .bind(&payment.phone_number)
        .bind(&payment.first_name)
        .bind(&payment.last_name)
        .bind(payment.status)
        .bind(&payment.payment_reference)
        .bind(&payment.gateway_response)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn update(&self, payment: &Payment) -> AppResult<Payment> {
        // Identity, amount and bank fields are immutable after insert.
        let rec = sqlx::query_as::<_, Payment>(&format!(
            r#"UPDATE payments
               SET status = $2,
                   gateway_response = $3,
                   failure_reason = $4,
                   paid_at = $5,
                   updated_at = $6
               WHERE id = $1
               RETURNING {SELECT_COLS}"#
        ))
        .bind(payment.id)
        .bind(payment.status)
        .bind(&payment.gateway_response)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at)
        .bind(payment.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let rec = sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {SELECT_COLS} FROM payments WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn get_by_reference(&self, reference: &str) -> AppResult<Option<Payment>> {
        let rec = sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {SELECT_COLS} FROM payments WHERE payment_reference = $1"#
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let recs = sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {SELECT_COLS} FROM payments
               WHERE user_id = $1
               ORDER BY created_at DESC"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(recs)
    }

    async fn list_by_subscription(&self, subscription_id: Uuid) -> AppResult<Vec<Payment>> {
        let recs = sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {SELECT_COLS} FROM payments
               WHERE subscription_id = $1
               ORDER BY created_at DESC"#
        ))
        .bind(subscription_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(recs)
    }
}
