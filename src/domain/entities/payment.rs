use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a direct-debit payment attempt.
///
/// Transitions are monotonic: `Processing` may move to `Paid` or `Failed`,
/// and both of those are terminal. Callers must check `can_transition_to`
/// before mutating a stored payment so that replayed gateway callbacks
/// cannot re-settle a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Processing,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        }
    }

    /// Terminal payments must never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Failed)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Processing, PaymentStatus::Paid)
                | (PaymentStatus::Processing, PaymentStatus::Failed)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single direct-debit attempt against a subscription.
///
/// Identity, amount and bank fields are set once at creation; only status,
/// gateway response, failure reason, `paid_at` and `updated_at` mutate
/// afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub bvn: String,
    pub account_number: String,
    pub bank_name: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub status: PaymentStatus,
    pub payment_reference: String,
    pub gateway_response: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
