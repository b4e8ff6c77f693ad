use chrono::{Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Fallback charge for tiers that fail to parse. Matches the STANDARD price.
pub const DEFAULT_TIER_AMOUNT: i64 = 140_000;

/// Subscription price plans. Amounts are in currency units (NGN).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionTier {
    Essentials,
    Standard,
    Premium,
}

impl SubscriptionTier {
    pub fn amount(&self) -> i64 {
        match self {
            SubscriptionTier::Essentials => 80_000,
            SubscriptionTier::Standard => 140_000,
            SubscriptionTier::Premium => 200_000,
        }
    }
}

/// Charge amount for a raw tier string.
///
/// Unrecognized tiers fall back to the STANDARD amount rather than erroring;
/// subscriptions created through the API always carry a valid tier, but
/// records written by earlier versions of the system may not.
pub fn tier_amount(tier: &str) -> i64 {
    SubscriptionTier::from_str(tier.trim())
        .map(|t| t.amount())
        .unwrap_or(DEFAULT_TIER_AMOUNT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, strum::Display, strum::EnumString)]
#[sqlx(type_name = "billing_cycle", rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// Next billing date, one cycle after `from`.
    pub fn advance(&self, from: NaiveDateTime) -> NaiveDateTime {
        let months = match self {
            BillingCycle::Monthly => Months::new(1),
            BillingCycle::Yearly => Months::new(12),
        };
        from.checked_add_months(months).unwrap_or(from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Paused => "PAUSED",
            SubscriptionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SubscriptionStatus::Cancelled)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's grocery box subscription.
///
/// The tier is stored as free text (canonical uppercase for records created
/// through the API) so that pricing of legacy tier values stays well-defined
/// via `tier_amount`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub delivery_day: Option<String>,
    pub next_billing_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
