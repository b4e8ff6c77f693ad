use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::subscription::{
        BillingCycle, Subscription, SubscriptionStatus, SubscriptionTier,
    },
};

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription>;
    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>>;
    /// Subscriptions whose next billing date is at or before `cutoff`.
    async fn list_due(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionInput {
    pub tier: String,
    pub billing_cycle: String,
    pub delivery_day: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionProfile {
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

impl SubscriptionProfile {
    pub fn from_subscription(s: &Subscription) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            tier: s.tier.clone(),
            billing_cycle: s.billing_cycle,
            status: s.status,
            delivery_day: s.delivery_day.clone(),
            next_billing_date: s.next_billing_date,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
}

impl SubscriptionUseCases {
    pub fn new(repo: Arc<dyn SubscriptionRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, input))]
    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        input: CreateSubscriptionInput,
    ) -> AppResult<SubscriptionProfile> {
        let tier = SubscriptionTier::from_str(input.tier.trim()).map_err(|_| {
            AppError::InvalidInput(
                "Tier must be one of: ESSENTIALS, STANDARD, PREMIUM".to_string(),
            )
        })?;
        let billing_cycle = BillingCycle::from_str(input.billing_cycle.trim())
            .map_err(|_| AppError::InvalidInput("Billing cycle must be MONTHLY or YEARLY".to_string()))?;

        let now = Utc::now().naive_utc();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            tier: tier.to_string(),
            billing_cycle,
            status: SubscriptionStatus::Pending,
            delivery_day: input.delivery_day,
            next_billing_date: None,
            created_at: now,
            updated_at: now,
        };

        let saved = self.repo.insert(&subscription).await?;
        info!(subscription_id = %saved.id, tier = %saved.tier, "Subscription created");
        Ok(SubscriptionProfile::from_subscription(&saved))
    }

    pub async fn get_subscription(
        &self,
        subscription_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<SubscriptionProfile> {
        let subscription = self.owned(subscription_id, current_user_id).await?;
        Ok(SubscriptionProfile::from_subscription(&subscription))
    }

    pub async fn list_user_subscriptions(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<SubscriptionProfile>> {
        let subscriptions = self.repo.list_by_user(user_id).await?;
        Ok(subscriptions
            .iter()
            .map(SubscriptionProfile::from_subscription)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn pause_subscription(
        &self,
        subscription_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<SubscriptionProfile> {
        let mut subscription = self.owned(subscription_id, current_user_id).await?;
        if subscription.status != SubscriptionStatus::Active {
            return Err(AppError::BusinessRule(
                "Only an active subscription can be paused".to_string(),
            ));
        }
        subscription.status = SubscriptionStatus::Paused;
        subscription.updated_at = Utc::now().naive_utc();
        let saved = self.repo.update(&subscription).await?;
        Ok(SubscriptionProfile::from_subscription(&saved))
    }

    #[instrument(skip(self))]
    pub async fn resume_subscription(
        &self,
        subscription_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<SubscriptionProfile> {
        let mut subscription = self.owned(subscription_id, current_user_id).await?;
        if subscription.status != SubscriptionStatus::Paused {
            return Err(AppError::BusinessRule(
                "Only a paused subscription can be resumed".to_string(),
            ));
        }
        subscription.status = SubscriptionStatus::Active;
        subscription.updated_at = Utc::now().naive_utc();
        let saved = self.repo.update(&subscription).await?;
        Ok(SubscriptionProfile::from_subscription(&saved))
    }

    #[instrument(skip(self))]
    pub async fn cancel_subscription(
        &self,
        subscription_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<SubscriptionProfile> {
        let mut subscription = self.owned(subscription_id, current_user_id).await?;
        if subscription.status.is_cancelled() {
            return Err(AppError::BusinessRule(
                "Subscription is already cancelled".to_string(),
            ));
        }
        subscription.status = SubscriptionStatus::Cancelled;
        subscription.updated_at = Utc::now().naive_utc();
        let saved = self.repo.update(&subscription).await?;
        info!(subscription_id = %saved.id, "Subscription cancelled");
        Ok(SubscriptionProfile::from_subscription(&saved))
    }

    /// Manual activation path. The normal route to ACTIVE is a confirmed
    /// successful payment; this exists for support flows.
    #[instrument(skip(self))]
    pub async fn activate_subscription(
        &self,
        subscription_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<SubscriptionProfile> {
        let mut subscription = self.owned(subscription_id, current_user_id).await?;
        if subscription.status != SubscriptionStatus::Pending {
            return Err(AppError::BusinessRule(
                "Subscription is not in pending status".to_string(),
            ));
        }
        let now = Utc::now().naive_utc();
        subscription.status = SubscriptionStatus::Active;
        subscription.next_billing_date = Some(subscription.billing_cycle.advance(now));
        subscription.updated_at = now;
        let saved = self.repo.update(&subscription).await?;
        Ok(SubscriptionProfile::from_subscription(&saved))
    }

    pub async fn delete_subscription(
        &self,
        subscription_id: Uuid,
        current_user_id: Uuid,
    ) -> AppResult<()> {
        self.owned(subscription_id, current_user_id).await?;
        self.repo.delete(subscription_id).await
    }

    /// Daily billing sweep. Every ACTIVE subscription whose billing date has
    /// elapsed gets the date advanced by one cycle and drops back to PENDING
    /// so the next debit goes through the normal payment path. Per-item
    /// failures are logged and skipped; the sweep reports how many records it
    /// advanced.
    #[instrument(skip(self))]
    pub async fn process_due_subscriptions(&self) -> AppResult<u32> {
        let now = Utc::now().naive_utc();
        let due = self.repo.list_due(now).await?;

        let mut processed = 0u32;
        for mut subscription in due {
            if subscription.status != SubscriptionStatus::Active {
                continue;
            }
            let from = subscription.next_billing_date.unwrap_or(now);
            subscription.next_billing_date = Some(subscription.billing_cycle.advance(from));
            subscription.status = SubscriptionStatus::Pending;
            subscription.updated_at = now;

            match self.repo.update(&subscription).await {
                Ok(_) => processed += 1,
                Err(e) => {
                    error!(
                        subscription_id = %subscription.id,
                        error = %e,
                        "Failed to advance billing cycle"
                    );
                }
            }
        }

        Ok(processed)
    }

    async fn owned(&self, subscription_id: Uuid, current_user_id: Uuid) -> AppResult<Subscription> {
        let subscription = self
            .repo
            .get_by_id(subscription_id)
            .await?
            .ok_or(AppError::NotFound("Subscription"))?;
        if subscription.user_id != current_user_id {
            return Err(AppError::Forbidden(
                "Subscription does not belong to current user".to_string(),
            ));
        }
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{factories::create_test_subscription, mocks::InMemorySubscriptionRepo};
    use chrono::Duration;

    fn use_cases(repo: Arc<InMemorySubscriptionRepo>) -> SubscriptionUseCases {
        SubscriptionUseCases::new(repo)
    }

    #[tokio::test]
    async fn create_starts_pending_with_canonical_tier() {
        let repo = Arc::new(InMemorySubscriptionRepo::new());
        let uc = use_cases(repo.clone());
        let user_id = Uuid::new_v4();

        let profile = uc
            .create_subscription(
                user_id,
                CreateSubscriptionInput {
                    tier: "standard".to_string(),
                    billing_cycle: "monthly".to_string(),
                    delivery_day: Some("SATURDAY".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.status, SubscriptionStatus::Pending);
        assert_eq!(profile.tier, "STANDARD");
        assert_eq!(profile.billing_cycle, BillingCycle::Monthly);
        assert!(profile.next_billing_date.is_none());
    }

    #[tokio::test]
    async fn create_rejects_unknown_tier_and_cycle() {
        let uc = use_cases(Arc::new(InMemorySubscriptionRepo::new()));
        let user_id = Uuid::new_v4();

        let err = uc
            .create_subscription(
                user_id,
                CreateSubscriptionInput {
                    tier: "GOLD".to_string(),
                    billing_cycle: "MONTHLY".to_string(),
                    delivery_day: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = uc
            .create_subscription(
                user_id,
                CreateSubscriptionInput {
                    tier: "PREMIUM".to_string(),
                    billing_cycle: "WEEKLY".to_string(),
                    delivery_day: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn pause_and_resume_guard_status() {
        let repo = Arc::new(InMemorySubscriptionRepo::new());
        let uc = use_cases(repo.clone());
        let user_id = Uuid::new_v4();
        let subscription = create_test_subscription(user_id, |s| {
            s.status = SubscriptionStatus::Active;
        });
        repo.insert(&subscription).await.unwrap();

        // Pending subscriptions cannot be paused.
        let pending = create_test_subscription(user_id, |_| {});
        repo.insert(&pending).await.unwrap();
        assert!(matches!(
            uc.pause_subscription(pending.id, user_id).await,
            Err(AppError::BusinessRule(_))
        ));

        let paused = uc.pause_subscription(subscription.id, user_id).await.unwrap();
        assert_eq!(paused.status, SubscriptionStatus::Paused);

        let resumed = uc.resume_subscription(subscription.id, user_id).await.unwrap();
        assert_eq!(resumed.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn ownership_is_enforced() {
        let repo = Arc::new(InMemorySubscriptionRepo::new());
        let uc = use_cases(repo.clone());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let subscription = create_test_subscription(owner, |_| {});
        repo.insert(&subscription).await.unwrap();

        assert!(matches!(
            uc.get_subscription(subscription.id, stranger).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            uc.cancel_subscription(subscription.id, stranger).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn activate_sets_next_billing_date() {
        let repo = Arc::new(InMemorySubscriptionRepo::new());
        let uc = use_cases(repo.clone());
        let user_id = Uuid::new_v4();
        let subscription = create_test_subscription(user_id, |_| {});
        repo.insert(&subscription).await.unwrap();

        let activated = uc
            .activate_subscription(subscription.id, user_id)
            .await
            .unwrap();
        assert_eq!(activated.status, SubscriptionStatus::Active);
        assert!(activated.next_billing_date.is_some());
    }

    #[tokio::test]
    async fn sweep_advances_only_due_active_subscriptions() {
        let repo = Arc::new(InMemorySubscriptionRepo::new());
        let uc = use_cases(repo.clone());
        let user_id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        let due = create_test_subscription(user_id, |s| {
            s.status = SubscriptionStatus::Active;
            s.next_billing_date = Some(now - Duration::days(1));
        });
        let not_due = create_test_subscription(user_id, |s| {
            s.status = SubscriptionStatus::Active;
            s.next_billing_date = Some(now + Duration::days(10));
        });
        repo.insert(&due).await.unwrap();
        repo.insert(&not_due).await.unwrap();

        let processed = uc.process_due_subscriptions().await.unwrap();
        assert_eq!(processed, 1);

        let advanced = repo.get_by_id(due.id).await.unwrap().unwrap();
        assert_eq!(advanced.status, SubscriptionStatus::Pending);
        assert!(advanced.next_billing_date.unwrap() > now);

        let untouched = repo.get_by_id(not_due.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, SubscriptionStatus::Active);
        assert_eq!(untouched.next_billing_date, not_due.next_billing_date);
    }
}
