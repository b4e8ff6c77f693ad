//! Test data factories. Each returns a complete, valid record; use the
//! closure parameter to override fields.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    payment::{Payment, PaymentStatus},
    subscription::{BillingCycle, Subscription, SubscriptionStatus},
};

pub fn test_datetime() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn create_test_subscription(
    user_id: Uuid,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let now = test_datetime();
    let mut subscription = Subscription {
        id: Uuid::new_v4(),
        user_id,
        tier: "STANDARD".to_string(),
        billing_cycle: BillingCycle::Monthly,
        status: SubscriptionStatus::Pending,
        delivery_day: None,
        next_billing_date: None,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut subscription);
    subscription
}

pub fn create_test_payment(
    user_id: Uuid,
    subscription_id: Uuid,
    overrides: impl FnOnce(&mut Payment),
) -> Payment {
    let now = test_datetime();
    let mut payment = Payment {
        id: Uuid::new_v4(),
        user_id,
        subscription_id,
        amount: 140_000,
        currency: "NGN".to_string(),
        bvn: "12345678901".to_string(),
        account_number: "1234567890".to_string(),
        bank_name: "GTBank".to_string(),
        phone_number: "+2348012345678".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
        status: PaymentStatus::Processing,
        payment_reference: format!(
            "PAY_{}",
            Uuid::new_v4().simple().to_string()[..16].to_uppercase()
        ),
        gateway_response: None,
        failure_reason: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut payment);
    payment
}
