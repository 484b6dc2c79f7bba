/**
 * Subscription Model and Database Operations
 *
 * The `one_active_subscription_per_user` partial unique index backs the
 * one-active-row invariant, so a concurrent insert surfaces as a unique
 * violation here rather than a race the application has to win.
 */

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Trial subscriptions last 7 days
const TRIAL_DAYS: i64 = 7;

/// Paid subscriptions last 365 days from payment
const PAID_DAYS: i64 = 365;

/// Subscription plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Basic,
    Premium,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Basic => "basic",
            PlanTier::Premium => "premium",
        }
    }

    /// Whether this tier is purchasable through checkout
    pub fn is_paid(self) -> bool {
        matches!(self, PlanTier::Basic | PlanTier::Premium)
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "basic" => Ok(PlanTier::Basic),
            "premium" => Ok(PlanTier::Premium),
            _ => Err(()),
        }
    }
}

/// Subscription row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_type, is_active, start_date, end_date, \
     stripe_customer_id, stripe_subscription_id";

/// Get a user's active subscription, if any
pub async fn get_active_subscription(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<Subscription>, sqlx::Error> {
    let row = sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 AND is_active"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Create a trial subscription ending 7 days from now
pub async fn create_trial_subscription(
    pool: &PgPool,
    user_id: Uuid,
    plan: PlanTier,
) -> Result<Subscription, sqlx::Error> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, Subscription>(&format!(
        r#"
        INSERT INTO subscriptions (id, user_id, plan_type, is_active, start_date, end_date)
        VALUES ($1, $2, $3, TRUE, $4, $5)
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(plan.as_str())
    .bind(now)
    .bind(now + Duration::days(TRIAL_DAYS))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Upgrade an active subscription row in place after a completed payment
///
/// Extends end_date to a year from now, records the provider's customer
/// and subscription ids, and switches the plan to the purchased tier.
/// The original start_date is kept; payment extends a subscription, it
/// does not restart it.
pub async fn mark_subscription_paid(
    pool: &PgPool,
    subscription_id: Uuid,
    plan: PlanTier,
    stripe_customer_id: Option<&str>,
    stripe_subscription_id: Option<&str>,
) -> Result<Subscription, sqlx::Error> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE subscriptions
        SET plan_type = $2,
            end_date = $3,
            stripe_customer_id = $4,
            stripe_subscription_id = $5
        WHERE id = $1
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(subscription_id)
    .bind(plan.as_str())
    .bind(now + Duration::days(PAID_DAYS))
    .bind(stripe_customer_id)
    .bind(stripe_subscription_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Insert a fresh paid subscription for a user with no active row
pub async fn insert_paid_subscription(
    pool: &PgPool,
    user_id: Uuid,
    plan: PlanTier,
    stripe_customer_id: Option<&str>,
    stripe_subscription_id: Option<&str>,
) -> Result<Subscription, sqlx::Error> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, Subscription>(&format!(
        r#"
        INSERT INTO subscriptions
            (id, user_id, plan_type, is_active, start_date, end_date,
             stripe_customer_id, stripe_subscription_id)
        VALUES ($1, $2, $3, TRUE, $4, $5, $6, $7)
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(plan.as_str())
    .bind(now)
    .bind(now + Duration::days(PAID_DAYS))
    .bind(stripe_customer_id)
    .bind(stripe_subscription_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Whether a database error is a unique-constraint violation
///
/// Postgres reports these with SQLSTATE 23505; the partial index on
/// active subscriptions raises one when two creates race.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tier_parsing() {
        assert_eq!("free".parse(), Ok(PlanTier::Free));
        assert_eq!("basic".parse(), Ok(PlanTier::Basic));
        assert_eq!("premium".parse(), Ok(PlanTier::Premium));
        assert!("gold".parse::<PlanTier>().is_err());
        assert!("Basic".parse::<PlanTier>().is_err());
        assert!("".parse::<PlanTier>().is_err());
    }

    #[test]
    fn test_plan_tier_display_round_trip() {
        for tier in [PlanTier::Free, PlanTier::Basic, PlanTier::Premium] {
            assert_eq!(tier.to_string().parse(), Ok(tier));
        }
    }

    #[test]
    fn test_paid_tiers() {
        assert!(!PlanTier::Free.is_paid());
        assert!(PlanTier::Basic.is_paid());
        assert!(PlanTier::Premium.is_paid());
    }
}
