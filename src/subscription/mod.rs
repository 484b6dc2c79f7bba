/**
 * Subscription Management
 *
 * Plan tiers, subscription rows, and the HTTP handlers for creating
 * trials, checking status, starting checkout, and processing payment
 * provider webhooks.
 */

pub mod db;
pub mod handlers;

pub use db::{PlanTier, Subscription};
pub use handlers::{create_checkout_session, create_subscription, handle_webhook, subscription_status};
