/**
 * Billing Client
 *
 * Thin client for the payment provider's HTTP API. Covers the two
 * operations the subscription flow needs: creating a hosted checkout
 * session and verifying webhook signatures.
 *
 * # Webhook Signatures
 *
 * The provider signs each webhook delivery with an HMAC-SHA256 over
 * `"{timestamp}.{raw_body}"` and sends it in the `Stripe-Signature`
 * header as `t=<timestamp>,v1=<hex digest>`. Verification recomputes
 * the digest with the shared webhook secret and compares in constant
 * time.
 */

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use crate::server::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from billing operations
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("checkout session request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected checkout session response: {0}")]
    Response(String),

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    MalformedEvent(String),
}

/// Parsed webhook event, reduced to the fields the handler acts on
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    /// Event type, e.g. "checkout.session.completed"
    pub event_type: String,
    /// Our user id, set as client_reference_id at session creation
    pub client_reference_id: Option<String>,
    /// Provider customer id
    pub customer: Option<String>,
    /// Provider subscription id
    pub subscription: Option<String>,
    /// Plan tier carried through session metadata
    pub plan_type: Option<String>,
}

/// Client for the payment provider's REST API
#[derive(Clone)]
pub struct BillingClient {
    api_base: String,
    secret_key: String,
    webhook_secret: String,
    price_basic: String,
    price_premium: String,
    frontend_url: String,
    client: Client,
}

impl BillingClient {
    /// Create a billing client
    ///
    /// Trailing slashes on the API base and frontend URL are trimmed so
    /// path joins stay predictable.
    pub fn new(
        api_base: &str,
        secret_key: String,
        webhook_secret: String,
        price_basic: String,
        price_premium: String,
        frontend_url: &str,
        client: Client,
    ) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
            webhook_secret,
            price_basic,
            price_premium,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build a billing client from application configuration
    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        Self::new(
            &config.stripe_api_base,
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
            config.stripe_price_basic.clone(),
            config.stripe_price_premium.clone(),
            &config.frontend_url,
            client,
        )
    }

    /// Price id for a paid plan tier, or None for tiers without one
    pub fn price_for_plan(&self, plan_type: &str) -> Option<&str> {
        match plan_type {
            "basic" => Some(self.price_basic.as_str()),
            "premium" => Some(self.price_premium.as_str()),
            _ => None,
        }
    }

    /// Create a hosted checkout session for a subscription purchase
    ///
    /// # Arguments
    /// * `user_id` - Our user id, carried as client_reference_id
    /// * `plan_type` - "basic" or "premium"
    /// * `price_id` - Provider price id for the plan
    ///
    /// # Returns
    /// The hosted checkout page URL
    pub async fn create_checkout_session(
        &self,
        user_id: &str,
        plan_type: &str,
        price_id: &str,
    ) -> Result<String, BillingError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let success_url = format!(
            "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url
        );
        let cancel_url = format!("{}/cancel", self.frontend_url);

        let params = [
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("mode", "subscription"),
            ("success_url", success_url.as_str()),
            ("cancel_url", cancel_url.as_str()),
            ("client_reference_id", user_id),
            ("metadata[plan_type]", plan_type),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("checkout session creation failed ({}): {}", status, body);
            return Err(BillingError::Response(format!(
                "provider returned {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        body["url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| BillingError::Response("missing checkout url".to_string()))
    }

    /// Verify a webhook signature header against the raw request body
    pub fn verify_signature(&self, signature_header: &str, body: &[u8]) -> Result<(), BillingError> {
        let (timestamp, expected) =
            parse_signature_header(signature_header).ok_or(BillingError::InvalidSignature)?;

        let expected_bytes = hex::decode(expected).map_err(|_| BillingError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| BillingError::InvalidSignature)?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);

        mac.verify_slice(&expected_bytes)
            .map_err(|_| BillingError::InvalidSignature)
    }

    /// Parse a webhook body into the fields the subscription handler uses
    pub fn parse_event(&self, body: &[u8]) -> Result<WebhookEvent, BillingError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| BillingError::MalformedEvent(e.to_string()))?;

        let event_type = value["type"]
            .as_str()
            .ok_or_else(|| BillingError::MalformedEvent("missing event type".to_string()))?
            .to_string();

        let object = &value["data"]["object"];
        Ok(WebhookEvent {
            event_type,
            client_reference_id: object["client_reference_id"].as_str().map(String::from),
            customer: object["customer"].as_str().map(String::from),
            subscription: object["subscription"].as_str().map(String::from),
            plan_type: object["metadata"]["plan_type"].as_str().map(String::from),
        })
    }
}

/// Split a `t=...,v1=...` signature header into (timestamp, hex digest)
fn parse_signature_header(header: &str) -> Option<(&str, &str)> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = Some(value),
            "v1" => signature = Some(value),
            _ => {}
        }
    }

    Some((timestamp?, signature?))
}

/// Compute the signature header for a body, for tests and local tooling
#[cfg(test)]
pub(crate) fn sign_payload(webhook_secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes()).unwrap();
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("t={},v1={}", timestamp, digest)
}
