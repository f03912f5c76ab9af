//! Stripe checkout adapter.
//!
//! Implements the `CheckoutManager` trait against the Stripe API: embedded
//! checkout sessions in one-time `payment` mode, confirmed from signed
//! `checkout.session.*` webhook events.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let manager = StripeCheckoutManager::new(config);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::PaymentConfig;
use crate::ports::{CheckoutInfo, CheckoutManager, CheckoutParams, Metadata, PaymentError};

use super::confirmation::confirm_event;
use super::webhook_types::StripeApiError;
use super::webhook_verifier::{StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS};

/// Default Stripe API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook endpoint signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Maximum accepted webhook age in seconds.
    webhook_tolerance_secs: i64,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the maximum accepted webhook age.
    pub fn with_webhook_tolerance(mut self, secs: i64) -> Self {
        self.webhook_tolerance_secs = secs;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}

impl From<&PaymentConfig> for StripeConfig {
    fn from(config: &PaymentConfig) -> Self {
        Self::new(
            config.stripe_api_key.expose_secret().clone(),
            config.stripe_webhook_secret.expose_secret().clone(),
        )
        .with_base_url(config.api_base_url.clone())
        .with_webhook_tolerance(config.webhook_tolerance_secs)
    }
}

/// Stripe checkout manager.
///
/// Holds only immutable configuration and a pooled HTTP client, so one
/// instance can be shared across tasks.
#[derive(Debug, Clone)]
pub struct StripeCheckoutManager {
    config: StripeConfig,
    http_client: reqwest::Client,
    verifier: StripeWebhookVerifier,
}

impl StripeCheckoutManager {
    /// Create a new Stripe manager with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a manager that reuses an existing HTTP client
    /// (timeouts, proxies and TLS settings come from the client).
    pub fn with_http_client(config: StripeConfig, http_client: reqwest::Client) -> Self {
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.expose_secret().clone())
            .with_tolerance(config.webhook_tolerance_secs);

        Self {
            config,
            http_client,
            verifier,
        }
    }

    pub fn from_config(config: &PaymentConfig) -> Self {
        Self::new(StripeConfig::from(config))
    }
}

/// Session fields read back from the create response.
#[derive(Deserialize)]
struct CreatedSession {
    id: String,
    client_secret: Option<String>,
}

/// Translates checkout params into Stripe's form-encoded session request.
///
/// Mode and UI mode are fixed (`payment`, `embedded`). `expires_at` is only
/// sent when a session lifetime was requested, computed from `now`.
pub fn checkout_form(params: &CheckoutParams, now: DateTime<Utc>) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("ui_mode".to_string(), "embedded".to_string()),
        ("return_url".to_string(), params.return_url.clone()),
    ];

    for (i, item) in params.items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        form.push((format!("{}[quantity]", prefix), item.quantity().to_string()));
        form.push((
            format!("{}[price_data][currency]", prefix),
            item.price.currency().as_str().to_string(),
        ));
        form.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.price.amount_minor().to_string(),
        ));
        form.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.name.clone(),
        ));
    }

    for (key, value) in &params.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }

    if let Some(enabled) = params.allow_adaptive_pricing {
        form.push(("adaptive_pricing[enabled]".to_string(), enabled.to_string()));
    }

    if let Some(email) = &params.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }

    if let Some(duration) = params.session_alive_duration {
        let expires_at = (now + duration).timestamp();
        form.push(("expires_at".to_string(), expires_at.to_string()));
    }

    form
}

#[async_trait]
impl CheckoutManager for StripeCheckoutManager {
    async fn create_checkout(&self, params: CheckoutParams) -> Result<CheckoutInfo, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let form = checkout_form(&params, Utc::now());

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Stripe create checkout session request failed");
                PaymentError::failed_to_create_checkout_session(
                    "failed to create checkout session",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let api_error = StripeApiError::from_response(status.as_u16(), &error_text);
            tracing::error!(
                status = status.as_u16(),
                error_type = ?api_error.error_type,
                error = %api_error.message,
                "Stripe create checkout session failed"
            );
            return Err(PaymentError::failed_to_create_checkout_session(
                "failed to create checkout session",
                api_error,
            ));
        }

        let session: CreatedSession = response.json().await.map_err(|e| {
            PaymentError::failed_to_create_checkout_session(
                "failed to parse Stripe checkout session response",
                e,
            )
        })?;

        if session.id.is_empty() {
            return Err(PaymentError::failed_to_create_checkout_session(
                "failed to create checkout session",
                "session response has an empty id",
            ));
        }

        let client_secret = session
            .client_secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                PaymentError::failed_to_create_checkout_session(
                    "failed to create checkout session",
                    format!("session {} has no client secret", session.id),
                )
            })?;

        tracing::info!(
            session_id = %session.id,
            line_items = params.items.len(),
            "Checkout session created"
        );

        Ok(CheckoutInfo {
            client_secret,
            session_id: session.id,
        })
    }

    async fn confirm_checkout(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<Metadata, PaymentError> {
        let event = self.verifier.verify_and_parse(payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Webhook failed signature verification");
            PaymentError::signature_validation("payload failed signature verification", e)
        })?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Webhook signature verified"
        );

        confirm_event(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;
    use crate::ports::{Item, PaymentErrorReason};
    use chrono::TimeZone;
    use std::error::Error as _;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn test_config() -> StripeConfig {
        StripeConfig::new("sk_test_key", WEBHOOK_SECRET)
    }

    fn params() -> CheckoutParams {
        CheckoutParams::new(
            "https://example.com/return?session_id={CHECKOUT_SESSION_ID}",
            vec![
                Item::new("Registration", Money::from_minor("USD", 5000).unwrap()),
                Item::new("T-shirt", Money::from_minor("usd", 1500).unwrap()).with_quantity(2),
            ],
        )
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn signed(payload: &str) -> String {
        StripeWebhookVerifier::new(WEBHOOK_SECRET).sign(payload.as_bytes(), Utc::now().timestamp())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("api_key", "webhook_secret");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.webhook_tolerance_secs, DEFAULT_TOLERANCE_SECS);
    }

    #[test]
    fn config_with_base_url_trims_trailing_slash() {
        let config = StripeConfig::new("key", "secret").with_base_url("http://localhost:8080/");
        assert_eq!(config.api_base_url(), "http://localhost:8080");
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let debug = format!("{:?}", test_config());
        assert!(!debug.contains("sk_test_key"));
        assert!(!debug.contains(WEBHOOK_SECRET));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Translation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn form_fixes_mode_and_ui_mode() {
        let form = checkout_form(&params(), Utc::now());

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(value(&form, "ui_mode"), Some("embedded"));
        assert_eq!(
            value(&form, "return_url"),
            Some("https://example.com/return?session_id={CHECKOUT_SESSION_ID}")
        );
    }

    #[test]
    fn form_maps_line_items_in_order() {
        let form = checkout_form(&params(), Utc::now());

        assert_eq!(value(&form, "line_items[0][quantity]"), Some("1"));
        assert_eq!(value(&form, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("5000"));
        assert_eq!(
            value(&form, "line_items[0][price_data][product_data][name]"),
            Some("Registration")
        );
        assert_eq!(value(&form, "line_items[1][quantity]"), Some("2"));
        assert_eq!(
            value(&form, "line_items[1][price_data][product_data][name]"),
            Some("T-shirt")
        );
    }

    #[test]
    fn form_passes_metadata_verbatim() {
        let params = params()
            .with_metadata_entry("order_id", "123")
            .with_metadata_entry("event", "spring open");
        let form = checkout_form(&params, Utc::now());

        assert_eq!(value(&form, "metadata[order_id]"), Some("123"));
        assert_eq!(value(&form, "metadata[event]"), Some("spring open"));
    }

    #[test]
    fn form_omits_unset_optional_fields() {
        let form = checkout_form(&params(), Utc::now());

        assert!(value(&form, "expires_at").is_none());
        assert!(value(&form, "customer_email").is_none());
        assert!(value(&form, "adaptive_pricing[enabled]").is_none());
    }

    #[test]
    fn form_sets_optional_fields_when_present() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let params = params()
            .with_session_alive_duration(chrono::Duration::minutes(30))
            .with_adaptive_pricing(false)
            .with_customer_email("buyer@example.com");

        let form = checkout_form(&params, now);

        let expected_expiry = (now + chrono::Duration::minutes(30)).timestamp().to_string();
        assert_eq!(value(&form, "expires_at"), Some(expected_expiry.as_str()));
        assert_eq!(value(&form, "adaptive_pricing[enabled]"), Some("false"));
        assert_eq!(value(&form, "customer_email"), Some("buyer@example.com"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Confirmation Tests
    // ════════════════════════════════════════════════════════════════════════════

    const PAID_EVENT: &str = r#"{
        "id": "evt_paid",
        "type": "checkout.session.completed",
        "created": 1704067200,
        "data": {
            "object": {
                "id": "cs_test",
                "object": "checkout.session",
                "payment_status": "paid",
                "status": "complete",
                "metadata": {"order_id": "123"}
            }
        },
        "livemode": false
    }"#;

    #[tokio::test]
    async fn confirm_checkout_valid_paid_event() {
        let manager = StripeCheckoutManager::new(test_config());

        let metadata = manager
            .confirm_checkout(PAID_EVENT.as_bytes(), &signed(PAID_EVENT))
            .await
            .unwrap();

        assert_eq!(metadata.get("order_id").map(String::as_str), Some("123"));
    }

    #[tokio::test]
    async fn confirm_checkout_rejects_invalid_signature() {
        let manager = StripeCheckoutManager::new(test_config());
        let signature = format!("t={},v1={}", Utc::now().timestamp(), "a".repeat(64));

        let err = manager
            .confirm_checkout(PAID_EVENT.as_bytes(), &signature)
            .await
            .unwrap_err();

        assert_eq!(err.reason(), PaymentErrorReason::SignatureValidation);
        assert!(err.metadata().is_none());
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn confirm_checkout_rejects_malformed_header() {
        let manager = StripeCheckoutManager::new(test_config());

        let err = manager
            .confirm_checkout(PAID_EVENT.as_bytes(), "malformed_header")
            .await
            .unwrap_err();

        assert_eq!(err.reason(), PaymentErrorReason::SignatureValidation);
    }

    #[tokio::test]
    async fn confirm_checkout_rejects_stale_delivery() {
        let manager =
            StripeCheckoutManager::new(test_config().with_webhook_tolerance(60));
        let signature = StripeWebhookVerifier::new(WEBHOOK_SECRET)
            .sign(PAID_EVENT.as_bytes(), Utc::now().timestamp() - 120);

        let err = manager
            .confirm_checkout(PAID_EVENT.as_bytes(), &signature)
            .await
            .unwrap_err();

        assert_eq!(err.reason(), PaymentErrorReason::SignatureValidation);
    }

    #[tokio::test]
    async fn confirm_checkout_signed_non_event_is_signature_error() {
        let manager = StripeCheckoutManager::new(test_config());
        let payload = "not valid json";

        let err = manager
            .confirm_checkout(payload.as_bytes(), &signed(payload))
            .await
            .unwrap_err();

        assert_eq!(err.reason(), PaymentErrorReason::SignatureValidation);
    }
}
