//! Mock checkout manager for testing.
//!
//! A fake payment processor implementing `CheckoutManager` for unit and
//! integration tests of calling code. Supports:
//! - In-memory sessions whose metadata round-trips to confirmation
//! - Error injection for session creation
//! - Call tracking
//! - Signed webhook event simulation (completed, expired, arbitrary types)
//!
//! Webhook payloads are rendered in Stripe's event shape and signed with a
//! real [`StripeWebhookVerifier`], so `confirm_checkout` runs the same
//! verification and confirmation path as the production adapter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use crate::ports::{CheckoutInfo, CheckoutManager, CheckoutParams, Metadata, PaymentError};

use super::confirmation::confirm_event;
use super::webhook_types::StripeApiError;
use super::webhook_verifier::StripeWebhookVerifier;

const MOCK_WEBHOOK_SECRET: &str = "whsec_mock_secret";

/// Mock checkout manager for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockCheckoutManager::new();
/// let info = mock.create_checkout(params).await?;
///
/// let (payload, signature) = mock.completed_event(&info.session_id, "paid").unwrap();
/// let metadata = mock.confirm_checkout(&payload, &signature).await?;
/// ```
#[derive(Clone)]
pub struct MockCheckoutManager {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,

    /// Signs and verifies simulated deliveries.
    verifier: StripeWebhookVerifier,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Sessions created so far, by ID.
    sessions: HashMap<String, MockSession>,

    /// Next checkout info to return.
    next_checkout: Option<CheckoutInfo>,

    /// Message of the creation error to return on the next call.
    next_create_error: Option<String>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Webhook verification behavior.
    webhook_verify_mode: WebhookVerifyMode,

    /// Counter for generated event IDs.
    event_seq: u64,
}

/// A session held by the fake processor.
#[derive(Debug, Clone)]
struct MockSession {
    params: CheckoutParams,
    client_secret: String,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WebhookVerifyMode {
    /// Verify signatures with the mock's secret.
    #[default]
    Verify,

    /// Always fail verification.
    AlwaysFail,
}

impl Default for MockCheckoutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCheckoutManager {
    /// Create a new mock with default configuration.
    pub fn new() -> Self {
        Self::with_webhook_secret(MOCK_WEBHOOK_SECRET)
    }

    /// Create a mock that signs deliveries with the given endpoint secret.
    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState::default())),
            verifier: StripeWebhookVerifier::new(secret),
        }
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from later assertions.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the checkout info to return on the next `create_checkout` call.
    pub fn set_checkout_info(&self, info: CheckoutInfo) {
        self.state().next_checkout = Some(info);
    }

    /// Make the next `create_checkout` call fail with a processor rejection.
    pub fn fail_next_create(&self, message: impl Into<String>) {
        self.state().next_create_error = Some(message.into());
    }

    pub fn set_webhook_verify_mode(&self, mode: WebhookVerifyMode) {
        self.state().webhook_verify_mode = mode;
    }

    /// Params a session was created with.
    pub fn session_params(&self, session_id: &str) -> Option<CheckoutParams> {
        self.state()
            .sessions
            .get(session_id)
            .map(|session| session.params.clone())
    }

    pub fn session_count(&self) -> usize {
        self.state().sessions.len()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Simulation
    // ════════════════════════════════════════════════════════════════════════════

    /// Signed `checkout.session.completed` delivery for a stored session.
    pub fn completed_event(
        &self,
        session_id: &str,
        payment_status: &str,
    ) -> Option<(Vec<u8>, String)> {
        self.session_event(session_id, "checkout.session.completed", payment_status, "complete")
    }

    /// Signed `checkout.session.expired` delivery for a stored session.
    pub fn expired_event(&self, session_id: &str) -> Option<(Vec<u8>, String)> {
        self.session_event(session_id, "checkout.session.expired", "unpaid", "expired")
    }

    /// Signed delivery of an arbitrary event type wrapping `object`.
    pub fn event_of_type(&self, event_type: &str, object: serde_json::Value) -> (Vec<u8>, String) {
        let event_id = {
            let mut state = self.state();
            state.event_seq += 1;
            format!("evt_mock_{}", state.event_seq)
        };

        let payload = json!({
            "id": event_id,
            "object": "event",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": object },
            "livemode": false,
        })
        .to_string()
        .into_bytes();

        let signature = self.verifier.sign(&payload, chrono::Utc::now().timestamp());
        (payload, signature)
    }

    fn session_event(
        &self,
        session_id: &str,
        event_type: &str,
        payment_status: &str,
        status: &str,
    ) -> Option<(Vec<u8>, String)> {
        let session = self.state().sessions.get(session_id).cloned()?;

        let object = json!({
            "id": session_id,
            "object": "checkout.session",
            "client_secret": session.client_secret,
            "customer_email": session.params.customer_email,
            "mode": "payment",
            "ui_mode": "embedded",
            "payment_status": payment_status,
            "status": status,
            "metadata": session.params.metadata,
        });

        Some(self.event_of_type(event_type, object))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }
}

#[async_trait]
impl CheckoutManager for MockCheckoutManager {
    async fn create_checkout(&self, params: CheckoutParams) -> Result<CheckoutInfo, PaymentError> {
        self.record_call(
            "create_checkout",
            vec![params.return_url.clone(), params.items.len().to_string()],
        );

        let mut state = self.state();

        if let Some(message) = state.next_create_error.take() {
            return Err(PaymentError::failed_to_create_checkout_session(
                "failed to create checkout session",
                StripeApiError::from_response(400, &message),
            ));
        }

        let info = state.next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
            CheckoutInfo {
                client_secret: format!("{}_secret_{}", id, uuid::Uuid::new_v4().simple()),
                session_id: id,
            }
        });

        state.sessions.insert(
            info.session_id.clone(),
            MockSession {
                params,
                client_secret: info.client_secret.clone(),
            },
        );

        Ok(info)
    }

    async fn confirm_checkout(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<Metadata, PaymentError> {
        self.record_call("confirm_checkout", vec![signature.to_string()]);

        let mode = self.state().webhook_verify_mode;
        let event = match mode {
            WebhookVerifyMode::Verify => self.verifier.verify_and_parse(payload, signature),
            WebhookVerifyMode::AlwaysFail => {
                Err(super::webhook_verifier::WebhookError::InvalidSignature)
            }
        }
        .map_err(|e| PaymentError::signature_validation("payload failed signature verification", e))?;

        confirm_event(&event)
    }
}
