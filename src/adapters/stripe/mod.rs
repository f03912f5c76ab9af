//! Stripe checkout adapter.
//!
//! Implements the `CheckoutManager` port for Stripe integration, including:
//! - Embedded checkout session creation
//! - Webhook signature verification
//! - Checkout confirmation from `checkout.session.*` events
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window by default)
//! - All secrets are handled via `secrecy::SecretString`

mod confirmation;
mod mock_checkout_manager;
mod stripe_adapter;
mod webhook_types;
mod webhook_verifier;

pub use confirmation::confirm_event;
pub use mock_checkout_manager::{MethodCall, MockCheckoutManager, WebhookVerifyMode};
pub use stripe_adapter::{checkout_form, StripeCheckoutManager, StripeConfig, DEFAULT_API_BASE_URL};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeApiError, StripeCheckoutSession, StripeEventData,
    StripeEventType, StripeWebhookEvent,
};
pub use webhook_verifier::{StripeWebhookVerifier, WebhookError, DEFAULT_TOLERANCE_SECS};
