//! Stripe-specific wire types.
//!
//! These types represent Stripe API objects as they arrive in webhook payloads
//! and API responses. Only fields relevant to checkout confirmation are
//! captured; everything else in Stripe's schema is ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::Metadata;

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
    #[error("Missing Stripe-Signature header")]
    MissingHeader,

    #[error("Malformed signature element '{0}'")]
    MalformedPair(String),

    #[error("Missing timestamp (t=) in signature")]
    MissingTimestamp,

    #[error("Invalid timestamp format")]
    InvalidTimestamp,

    #[error("Missing v1 signature in header")]
    MissingV1Signature,

    #[error("Invalid signature format (not valid hex)")]
    InvalidSignatureFormat,
}

/// Parsed Stripe-Signature header components.
///
/// The header format is: `t=timestamp,v1=signature[,v1=signature...][,v0=legacy]`.
/// Stripe sends one `v1` entry per active endpoint secret, so several may be
/// present while a secret is being rolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the payload.
    pub timestamp: i64,

    /// Every v1 signature (HMAC-SHA256), decoded from hex.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse a Stripe-Signature header into components.
    ///
    /// Unknown schemes (including legacy `v0`) are skipped.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| SignatureParseError::MalformedPair(part.trim().to_string()))?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let signature = hex::decode(value.trim())
                        .map_err(|_| SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(signature);
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    #[serde(default)]
    pub created: i64,

    /// Event payload containing the affected object.
    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,

    /// Stripe API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event (shape depends on the event type).
    pub object: serde_json::Value,

    /// Previous values for updated fields (on update events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeWebhookEvent {
    /// Parse the event type into a known variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_type(&self.event_type)
    }

    /// Deserialize the embedded data object as the given type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }
}

/// Stripe event types relevant to checkout confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventType {
    /// Customer finished the checkout form.
    CheckoutSessionCompleted,

    /// Session expired before the customer paid.
    CheckoutSessionExpired,

    /// Delayed payment method (e.g. bank debit) succeeded after completion.
    CheckoutSessionAsyncPaymentSucceeded,

    /// Delayed payment method failed after completion.
    CheckoutSessionAsyncPaymentFailed,

    /// Any other event type.
    Other(String),
}

impl StripeEventType {
    pub fn from_type(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            "checkout.session.async_payment_succeeded" => {
                Self::CheckoutSessionAsyncPaymentSucceeded
            }
            "checkout.session.async_payment_failed" => Self::CheckoutSessionAsyncPaymentFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CheckoutSessionExpired => "checkout.session.expired",
            Self::CheckoutSessionAsyncPaymentSucceeded => {
                "checkout.session.async_payment_succeeded"
            }
            Self::CheckoutSessionAsyncPaymentFailed => "checkout.session.async_payment_failed",
            Self::Other(s) => s,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Payment status (paid, unpaid, no_payment_required).
    pub payment_status: String,

    /// Session status (open, complete, expired).
    #[serde(default)]
    pub status: Option<String>,

    /// Custom metadata attached at creation (`null` reads as empty).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Metadata,

    /// Secret for the embedded checkout form.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Customer email collected or pre-filled.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// When the session expires (Unix timestamp).
    #[serde(default)]
    pub expires_at: Option<i64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

impl StripeCheckoutSession {
    pub const PAYMENT_STATUS_PAID: &'static str = "paid";

    pub fn is_paid(&self) -> bool {
        self.payment_status == Self::PAYMENT_STATUS_PAID
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// API Errors
// ════════════════════════════════════════════════════════════════════════════════

/// Error reported by the Stripe API for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Stripe API error (HTTP {status}): {message}")]
pub struct StripeApiError {
    /// HTTP status returned by Stripe.
    pub status: u16,

    /// Error category (api_error, card_error, invalid_request_error, ...).
    pub error_type: Option<String>,

    /// Machine-readable error code, if provided.
    pub code: Option<String>,

    /// Request parameter the error relates to, if any.
    pub param: Option<String>,

    /// Human-readable message.
    pub message: String,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
    param: Option<String>,
    message: Option<String>,
}

impl StripeApiError {
    /// Builds the error from a non-success response body.
    ///
    /// Falls back to the raw body when it is not Stripe's JSON error shape.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<StripeErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status,
                error_type: envelope.error.error_type,
                code: envelope.error.code,
                param: envelope.error.param,
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| "no message".to_string()),
            },
            Err(_) => Self {
                status,
                error_type: None,
                code: None,
                param: None,
                message: body.to_string(),
            },
        }
    }
}
