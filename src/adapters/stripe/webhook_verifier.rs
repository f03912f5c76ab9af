//! Stripe webhook signature verification.
//!
//! Implements verification of Stripe webhook signatures using HMAC-SHA256.
//! Includes timestamp validation to prevent replay attacks.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::webhook_types::{SignatureHeader, SignatureParseError, StripeWebhookEvent};

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for webhook events (5 minutes), matching Stripe's SDKs.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Errors that occur while authenticating a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Stripe-Signature header could not be parsed.
    #[error("Invalid signature header: {0}")]
    Header(#[from] SignatureParseError),

    /// No v1 signature matched the expected HMAC.
    #[error("No signatures found matching the expected signature for payload")]
    InvalidSignature,

    /// Webhook timestamp is older than the tolerance.
    #[error("Timestamp out of range ({age_secs} seconds old)")]
    TimestampOutOfRange { age_secs: i64 },

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Timestamp is in the future")]
    InvalidTimestamp,

    /// Signed payload is not a Stripe event envelope.
    #[error("Failed to parse webhook payload: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Verifier for Stripe webhook signatures.
#[derive(Clone)]
pub struct StripeWebhookVerifier {
    /// The endpoint signing secret (whsec_...).
    secret: SecretString,

    /// Maximum accepted event age in seconds.
    tolerance_secs: i64,
}

impl std::fmt::Debug for StripeWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeWebhookVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl StripeWebhookVerifier {
    /// Creates a new verifier with the given endpoint secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Overrides the maximum event age.
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn tolerance_secs(&self) -> i64 {
        self.tolerance_secs
    }

    /// Verifies the webhook signature and parses the event.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate timestamp is within acceptable range
    /// 3. Compute expected signature using HMAC-SHA256
    /// 4. Compare against every v1 signature in constant time
    /// 5. Parse the JSON payload into a `StripeWebhookEvent`
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeWebhookEvent, WebhookError> {
        self.verify(payload, signature_header, chrono::Utc::now().timestamp())?;

        let event: StripeWebhookEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }

    /// Checks the signature against the payload as of `now` (Unix seconds).
    pub fn verify(&self, payload: &[u8], signature_header: &str, now: i64) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp, now)?;

        let expected = self.compute_signature(header.timestamp, payload);
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));

        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Builds a Stripe-Signature header for `payload` signed at `timestamp`.
    ///
    /// Used by test fixtures and the mock processor to produce deliveries
    /// that pass [`verify`](Self::verify).
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        let signature = self.compute_signature(timestamp, payload);
        format!("t={},v1={}", timestamp, hex::encode(signature))
    }

    fn validate_timestamp(&self, timestamp: i64, now: i64) -> Result<(), WebhookError> {
        // Header timestamp is unauthenticated at this point
        let age = now
            .checked_sub(timestamp)
            .ok_or(WebhookError::InvalidTimestamp)?;

        if age > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfRange { age_secs: age });
        }

        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    /// HMAC-SHA256 over `"{timestamp}.{payload}"`.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
