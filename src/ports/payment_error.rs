//! Errors returned by checkout adapters.
//!
//! Every failure carries a reason for programmatic matching, a human-readable
//! message, and optionally the underlying cause, exposed through
//! [`std::error::Error::source`] so callers can walk the whole chain.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Metadata;

/// Boxed underlying cause of a [`PaymentError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error from a checkout operation.
#[derive(Debug)]
pub struct PaymentError {
    reason: PaymentErrorReason,
    message: String,
    metadata: Option<Metadata>,
    cause: Option<BoxError>,
}

impl PaymentError {
    fn new(reason: PaymentErrorReason, message: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self {
            reason,
            message: message.into(),
            metadata: None,
            cause,
        }
    }

    /// The webhook payload or its signature did not verify.
    pub fn signature_validation(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::new(
            PaymentErrorReason::SignatureValidation,
            message,
            Some(cause.into()),
        )
    }

    /// The processor rejected the session, or the call never reached it.
    pub fn failed_to_create_checkout_session(
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::new(
            PaymentErrorReason::FailedToCreateCheckoutSession,
            message,
            Some(cause.into()),
        )
    }

    /// A verified event's session object could not be decoded.
    pub fn invalid_webhook_event_data(
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::new(
            PaymentErrorReason::InvalidWebhookEventData,
            message,
            Some(cause.into()),
        )
    }

    /// The event type is not one the confirmation flow handles.
    pub fn not_checkout_confirmed_event(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorReason::NotCheckoutConfirmedEvent, message, None)
    }

    /// The session expired before payment. Keeps the session metadata.
    pub fn checkout_expired(message: impl Into<String>, metadata: Metadata) -> Self {
        let mut err = Self::new(PaymentErrorReason::CheckoutExpired, message, None);
        err.metadata = Some(metadata);
        err
    }

    /// The session completed but its payment status is not "paid".
    pub fn not_paid(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorReason::PaymentStatusIsNotPaid, message, None)
    }

    pub fn reason(&self) -> PaymentErrorReason {
        self.reason
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Session metadata, present only for [`PaymentErrorReason::CheckoutExpired`].
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Consumes the error, returning the session metadata if it carried any.
    pub fn into_metadata(self) -> Option<Metadata> {
        self.metadata
    }

    pub fn is_expired(&self) -> bool {
        self.reason == PaymentErrorReason::CheckoutExpired
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}.", self.reason, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " Cause: {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for PaymentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Categories of checkout failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentErrorReason {
    /// Payload/signature did not verify.
    SignatureValidation,

    /// Processor rejected the creation call or transport failed.
    FailedToCreateCheckoutSession,

    /// Verified payload's session data could not be decoded.
    InvalidWebhookEventData,

    /// Event type is not one this flow handles.
    NotCheckoutConfirmedEvent,

    /// Session expired before payment completed.
    CheckoutExpired,

    /// Session completed but payment status isn't "paid".
    PaymentStatusIsNotPaid,
}

impl PaymentErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentErrorReason::SignatureValidation => "SignatureValidationError",
            PaymentErrorReason::FailedToCreateCheckoutSession => "FailedToCreateCheckoutSession",
            PaymentErrorReason::InvalidWebhookEventData => "InvalidWebhookEventData",
            PaymentErrorReason::NotCheckoutConfirmedEvent => "NotCheckoutConfirmedEvent",
            PaymentErrorReason::CheckoutExpired => "CheckoutExpiredError",
            PaymentErrorReason::PaymentStatusIsNotPaid => "PaymentStatusIsNotPaid",
        }
    }
}

impl fmt::Display for PaymentErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
