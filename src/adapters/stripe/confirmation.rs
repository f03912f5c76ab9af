//! Checkout confirmation from a verified Stripe event.
//!
//! Runs after signature verification. Decides whether the event confirms a
//! paid checkout, reports an expired one, or is not relevant to checkout
//! confirmation at all.

use crate::ports::{Metadata, PaymentError};

use super::webhook_types::{StripeCheckoutSession, StripeEventType, StripeWebhookEvent};

/// Interprets a verified event.
///
/// - `checkout.session.completed`: metadata when the session is paid,
///   `PaymentStatusIsNotPaid` otherwise
/// - `checkout.session.expired`: `CheckoutExpiredError` carrying the metadata
/// - anything else: `NotCheckoutConfirmedEvent`
pub fn confirm_event(event: &StripeWebhookEvent) -> Result<Metadata, PaymentError> {
    let session = match event.parsed_type() {
        StripeEventType::CheckoutSessionCompleted => checkout_session(event)?,
        StripeEventType::CheckoutSessionExpired => {
            let session = checkout_session(event)?;
            tracing::info!(
                event_id = %event.id,
                session_id = %session.id,
                "Checkout session expired"
            );
            return Err(PaymentError::checkout_expired(
                "Checkout session expired",
                session.metadata,
            ));
        }
        other => {
            tracing::debug!(event_id = %event.id, event_type = %other.as_str(), "Ignoring event");
            return Err(PaymentError::not_checkout_confirmed_event(format!(
                "Not a checkout session completed event. Instead got {:?}",
                other.as_str()
            )));
        }
    };

    if !session.is_paid() {
        tracing::warn!(
            event_id = %event.id,
            session_id = %session.id,
            payment_status = %session.payment_status,
            "Checkout session completed without payment"
        );
        return Err(PaymentError::not_paid(format!(
            "Payment status is not paid. Instead got {:?}",
            session.payment_status
        )));
    }

    tracing::info!(
        event_id = %event.id,
        session_id = %session.id,
        "Checkout session confirmed paid"
    );

    Ok(session.metadata)
}

fn checkout_session(event: &StripeWebhookEvent) -> Result<StripeCheckoutSession, PaymentError> {
    event.deserialize_object().map_err(|e| {
        tracing::warn!(event_id = %event.id, error = %e, "Invalid checkout session in event");
        PaymentError::invalid_webhook_event_data("failed to unmarshal checkout session", e)
    })
}
