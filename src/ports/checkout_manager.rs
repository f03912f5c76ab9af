//! Checkout manager port for hosted payment processing.
//!
//! Defines the contract for creating a checkout session with an external
//! payment processor and for confirming that session from the processor's
//! signed webhook delivery. Implementations translate these processor-agnostic
//! types into their own request and event shapes.
//!
//! # Design
//!
//! - **Gateway agnostic**: Callers never see processor SDK or wire types
//! - **Stateless**: Adapters hold only immutable configuration
//! - **Not idempotent**: Every `create_checkout` call opens a new session

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Money;

use super::PaymentError;

/// Caller-defined key/value pairs attached to a session at creation and
/// returned unchanged on confirmation.
pub type Metadata = BTreeMap<String, String>;

/// Port for hosted checkout integrations.
#[async_trait]
pub trait CheckoutManager: Send + Sync {
    /// Create a checkout session for the given items.
    ///
    /// Returns the client secret the front-end needs to render the embedded
    /// payment form, and the session ID that later webhook events refer to.
    async fn create_checkout(&self, params: CheckoutParams) -> Result<CheckoutInfo, PaymentError>;

    /// Confirm a checkout from a raw webhook body and its signature header.
    ///
    /// Returns the metadata attached at creation when the session is paid.
    ///
    /// When the session expired, the returned error still carries the
    /// session metadata (see [`PaymentError::metadata`]) so the caller can
    /// reconcile or cancel the matching order. That is the only error that
    /// carries metadata.
    async fn confirm_checkout(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<Metadata, PaymentError>;
}

/// A single purchasable line in a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Product name shown to the customer.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Number of units (1 when absent).
    pub quantity: Option<u32>,
}

impl Item {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Effective quantity sent to the processor.
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Request to create a checkout session.
///
/// Optional fields fall back to the processor's defaults when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutParams {
    /// Absolute URL the embedded form returns to after completion.
    pub return_url: String,

    /// Line items, in display order.
    pub items: Vec<Item>,

    /// Round-tripped verbatim through the processor.
    pub metadata: Metadata,

    /// How long to keep the session alive.
    /// Check the payment processor for allowed values.
    pub session_alive_duration: Option<chrono::Duration>,

    /// Enable or disable the processor's automatic currency conversion.
    pub allow_adaptive_pricing: Option<bool>,

    /// Customer email used to pre-fill the payment form.
    pub customer_email: Option<String>,
}

impl CheckoutParams {
    pub fn new(return_url: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            return_url: return_url.into(),
            items,
            metadata: Metadata::new(),
            session_alive_duration: None,
            allow_adaptive_pricing: None,
            customer_email: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_session_alive_duration(mut self, duration: chrono::Duration) -> Self {
        self.session_alive_duration = Some(duration);
        self
    }

    pub fn with_adaptive_pricing(mut self, enabled: bool) -> Self {
        self.allow_adaptive_pricing = Some(enabled);
        self
    }

    pub fn with_customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }
}

/// Result of a successful checkout creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutInfo {
    /// Opaque token the front-end uses to complete payment.
    pub client_secret: String,

    /// Processor session ID, referenced by later webhook events.
    pub session_id: String,
}
