//! Checkout Gateway - hosted checkout creation and payment confirmation
//!
//! Callers create a checkout session through the [`ports::CheckoutManager`]
//! contract, render the embedded payment UI with the returned client secret,
//! and later confirm payment from the processor's signed webhook delivery.
//! The only processor adapter shipped is Stripe ([`adapters::stripe`]).

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
