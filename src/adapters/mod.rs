//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the checkout contract to external systems:
//! - `stripe` - Stripe Checkout (embedded UI) and webhook confirmation

pub mod stripe;

pub use stripe::{MockCheckoutManager, StripeCheckoutManager, StripeConfig};
