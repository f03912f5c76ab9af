//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the calling application and the outside world. Adapters implement these ports.
//!
//! ## Payment Ports
//!
//! - `CheckoutManager` - Hosted checkout creation and webhook confirmation
//! - `PaymentError` - Error taxonomy shared by every checkout adapter

mod checkout_manager;
mod payment_error;

pub use checkout_manager::{CheckoutInfo, CheckoutManager, CheckoutParams, Item, Metadata};
pub use payment_error::{BoxError, PaymentError, PaymentErrorReason};
