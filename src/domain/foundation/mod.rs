//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects and validation errors that checkout
//! requests are built from.

mod errors;
mod money;

pub use errors::ValidationError;
pub use money::{CurrencyCode, Money};
