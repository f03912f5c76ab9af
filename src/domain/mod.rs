//! Domain layer containing processor-independent value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared value objects (money, currency) and validation errors

pub mod foundation;
