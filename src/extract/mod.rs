//! Deterministic text-pattern extractors.
//!
//! These never call the reasoning engine. Their results take precedence over
//! whatever the model reports for the same field.

mod contact;
mod pricing;

pub use contact::{ContactInfo, extract_contacts};
pub use pricing::{MAX_PRICE_MATCHES, extract_pricing};
