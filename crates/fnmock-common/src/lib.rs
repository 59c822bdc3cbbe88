//! Value model shared by the fnmock crates.
//!
//! This crate provides the leaf components of the interception core:
//! - Runtime type descriptors (`ValueType`, `Signature`)
//! - Tagged values (`Value`) and the `args!` macro
//! - The value comparator (`structurally_equal`)
//! - The type coercion engine (`coerce`, `coerce_tuple`)
//! - Shared limits

// Runtime type descriptors
pub mod types;
pub use types::{FloatKind, IntKind, Signature, ValueType};

// Tagged values
pub mod value;
pub use value::{Data, Value};

// Structural equality
pub mod compare;
pub use compare::structurally_equal;

// Validation and conversion of declared values
pub mod coerce;
pub use coerce::{CoerceError, coerce, coerce_tuple};

// Centralized limits
pub mod limits;
