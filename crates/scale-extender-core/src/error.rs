//! Common error types for scale-extender.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors shared across the scale-extender crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The string is not a valid Kubernetes resource quantity.
    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),

    /// The quantity is valid but does not fit in 64 bits at the requested scale.
    #[error("quantity {0:?} is out of range")]
    QuantityOutOfRange(String),
}
