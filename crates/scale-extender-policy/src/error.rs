//! Error types for the policy crate.

use thiserror::Error;

/// Errors raised by scheduling policies and the policy registry.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The request carried no pod.
    #[error("extender arguments carry no pod")]
    MissingPod,

    /// No predicate is registered under this name.
    #[error("unknown predicate: {0}")]
    UnknownPredicate(String),

    /// No priority is registered under this name.
    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    /// Binding was routed to this extender, which never binds.
    #[error(
        "This extender doesn't support Bind.  Please make 'BindVerb' be empty in your ExtenderConfig."
    )]
    BindUnsupported,
}

/// A specialized Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
