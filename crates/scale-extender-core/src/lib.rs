//! Core types for the scale-extender scheduler extension.
//!
//! This crate provides the foundational types shared by the index, the
//! scheduling policies and the HTTP service:
//!
//! - [`PodKey`] - Namespaced pod identity used to key the pod-node index
//! - [`ResourceQuantity`] - Kubernetes resource quantity parsing
//! - [`protocol`] - The scheduler extender wire envelopes

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod protocol;
pub mod quantity;

pub use error::{CoreError, Result};
pub use ids::PodKey;
pub use protocol::{
    ExtenderArgs, ExtenderBindingArgs, ExtenderBindingResult, ExtenderFilterResult, HostPriority,
    HostPriorityList, NodeList,
};
pub use quantity::ResourceQuantity;
