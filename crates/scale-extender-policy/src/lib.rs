//! Scheduling policies for the scale-extender scheduler extension.
//!
//! Each callback the scheduler makes is routed by name to a policy:
//!
//! - **Predicates** ([`PredicatePolicy`]) decide whether a pod may run on a
//!   node. `always_true` accepts every node.
//! - **Priorities** ([`PriorityPolicy`]) score candidate nodes.
//!   `group_score` scores `group=Scale` nodes higher the more of their
//!   capacity is already requested, and gives every other node the maximum
//!   score.
//! - **Bind** ([`BindPolicy`]) is always declined, leaving binding to the
//!   scheduler.
//!
//! Policies read cluster state only through
//! [`PodLookup`](scale_extender_index::PodLookup), so they run against the
//! live index in production and against plain fakes in tests.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scale_extender_core::ExtenderArgs;
//! use scale_extender_index::PodNodeIndex;
//! use scale_extender_policy::PolicyRegistry;
//!
//! let index = PodNodeIndex::new();
//! index.replace_all(Vec::new());
//!
//! let registry = PolicyRegistry::with_defaults(Arc::new(index));
//! let result = registry.filter("always_true", &ExtenderArgs::default());
//! assert_eq!(result.error, "extender arguments carry no pod");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregate;
pub mod bind;
pub mod error;
pub mod predicate;
pub mod priority;
pub mod registry;

pub use aggregate::{node_capacity, pod_requests, sum_requests, ResourceTotals};
pub use bind::BindPolicy;
pub use error::{PolicyError, Result};
pub use predicate::{PredicatePolicy, ALWAYS_TRUE};
pub use priority::{
    in_scale_group, utilization_score, PriorityPolicy, GROUP_SCORE, MAX_EXTENDER_PRIORITY,
};
pub use registry::PolicyRegistry;
