//! Filter policies.
//!
//! A predicate answers whether a pod may run on a node. It returns
//! `Ok(false)` to reject a node on policy grounds and an error only when it
//! cannot evaluate the pair at all.

use k8s_openapi::api::core::v1::{Node, Pod};
use scale_extender_index::PodLookup;

use crate::error::Result;

/// Name of the predicate that accepts every node.
pub const ALWAYS_TRUE: &str = "always_true";

/// The available filter policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicatePolicy {
    /// Accepts every node for every pod.
    AlwaysTrue,
}

impl PredicatePolicy {
    /// All predicates, in registration order.
    pub const ALL: [Self; 1] = [Self::AlwaysTrue];

    /// The name the policy is served under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AlwaysTrue => ALWAYS_TRUE,
        }
    }

    /// Decide whether `pod` may run on `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair cannot be evaluated.
    pub fn evaluate(&self, _pods: &dyn PodLookup, _pod: &Pod, _node: &Node) -> Result<bool> {
        match self {
            Self::AlwaysTrue => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_extender_index::testing::{node, pod};
    use scale_extender_index::PodNodeIndex;

    #[test]
    fn always_true_accepts_everything() {
        let index = PodNodeIndex::new();
        let p = pod("default", "web", "", "Pending");

        for n in [
            node("n1", &[("group", "Scale")], "4", "8Gi"),
            node("absent-from-index", &[], "", ""),
        ] {
            assert!(PredicatePolicy::AlwaysTrue
                .evaluate(&index, &p, &n)
                .unwrap());
        }
    }

    #[test]
    fn served_names() {
        let names: Vec<_> = PredicatePolicy::ALL.iter().map(PredicatePolicy::name).collect();
        assert_eq!(names, [ALWAYS_TRUE]);
    }
}
