//! Scoring policies.
//!
//! # `group_score`
//!
//! Nodes without the label `group=Scale` get the maximum score. Labeled
//! nodes are scored by how much of their capacity is already requested by
//! the pods indexed on them:
//!
//! ```text
//! score = (cpu_requested / cpu_capacity + mem_requested / mem_capacity) * 100
//! ```
//!
//! truncated to an integer. Note that this is the plain sum of the two
//! ratios scaled by 100, not their average; the formula is kept exactly as
//! deployed. A missing or zero capacity makes its term zero, and the result
//! is clamped to `0..=MAX_EXTENDER_PRIORITY`.

use k8s_openapi::api::core::v1::{Node, Pod};
use scale_extender_core::protocol::node_name;
use scale_extender_core::{HostPriority, HostPriorityList};
use scale_extender_index::PodLookup;
use tracing::{debug, error};

use crate::aggregate::{node_capacity, sum_requests, ResourceTotals};
use crate::error::Result;

/// Name of the utilization-based group scoring policy.
pub const GROUP_SCORE: &str = "group_score";

/// Highest score an extender may return.
pub const MAX_EXTENDER_PRIORITY: i64 = 1000;

/// Label key selecting the node group.
pub const GROUP_LABEL: &str = "group";

/// Label value of the group scored by utilization.
pub const SCALE_GROUP: &str = "Scale";

/// The available scoring policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityPolicy {
    /// Utilization-based score for `group=Scale` nodes.
    GroupScore,
}

impl PriorityPolicy {
    /// All priorities, in registration order.
    pub const ALL: [Self; 1] = [Self::GroupScore];

    /// The name the policy is served under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GroupScore => GROUP_SCORE,
        }
    }

    /// Score every node for `pod`.
    ///
    /// The result has one entry per node, in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot score the request as a whole.
    /// Per-node failures never surface here; they degrade that node's score.
    pub fn prioritize(
        &self,
        pods: &dyn PodLookup,
        _pod: &Pod,
        nodes: &[Node],
    ) -> Result<HostPriorityList> {
        match self {
            Self::GroupScore => Ok(nodes.iter().map(|node| group_score(pods, node)).collect()),
        }
    }
}

/// Whether the node belongs to the utilization-scored group.
#[must_use]
pub fn in_scale_group(node: &Node) -> bool {
    node.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(GROUP_LABEL))
        .is_some_and(|group| group == SCALE_GROUP)
}

fn group_score(pods: &dyn PodLookup, node: &Node) -> HostPriority {
    let name = node_name(node);

    let score = if in_scale_group(node) {
        match pods.node_pods(name) {
            Ok(indexed) => {
                let requested = sum_requests(indexed.iter().map(AsRef::as_ref));
                utilization_score(requested, node_capacity(node))
            }
            Err(e) => {
                error!(node = name, error = %e, "Pod lookup failed, scoring node 0");
                0
            }
        }
    } else {
        MAX_EXTENDER_PRIORITY
    };

    debug!(node = name, score, "Scored node");
    HostPriority::new(name, score)
}

/// Score a node from what is requested on it and its capacity.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn utilization_score(requested: ResourceTotals, capacity: ResourceTotals) -> i64 {
    let ratio = |requested: i64, capacity: i64| {
        if capacity <= 0 {
            0.0
        } else {
            requested as f64 / capacity as f64
        }
    };

    let utilization = ratio(requested.cpu_millis, capacity.cpu_millis)
        + ratio(requested.memory_bytes, capacity.memory_bytes);

    // Float-to-int casts saturate, so the clamp covers overflow too.
    ((utilization * 100.0) as i64).clamp(0, MAX_EXTENDER_PRIORITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_extender_index::testing::{node, pod, pod_with_requests};
    use scale_extender_index::{IndexError, PodNodeIndex};
    use std::sync::Arc;

    const GI: i64 = 1024 * 1024 * 1024;

    /// Fails lookups for one node and delegates the rest.
    struct FailingFor<'a> {
        node: &'a str,
        inner: &'a PodNodeIndex,
    }

    impl PodLookup for FailingFor<'_> {
        fn node_pods(&self, node_name: &str) -> scale_extender_index::Result<Vec<Arc<Pod>>> {
            if node_name == self.node {
                Err(IndexError::NotSynced)
            } else {
                self.inner.node_pods(node_name)
            }
        }
    }

    fn synced_index(pods: Vec<Pod>) -> PodNodeIndex {
        let index = PodNodeIndex::new();
        index.replace_all(pods);
        index
    }

    fn scores(list: &HostPriorityList) -> Vec<(&str, i64)> {
        list.iter().map(|h| (h.host.as_str(), h.score)).collect()
    }

    fn score(pods: &dyn PodLookup, nodes: &[Node]) -> HostPriorityList {
        PriorityPolicy::GroupScore
            .prioritize(pods, &pod("default", "incoming", "", "Pending"), nodes)
            .unwrap()
    }

    #[test]
    fn unlabeled_node_gets_max_score() {
        let index = synced_index(vec![pod_with_requests(
            "default",
            "busy",
            "plain",
            "Running",
            &[("4", "8Gi")],
        )]);

        let list = score(&index, &[node("plain", &[], "4", "8Gi")]);
        assert_eq!(scores(&list), [("plain", 1000)]);
    }

    #[test]
    fn other_group_value_gets_max_score() {
        let index = synced_index(Vec::new());
        let list = score(&index, &[node("n1", &[("group", "scale")], "4", "8Gi")]);
        assert_eq!(scores(&list), [("n1", 1000)]);
    }

    #[test]
    fn labeled_node_without_pods_scores_zero() {
        let index = synced_index(Vec::new());
        let list = score(&index, &[node("n1", &[("group", "Scale")], "4", "8Gi")]);
        assert_eq!(scores(&list), [("n1", 0)]);
    }

    #[test]
    fn half_cpu_and_half_memory_scores_one_hundred() {
        let index = synced_index(vec![pod_with_requests(
            "default",
            "half",
            "n1",
            "Running",
            &[("2", "4Gi")],
        )]);

        let list = score(&index, &[node("n1", &[("group", "Scale")], "4", "8Gi")]);
        assert_eq!(scores(&list), [("n1", 100)]);
    }

    #[test]
    fn two_pods_on_scale_node() {
        let index = synced_index(vec![
            pod_with_requests("default", "a", "n1", "Running", &[("1", "1Gi")]),
            pod_with_requests("default", "b", "n1", "Running", &[("1", "1Gi")]),
        ]);

        let list = score(&index, &[node("n1", &[("group", "Scale")], "4", "8Gi")]);
        assert_eq!(scores(&list), [("n1", 75)]);
    }

    #[test]
    fn terminated_pods_do_not_count() {
        let index = synced_index(vec![
            pod_with_requests("default", "a", "n1", "Running", &[("1", "1Gi")]),
            pod_with_requests("default", "done", "n1", "Succeeded", &[("3", "7Gi")]),
        ]);

        let list = score(&index, &[node("n1", &[("group", "Scale")], "4", "8Gi")]);
        // 1/4 + 1/8 = 0.375
        assert_eq!(scores(&list), [("n1", 37)]);
    }

    #[test]
    fn output_matches_input_order_and_length() {
        let index = synced_index(vec![pod_with_requests(
            "default",
            "a",
            "s1",
            "Running",
            &[("2", "4Gi")],
        )]);
        let nodes = [
            node("z", &[], "4", "8Gi"),
            node("s1", &[("group", "Scale")], "4", "8Gi"),
            node("a", &[], "4", "8Gi"),
            node("s2", &[("group", "Scale")], "4", "8Gi"),
        ];

        let list = score(&index, &nodes);
        assert_eq!(
            scores(&list),
            [("z", 1000), ("s1", 100), ("a", 1000), ("s2", 0)]
        );
    }

    #[test]
    fn lookup_failure_degrades_only_that_node() {
        let index = synced_index(vec![
            pod_with_requests("default", "a", "good", "Running", &[("2", "4Gi")]),
            pod_with_requests("default", "b", "bad", "Running", &[("2", "4Gi")]),
        ]);
        let lookup = FailingFor {
            node: "bad",
            inner: &index,
        };
        let nodes = [
            node("good", &[("group", "Scale")], "4", "8Gi"),
            node("bad", &[("group", "Scale")], "4", "8Gi"),
            node("plain", &[], "4", "8Gi"),
        ];

        let list = score(&lookup, &nodes);
        assert_eq!(scores(&list), [("good", 100), ("bad", 0), ("plain", 1000)]);
    }

    #[test]
    fn unsynced_index_scores_labeled_nodes_zero() {
        let index = PodNodeIndex::new();
        let list = score(
            &index,
            &[
                node("s", &[("group", "Scale")], "4", "8Gi"),
                node("p", &[], "4", "8Gi"),
            ],
        );
        assert_eq!(scores(&list), [("s", 0), ("p", 1000)]);
    }

    #[test]
    fn out_of_range_quantities_contribute_nothing() {
        let index = synced_index(vec![pod_with_requests(
            "default",
            "a",
            "n1",
            "Running",
            &[("0.5e-2147483648", "4Gi")],
        )]);

        let list = score(
            &index,
            &[node("n1", &[("group", "Scale")], "1e2147483647", "8Gi")],
        );
        // Only the memory term survives: 4Gi / 8Gi.
        assert_eq!(scores(&list), [("n1", 50)]);
    }

    #[test]
    fn empty_node_list() {
        let index = synced_index(Vec::new());
        assert!(score(&index, &[]).is_empty());
    }

    #[test]
    fn utilization_score_formula() {
        let capacity = ResourceTotals::new(4000, 8 * GI);
        assert_eq!(utilization_score(ResourceTotals::default(), capacity), 0);
        assert_eq!(
            utilization_score(ResourceTotals::new(2000, 2 * GI), capacity),
            75
        );
        assert_eq!(
            utilization_score(ResourceTotals::new(4000, 8 * GI), capacity),
            200
        );
    }

    #[test]
    fn utilization_score_fractional_cpu() {
        let capacity = ResourceTotals::new(1000, 0);
        assert_eq!(utilization_score(ResourceTotals::new(250, 0), capacity), 25);
    }

    #[test]
    fn utilization_score_zero_capacity_term_is_zero() {
        let requested = ResourceTotals::new(2000, 4 * GI);
        assert_eq!(
            utilization_score(requested, ResourceTotals::new(0, 8 * GI)),
            50
        );
        assert_eq!(utilization_score(requested, ResourceTotals::default()), 0);
    }

    #[test]
    fn utilization_score_is_clamped() {
        let capacity = ResourceTotals::new(1000, GI);
        assert_eq!(
            utilization_score(ResourceTotals::new(100_000, 100 * GI), capacity),
            MAX_EXTENDER_PRIORITY
        );
    }

    #[test]
    fn scale_group_label() {
        assert!(in_scale_group(&node("n", &[("group", "Scale")], "", "")));
        assert!(!in_scale_group(&node("n", &[("group", "Other")], "", "")));
        assert!(!in_scale_group(&node("n", &[("tier", "Scale")], "", "")));
        assert!(!in_scale_group(&node("n", &[], "", "")));
    }
}
