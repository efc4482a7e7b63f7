//! Scheduler extender wire protocol.
//!
//! These envelopes mirror the `k8s.io/kube-scheduler/extender/v1` types. The
//! upstream Go structs carry no JSON tags, so every field is serialized under
//! its exported Go name (`Pod`, `NodeNames`, `FailedNodes`, ...).

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ListMeta, ObjectMeta};
use serde::{Deserialize, Serialize};

/// Map from node name to the reason the node was filtered out.
pub type FailedNodesMap = BTreeMap<String, String>;

/// Arguments of a filter or prioritize callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtenderArgs {
    /// The pod being scheduled.
    #[serde(default)]
    pub pod: Option<Pod>,
    /// Candidate nodes, sent when the extender is not node-cache capable.
    #[serde(default)]
    pub nodes: Option<NodeList>,
    /// Candidate node names, sent when the extender is node-cache capable.
    #[serde(default)]
    pub node_names: Option<Vec<String>>,
}

impl ExtenderArgs {
    /// Whether the scheduler sent only node names.
    #[must_use]
    pub fn names_only(&self) -> bool {
        self.nodes.is_none() && self.node_names.is_some()
    }

    /// The candidate nodes in request order.
    ///
    /// Name-only requests yield nodes that carry nothing but their name.
    #[must_use]
    pub fn candidate_nodes(&self) -> Vec<Node> {
        match (&self.nodes, &self.node_names) {
            (Some(list), _) => list.items.clone(),
            (None, Some(names)) => names.iter().map(|name| named_node(name)).collect(),
            (None, None) => Vec::new(),
        }
    }
}

/// A list of nodes as embedded in extender arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeList {
    /// List metadata; always empty on the wire.
    #[serde(default)]
    pub metadata: ListMeta,
    /// The nodes.
    #[serde(default)]
    pub items: Vec<Node>,
}

impl NodeList {
    /// Wrap a vector of nodes.
    #[must_use]
    pub fn new(items: Vec<Node>) -> Self {
        Self {
            metadata: ListMeta::default(),
            items,
        }
    }
}

/// Response to a filter callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtenderFilterResult {
    /// Nodes that passed the filter, when the request carried full nodes.
    #[serde(default)]
    pub nodes: Option<NodeList>,
    /// Node names that passed the filter, when the request carried names.
    #[serde(default)]
    pub node_names: Option<Vec<String>>,
    /// Nodes that failed the filter, with the reason.
    #[serde(default)]
    pub failed_nodes: FailedNodesMap,
    /// Nodes that failed and that preemption cannot help.
    #[serde(default)]
    pub failed_and_unresolvable_nodes: FailedNodesMap,
    /// Error text for the whole call; empty on success.
    #[serde(default)]
    pub error: String,
}

impl ExtenderFilterResult {
    /// A result that rejects the whole call with an error.
    #[must_use]
    pub fn from_error(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            ..Self::default()
        }
    }

    /// Names of the nodes that passed, whichever form the result uses.
    #[must_use]
    pub fn passed_node_names(&self) -> Vec<String> {
        match (&self.nodes, &self.node_names) {
            (Some(list), _) => list
                .items
                .iter()
                .map(|n| n.metadata.name.clone().unwrap_or_default())
                .collect(),
            (None, Some(names)) => names.clone(),
            (None, None) => Vec::new(),
        }
    }
}

impl PartialEq for NodeList {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

/// The score a priority policy assigned to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostPriority {
    /// Node name.
    pub host: String,
    /// Score, between 0 and the extender maximum.
    pub score: i64,
}

impl HostPriority {
    /// Create a new host priority.
    #[must_use]
    pub fn new(host: impl Into<String>, score: i64) -> Self {
        Self {
            host: host.into(),
            score,
        }
    }
}

/// Response to a prioritize callback, in request node order.
pub type HostPriorityList = Vec<HostPriority>;

/// Arguments of a bind callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtenderBindingArgs {
    /// Name of the pod to bind.
    #[serde(rename = "PodName", default)]
    pub pod_name: String,
    /// Namespace of the pod to bind.
    #[serde(rename = "PodNamespace", default)]
    pub pod_namespace: String,
    /// UID of the pod to bind.
    #[serde(rename = "PodUID", default)]
    pub pod_uid: String,
    /// Node the pod should be bound to.
    #[serde(rename = "Node", default)]
    pub node: String,
}

/// Response to a bind callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtenderBindingResult {
    /// Error text; empty on success.
    #[serde(default)]
    pub error: String,
}

/// Name of a node, or the empty string if it has none.
#[must_use]
pub fn node_name(node: &Node) -> &str {
    node.metadata.name.as_deref().unwrap_or_default()
}

fn named_node(name: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_args_with_nodes() {
        let args: ExtenderArgs = serde_json::from_value(json!({
            "Pod": {"metadata": {"name": "web", "namespace": "default"}},
            "Nodes": {"metadata": {}, "items": [
                {"metadata": {"name": "n1", "labels": {"group": "Scale"}}},
                {"metadata": {"name": "n2"}}
            ]},
            "NodeNames": null
        }))
        .unwrap();

        assert!(!args.names_only());
        assert_eq!(
            args.pod.as_ref().and_then(|p| p.metadata.name.as_deref()),
            Some("web")
        );
        let names: Vec<_> = args
            .candidate_nodes()
            .iter()
            .map(|n| node_name(n).to_string())
            .collect();
        assert_eq!(names, ["n1", "n2"]);
    }

    #[test]
    fn decode_args_with_node_names() {
        let args: ExtenderArgs = serde_json::from_value(json!({
            "Pod": {"metadata": {"name": "web"}},
            "NodeNames": ["a", "b"]
        }))
        .unwrap();

        assert!(args.names_only());
        let nodes = args.candidate_nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(node_name(&nodes[1]), "b");
        assert!(nodes[0].metadata.labels.is_none());
    }

    #[test]
    fn filter_result_wire_names() {
        let mut result = ExtenderFilterResult {
            node_names: Some(vec!["n1".to_string()]),
            ..Default::default()
        };
        result
            .failed_nodes
            .insert("n2".to_string(), "too busy".to_string());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["NodeNames"], json!(["n1"]));
        assert_eq!(value["FailedNodes"]["n2"], "too busy");
        assert_eq!(value["FailedAndUnresolvableNodes"], json!({}));
        assert_eq!(value["Error"], "");
        assert_eq!(result.passed_node_names(), ["n1"]);
    }

    #[test]
    fn host_priority_wire_names() {
        let list: HostPriorityList = vec![HostPriority::new("n1", 75)];
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([{"Host": "n1", "Score": 75}])
        );
    }

    #[test]
    fn binding_args_wire_names() {
        let args: ExtenderBindingArgs = serde_json::from_value(json!({
            "PodName": "web",
            "PodNamespace": "default",
            "PodUID": "abc-123",
            "Node": "n1"
        }))
        .unwrap();

        assert_eq!(args.pod_uid, "abc-123");
        assert_eq!(args.node, "n1");
    }
}
