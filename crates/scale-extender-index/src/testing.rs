//! Builders for pods and nodes used in tests across the workspace.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, Node, NodeStatus, Pod, PodSpec, PodStatus, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;

/// A pod with no containers.
#[must_use]
pub fn pod(namespace: &str, name: &str, node: &str, phase: &str) -> Pod {
    pod_with_requests(namespace, name, node, phase, &[])
}

/// A pod with one container per `(cpu, memory)` request pair.
///
/// An empty string leaves that resource unrequested.
#[must_use]
pub fn pod_with_requests(
    namespace: &str,
    name: &str,
    node: &str,
    phase: &str,
    requests: &[(&str, &str)],
) -> Pod {
    let containers = requests
        .iter()
        .enumerate()
        .map(|(i, (cpu, memory))| Container {
            name: format!("c{i}"),
            resources: Some(ResourceRequirements {
                requests: Some(resource_map(cpu, memory)),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();

    Pod {
        metadata: ObjectMeta {
            namespace: Some(namespace.to_string()),
            name: Some(name.to_string()),
            uid: Some(format!("uid-{namespace}-{name}")),
            ..Default::default()
        },
        spec: Some(PodSpec {
            node_name: (!node.is_empty()).then(|| node.to_string()),
            containers,
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
    }
}

/// A node with labels and a CPU/memory capacity.
#[must_use]
pub fn node(name: &str, labels: &[(&str, &str)], cpu: &str, memory: &str) -> Node {
    let labels: BTreeMap<String, String> = labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: (!labels.is_empty()).then_some(labels),
            ..Default::default()
        },
        status: Some(NodeStatus {
            capacity: Some(resource_map(cpu, memory)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Convert a pod into the dynamic form the watcher yields.
///
/// # Panics
///
/// Panics if the pod cannot be serialized, which never happens for pods
/// built by this module.
#[must_use]
pub fn dynamic(pod: &Pod) -> DynamicObject {
    let mut value = serde_json::to_value(pod).expect("pod serializes");
    value["apiVersion"] = "v1".into();
    value["kind"] = "Pod".into();
    serde_json::from_value(value).expect("pod converts to a dynamic object")
}

fn resource_map(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    let mut map = BTreeMap::new();
    if !cpu.is_empty() {
        map.insert("cpu".to_string(), Quantity(cpu.to_string()));
    }
    if !memory.is_empty() {
        map.insert("memory".to_string(), Quantity(memory.to_string()));
    }
    map
}
