//! Summing the resources requested by pods.
//!
//! Only explicit per-container requests are counted. There is no defaulting
//! for containers without requests and no fallback to limits, which matches
//! the scheduler's own request-based accounting. Init containers are not
//! counted.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use scale_extender_core::ResourceQuantity;
use tracing::debug;

/// CPU and memory amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceTotals {
    /// CPU in millicores (1000 = 1 core).
    pub cpu_millis: i64,
    /// Memory in bytes.
    pub memory_bytes: i64,
}

impl ResourceTotals {
    /// Create totals from millicores and bytes.
    #[must_use]
    pub const fn new(cpu_millis: i64, memory_bytes: i64) -> Self {
        Self {
            cpu_millis,
            memory_bytes,
        }
    }

    /// Read `cpu` and `memory` from a Kubernetes resource map.
    ///
    /// Missing or unparseable entries count as zero.
    #[must_use]
    pub fn from_resource_map(resources: &BTreeMap<String, Quantity>) -> Self {
        Self {
            cpu_millis: read(resources, "cpu", ResourceQuantity::milli_value),
            memory_bytes: read(resources, "memory", ResourceQuantity::value),
        }
    }

    /// Add another set of totals, saturating on overflow.
    pub fn add(&mut self, other: Self) {
        self.cpu_millis = self.cpu_millis.saturating_add(other.cpu_millis);
        self.memory_bytes = self.memory_bytes.saturating_add(other.memory_bytes);
    }
}

fn read(
    resources: &BTreeMap<String, Quantity>,
    name: &str,
    convert: fn(&ResourceQuantity) -> scale_extender_core::Result<i64>,
) -> i64 {
    let Some(quantity) = resources.get(name) else {
        return 0;
    };
    match ResourceQuantity::from_k8s(quantity).and_then(|q| convert(&q)) {
        Ok(amount) => amount,
        Err(e) => {
            debug!(resource = name, error = %e, "Ignoring unusable resource quantity");
            0
        }
    }
}

/// Resources requested by a single pod's containers.
#[must_use]
pub fn pod_requests(pod: &Pod) -> ResourceTotals {
    let mut totals = ResourceTotals::default();
    let containers = pod
        .spec
        .as_ref()
        .map(|s| s.containers.as_slice())
        .unwrap_or_default();

    for container in containers {
        if let Some(requests) = container
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
        {
            totals.add(ResourceTotals::from_resource_map(requests));
        }
    }
    totals
}

/// Sum the requests of every container of every pod.
pub fn sum_requests<'a, I>(pods: I) -> ResourceTotals
where
    I: IntoIterator<Item = &'a Pod>,
{
    pods.into_iter().fold(ResourceTotals::default(), |mut acc, pod| {
        acc.add(pod_requests(pod));
        acc
    })
}

/// The node's capacity, falling back to allocatable when capacity is absent.
#[must_use]
pub fn node_capacity(node: &Node) -> ResourceTotals {
    node.status
        .as_ref()
        .and_then(|s| s.capacity.as_ref().or(s.allocatable.as_ref()))
        .map(ResourceTotals::from_resource_map)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_extender_index::testing::{node, pod, pod_with_requests};

    const GI: i64 = 1024 * 1024 * 1024;

    #[test]
    fn sums_all_containers_of_all_pods() {
        let pods = [
            pod_with_requests(
                "default",
                "a",
                "n1",
                "Running",
                &[("500m", "256Mi"), ("250m", "256Mi")],
            ),
            pod_with_requests("default", "b", "n1", "Running", &[("1", "1Gi")]),
        ];

        let totals = sum_requests(&pods);
        assert_eq!(totals, ResourceTotals::new(1750, GI + 512 * 1024 * 1024));
    }

    #[test]
    fn pods_without_requests_contribute_nothing() {
        let pods = [
            pod("default", "empty", "n1", "Running"),
            pod_with_requests("default", "cpu-only", "n1", "Running", &[("2", "")]),
            pod_with_requests("default", "none", "n1", "Running", &[("", "")]),
        ];

        assert_eq!(sum_requests(&pods), ResourceTotals::new(2000, 0));
        assert_eq!(sum_requests(std::iter::empty()), ResourceTotals::default());
    }

    #[test]
    fn fractional_cpu_keeps_milli_precision() {
        let pods = [
            pod_with_requests("default", "a", "n1", "Running", &[("250m", "")]),
            pod_with_requests("default", "b", "n1", "Running", &[("0.1", "")]),
        ];

        assert_eq!(sum_requests(&pods).cpu_millis, 350);
    }

    #[test]
    fn unparseable_requests_count_as_zero() {
        let pods = [pod_with_requests(
            "default",
            "weird",
            "n1",
            "Running",
            &[("lots", "1Gi")],
        )];

        assert_eq!(sum_requests(&pods), ResourceTotals::new(0, GI));
    }

    #[test]
    fn sums_saturate() {
        let mut totals = ResourceTotals::new(i64::MAX - 1, 0);
        totals.add(ResourceTotals::new(10, 5));
        assert_eq!(totals, ResourceTotals::new(i64::MAX, 5));
    }

    #[test]
    fn capacity_from_node_status() {
        let n = node("n1", &[], "4", "8Gi");
        assert_eq!(node_capacity(&n), ResourceTotals::new(4000, 8 * GI));
    }

    #[test]
    fn capacity_falls_back_to_allocatable() {
        let mut n = node("n1", &[], "4", "8Gi");
        if let Some(status) = n.status.as_mut() {
            status.allocatable = status.capacity.take();
        }
        assert_eq!(node_capacity(&n), ResourceTotals::new(4000, 8 * GI));
    }

    #[test]
    fn node_without_status_has_no_capacity() {
        let mut n = node("n1", &[], "4", "8Gi");
        n.status = None;
        assert_eq!(node_capacity(&n), ResourceTotals::default());
    }
}
