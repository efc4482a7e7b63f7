//! Node-keyed index of active pods.
//!
//! The index is a cache of the cluster's pod collection, grouped by the node
//! each pod is assigned to. It is written by a single watch consumer and read
//! concurrently by the extender callbacks. Every mutation happens under one
//! write guard, so readers see each event either fully applied or not at all.

use std::collections::HashMap;
use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use parking_lot::RwLock;
use scale_extender_core::PodKey;

use crate::error::{IndexError, Result};
use crate::gate::ReadinessGate;
use crate::types::{assigned_node, is_active};

/// Read access to the pods on a node.
///
/// This is the seam the scheduling policies read through; tests substitute
/// their own implementations.
pub trait PodLookup: Send + Sync {
    /// Return a snapshot of the active pods on `node_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pods for the node cannot be produced.
    fn node_pods(&self, node_name: &str) -> Result<Vec<Arc<Pod>>>;
}

/// What an [`PodNodeIndex::upsert`] did to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexChange {
    /// The pod was added to, or refreshed on, a node.
    Placed {
        /// The node now holding the pod.
        node: String,
    },
    /// The pod moved between nodes.
    Moved {
        /// The node that held the pod before.
        from: String,
        /// The node now holding the pod.
        to: String,
    },
    /// The pod became inactive and was dropped.
    Removed {
        /// The node that held the pod.
        from: String,
    },
    /// The pod is inactive and was not indexed to begin with.
    Ignored,
}

#[derive(Debug, Default)]
struct IndexState {
    by_node: HashMap<String, HashMap<PodKey, Arc<Pod>>>,
    placement: HashMap<PodKey, String>,
}

impl IndexState {
    fn remove(&mut self, key: &PodKey) -> Option<String> {
        let node = self.placement.remove(key)?;
        if let Some(pods) = self.by_node.get_mut(&node) {
            pods.remove(key);
            if pods.is_empty() {
                self.by_node.remove(&node);
            }
        }
        Some(node)
    }

    fn insert(&mut self, key: PodKey, node: String, pod: Arc<Pod>) -> Option<String> {
        let previous = self.remove(&key);
        self.by_node
            .entry(node.clone())
            .or_default()
            .insert(key.clone(), pod);
        self.placement.insert(key, node);
        previous
    }
}

/// Concurrent mapping from node name to the active pods on that node.
///
/// Invariants:
/// - every indexed pod is active (assigned and not `Succeeded`/`Failed`);
/// - a pod is held under exactly one node, its current assigned node.
#[derive(Debug, Default)]
pub struct PodNodeIndex {
    state: RwLock<IndexState>,
    synced: ReadinessGate,
}

impl PodNodeIndex {
    /// Create an empty, unsynced index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an add or update of `pod`.
    ///
    /// Active pods are placed under their assigned node, replacing any entry
    /// with the same identity on any node. Inactive pods are removed.
    pub fn upsert(&self, pod: Pod) -> IndexChange {
        let key = PodKey::from_pod(&pod);
        let target = index_target(&pod);

        let mut state = self.state.write();
        match target {
            Some(node) => match state.insert(key, node.clone(), Arc::new(pod)) {
                Some(from) if from != node => IndexChange::Moved { from, to: node },
                _ => IndexChange::Placed { node },
            },
            None => match state.remove(&key) {
                Some(from) => IndexChange::Removed { from },
                None => IndexChange::Ignored,
            },
        }
    }

    /// Remove `pod` unconditionally.
    ///
    /// Returns the node that held it, if it was indexed.
    pub fn delete(&self, pod: &Pod) -> Option<String> {
        self.remove(&PodKey::from_pod(pod))
    }

    /// Remove the pod with `key`, returning the node that held it.
    pub fn remove(&self, key: &PodKey) -> Option<String> {
        self.state.write().remove(key)
    }

    /// Replace the whole index with a fresh listing and mark it synced.
    ///
    /// Readers observe either the previous contents or the new ones. Returns
    /// the number of pods indexed from the listing.
    pub fn replace_all<I>(&self, pods: I) -> usize
    where
        I: IntoIterator<Item = Pod>,
    {
        let mut fresh = IndexState::default();
        for pod in pods {
            if let Some(node) = index_target(&pod) {
                fresh.insert(PodKey::from_pod(&pod), node, Arc::new(pod));
            }
        }
        let count = fresh.placement.len();

        *self.state.write() = fresh;
        self.synced.open();
        count
    }

    /// Snapshot of the active pods on `node_name`, ordered by pod key.
    ///
    /// The returned vector is detached from the index; later events do not
    /// affect it.
    #[must_use]
    pub fn pods_on_node(&self, node_name: &str) -> Vec<Arc<Pod>> {
        let state = self.state.read();
        let Some(pods) = state.by_node.get(node_name) else {
            return Vec::new();
        };

        let mut entries: Vec<_> = pods.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, pod)| Arc::clone(pod)).collect()
    }

    /// Whether the pod with `key` is indexed.
    #[must_use]
    pub fn contains(&self, key: &PodKey) -> bool {
        self.state.read().placement.contains_key(key)
    }

    /// Number of indexed pods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().placement.len()
    }

    /// Whether the index holds no pods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().placement.is_empty()
    }

    /// Number of nodes with at least one indexed pod.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.read().by_node.len()
    }

    /// Mark the initial listing as applied.
    pub fn mark_synced(&self) {
        self.synced.open();
    }

    /// Whether the initial listing has been applied.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced.is_open()
    }

    /// Wait until the initial listing has been applied.
    pub async fn await_initial_sync(&self) {
        self.synced.wait().await;
    }

    /// A handle on the sync signal, for readiness probes.
    #[must_use]
    pub fn readiness(&self) -> ReadinessGate {
        self.synced.clone()
    }
}

/// The node an active pod should be indexed under.
fn index_target(pod: &Pod) -> Option<String> {
    if is_active(pod) {
        assigned_node(pod).map(ToString::to_string)
    } else {
        None
    }
}

impl PodLookup for PodNodeIndex {
    fn node_pods(&self, node_name: &str) -> Result<Vec<Arc<Pod>>> {
        if !self.is_synced() {
            return Err(IndexError::NotSynced);
        }
        Ok(self.pods_on_node(node_name))
    }
}
