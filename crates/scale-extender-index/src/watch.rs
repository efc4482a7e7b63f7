//! Feeding the index from a Kubernetes pod watch.
//!
//! [`PodWatcher`] runs a cluster-wide pod watcher and hands its events to
//! [`feed_index`]. The watch is restarted every resync interval, which makes
//! the watcher relist every pod; the listing replaces the index wholesale so
//! that any missed delete is corrected.

use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ApiResource, DynamicObject};
use kube::runtime::watcher::{self, watcher, Config as WatcherConfig};
use kube::runtime::WatchStreamExt;
use kube::Client;
use scale_extender_core::PodKey;
use tracing::{debug, error, info, warn};

use crate::error::{IndexError, Result};
use crate::index::{IndexChange, PodNodeIndex};
use crate::types::IndexConfig;

/// Decode a watched object as a pod.
///
/// # Errors
///
/// Returns [`IndexError::Decode`] if the object does not have the shape of a
/// pod.
pub fn decode_pod(object: DynamicObject) -> Result<Pod> {
    let name = object_key(&object).to_string();
    serde_json::to_value(object)
        .and_then(serde_json::from_value)
        .map_err(|source| IndexError::Decode {
            object: name,
            source,
        })
}

fn object_key(object: &DynamicObject) -> PodKey {
    PodKey::new(
        object.metadata.namespace.clone().unwrap_or_default(),
        object.metadata.name.clone().unwrap_or_default(),
    )
}

/// Applies watcher events to an index.
///
/// Objects delivered between `Init` and `InitDone` are buffered and committed
/// together with [`PodNodeIndex::replace_all`]; all other events are applied
/// one at a time.
#[derive(Debug, Default)]
pub struct IndexFeeder {
    relist: Option<Vec<Pod>>,
}

impl IndexFeeder {
    /// Create a feeder with no listing in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one watcher event to `index`.
    pub fn apply(&mut self, index: &PodNodeIndex, event: watcher::Event<DynamicObject>) {
        match event {
            watcher::Event::Init => {
                debug!("Pod listing started");
                self.relist = Some(Vec::new());
            }
            watcher::Event::InitApply(object) => {
                if let Some(pod) = decode_or_skip(object) {
                    self.relist.get_or_insert_with(Vec::new).push(pod);
                }
            }
            watcher::Event::InitDone => {
                let pods = self.relist.take().unwrap_or_default();
                let listed = pods.len();
                let indexed = index.replace_all(pods);
                info!(
                    listed,
                    indexed,
                    nodes = index.node_count(),
                    "Pod listing applied to index"
                );
            }
            watcher::Event::Apply(object) => {
                let Some(pod) = decode_or_skip(object) else {
                    return;
                };
                let key = PodKey::from_pod(&pod);
                match index.upsert(pod) {
                    IndexChange::Placed { node } => debug!(pod = %key, node = %node, "Pod indexed"),
                    IndexChange::Moved { from, to } => {
                        debug!(pod = %key, from = %from, to = %to, "Pod moved between nodes");
                    }
                    IndexChange::Removed { from } => {
                        debug!(pod = %key, node = %from, "Inactive pod removed from index");
                    }
                    IndexChange::Ignored => {}
                }
            }
            watcher::Event::Delete(object) => {
                // Only the identity is needed, so deletes never depend on decoding.
                let key = object_key(&object);
                if let Some(node) = index.remove(&key) {
                    debug!(pod = %key, node = %node, "Deleted pod removed from index");
                }
            }
        }
    }
}

fn decode_or_skip(object: DynamicObject) -> Option<Pod> {
    match decode_pod(object) {
        Ok(pod) => Some(pod),
        Err(e) => {
            warn!(error = %e, "Skipping watch event that is not a pod");
            None
        }
    }
}

/// Drain a stream of watcher events into `index`.
///
/// Stream errors are logged and skipped; the kube watcher reconnects on its
/// own. Returns when the stream ends.
pub async fn feed_index<S, E>(index: &PodNodeIndex, events: S)
where
    S: Stream<Item = std::result::Result<watcher::Event<DynamicObject>, E>>,
    E: fmt::Display,
{
    futures::pin_mut!(events);
    let mut feeder = IndexFeeder::new();

    while let Some(event) = events.next().await {
        match event {
            Ok(event) => feeder.apply(index, event),
            Err(e) => error!(error = %e, "Pod watch error, will retry"),
        }
    }
}

/// Keeps a [`PodNodeIndex`] in step with the cluster's pods.
pub struct PodWatcher {
    client: Client,
    config: IndexConfig,
    index: Arc<PodNodeIndex>,
}

impl PodWatcher {
    /// Create a watcher using in-cluster config or the local kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes client cannot be created.
    pub async fn try_default(config: IndexConfig, index: Arc<PodNodeIndex>) -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::with_client(client, config, index))
    }

    /// Create a watcher with a pre-configured client.
    #[must_use]
    pub fn with_client(client: Client, config: IndexConfig, index: Arc<PodNodeIndex>) -> Self {
        Self {
            client,
            config,
            index,
        }
    }

    /// Get the pods API, as dynamic objects so that decoding stays ours.
    fn pods_api(&self) -> Api<DynamicObject> {
        let resource = ApiResource::erase::<Pod>(&());
        match &self.config.namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }

    fn watcher_config(&self) -> WatcherConfig {
        let mut config = WatcherConfig::default();
        if let Some(fields) = &self.config.field_selector {
            config = config.fields(fields);
        }
        if let Some(labels) = &self.config.label_selector {
            config = config.labels(labels);
        }
        config
    }

    /// Run the watch for the lifetime of the process.
    ///
    /// This method never returns. It should be spawned as a background task.
    pub async fn run(&self) {
        let resync = self.config.resync_interval();
        info!(
            namespace = self.config.namespace.as_deref().unwrap_or("<all>"),
            resync_secs = resync.as_secs(),
            "Starting pod watch"
        );

        loop {
            let events = watcher(self.pods_api(), self.watcher_config())
                .default_backoff()
                .take_until(tokio::time::sleep(resync));

            feed_index(&self.index, events).await;

            info!(
                pods = self.index.len(),
                "Resync interval elapsed, relisting pods"
            );
        }
    }
}
