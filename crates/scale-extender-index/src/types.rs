//! Types for the index crate.

use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;

/// Default interval between full relists of the pod collection.
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Phase of the pod lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PodPhase {
    /// Pod has been accepted but containers are not yet running.
    Pending,
    /// Pod is running with at least one container.
    Running,
    /// All containers terminated successfully.
    Succeeded,
    /// At least one container failed.
    Failed,
    /// Pod status cannot be determined.
    #[default]
    Unknown,
}

impl PodPhase {
    /// Parse a pod phase from a Kubernetes phase string.
    #[must_use]
    pub fn from_k8s_phase(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Read the phase of a pod; a pod without status is `Unknown`.
    #[must_use]
    pub fn of(pod: &Pod) -> Self {
        pod.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map_or(Self::Unknown, Self::from_k8s_phase)
    }

    /// Check if the pod is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// The node a pod is assigned to, if any.
#[must_use]
pub fn assigned_node(pod: &Pod) -> Option<&str> {
    pod.spec
        .as_ref()
        .and_then(|s| s.node_name.as_deref())
        .filter(|name| !name.is_empty())
}

/// Whether a pod belongs in the index.
///
/// A pod is active when it has been assigned to a node and has not reached
/// a terminal phase. `Unknown` pods still hold their node's resources.
#[must_use]
pub fn is_active(pod: &Pod) -> bool {
    assigned_node(pod).is_some() && !PodPhase::of(pod).is_terminal()
}

/// Configuration for the pod watch that feeds the index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Namespace to watch; `None` watches all namespaces.
    pub namespace: Option<String>,
    /// Field selector applied to the pod watch.
    pub field_selector: Option<String>,
    /// Label selector applied to the pod watch.
    pub label_selector: Option<String>,
    /// Seconds between forced full relists.
    pub resync_interval_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            field_selector: None,
            label_selector: None,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL.as_secs(),
        }
    }
}

impl IndexConfig {
    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - `WATCH_NAMESPACE`: Namespace to watch (default: all namespaces)
    /// - `WATCH_FIELD_SELECTOR`: Field selector for the pod watch
    /// - `WATCH_LABEL_SELECTOR`: Label selector for the pod watch
    /// - `RESYNC_INTERVAL_SECS`: Seconds between full relists (default: 86400)
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            namespace: non_empty_var("WATCH_NAMESPACE"),
            field_selector: non_empty_var("WATCH_FIELD_SELECTOR"),
            label_selector: non_empty_var("WATCH_LABEL_SELECTOR"),
            ..Self::default()
        };

        if let Some(val) = non_empty_var("RESYNC_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => config.resync_interval_secs = n,
                _ => tracing::warn!(
                    value = %val,
                    "Ignoring invalid RESYNC_INTERVAL_SECS, keeping default"
                ),
            }
        }

        config
    }

    /// The resync interval as a `Duration`.
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
