//! Error types for the index crate.

use thiserror::Error;

/// Errors that can occur while feeding or reading the pod-node index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Kubernetes API error.
    #[error("Kubernetes API error: {0}")]
    KubeApi(#[from] kube::Error),

    /// A watched object could not be interpreted as a pod.
    #[error("cannot decode {object} as a pod: {source}")]
    Decode {
        /// Name of the offending object, as far as it could be read.
        object: String,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The index was read before the initial pod listing was applied.
    #[error("pod index has not completed its initial sync")]
    NotSynced,
}

/// A specialized Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
