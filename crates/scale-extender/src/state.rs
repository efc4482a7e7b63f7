//! Shared state available to all request handlers.

use std::sync::Arc;

use scale_extender_index::ReadinessGate;
use scale_extender_policy::PolicyRegistry;

use crate::config::ExtenderConfig;

/// Shared application state for the extender.
#[derive(Clone)]
pub struct ExtenderState {
    /// Policies served by the callback endpoints.
    pub registry: Arc<PolicyRegistry>,
    /// Opens once the pod index has completed its first listing.
    pub readiness: ReadinessGate,
    /// Service configuration.
    pub config: ExtenderConfig,
}

impl ExtenderState {
    /// Create a new extender state.
    #[must_use]
    pub fn new(
        registry: Arc<PolicyRegistry>,
        readiness: ReadinessGate,
        config: ExtenderConfig,
    ) -> Self {
        Self {
            registry,
            readiness,
            config,
        }
    }
}
