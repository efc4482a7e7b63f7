//! Health and readiness endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::handlers::version::VERSION;
use crate::state::ExtenderState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
///
/// Answers as long as the process serves HTTP.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: VERSION,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness handler.
///
/// Returns 503 until the pod index has applied its first full listing.
pub async fn ready(State(state): State<Arc<ExtenderState>>) -> impl IntoResponse {
    if state.readiness.is_open() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "syncing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtenderConfig;
    use scale_extender_index::{PodNodeIndex, ReadinessGate};
    use scale_extender_policy::PolicyRegistry;

    fn state(readiness: ReadinessGate) -> Arc<ExtenderState> {
        let registry = PolicyRegistry::with_defaults(Arc::new(PodNodeIndex::new()));
        Arc::new(ExtenderState::new(
            Arc::new(registry),
            readiness,
            ExtenderConfig::default(),
        ))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_follows_gate() {
        let gate = ReadinessGate::new();
        let state = state(gate.clone());

        let response = ready(State(Arc::clone(&state))).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        gate.open();
        let response = ready(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
