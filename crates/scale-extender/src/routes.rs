//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{extender, health, version};
use crate::state::ExtenderState;

/// Prefix shared by every scheduler callback.
pub const API_PREFIX: &str = "/scheduler";

/// Create the extender router with all routes and middleware.
///
/// # Routes
///
/// ## Service
/// - `GET /version` - Version as plain text
/// - `GET /health` - Health check
/// - `GET /ready` - Readiness, open once the pod index has synced
///
/// ## Scheduler callbacks
/// - `POST /scheduler/predicates/:name` - Filter nodes
/// - `POST /scheduler/priorities/:name` - Score nodes
/// - `POST /scheduler/bind` - Bind (always declined)
/// - `POST /scheduler/preemption` - Reserved, answers 501
pub fn create_router(state: ExtenderState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let state = Arc::new(state);

    Router::new()
        .route("/version", get(version::version))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            &format!("{API_PREFIX}/predicates/:name"),
            post(extender::filter),
        )
        .route(
            &format!("{API_PREFIX}/priorities/:name"),
            post(extender::prioritize),
        )
        .route(&format!("{API_PREFIX}/bind"), post(extender::bind))
        .route(
            &format!("{API_PREFIX}/preemption"),
            post(extender::preemption),
        )
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        // The limit above replaces axum's 2 MB extractor default.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtenderConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use scale_extender_index::PodNodeIndex;
    use scale_extender_policy::PolicyRegistry;
    use tower::ServiceExt;

    fn router(max_body_bytes: usize) -> Router {
        let index = Arc::new(PodNodeIndex::new());
        index.mark_synced();
        let registry = PolicyRegistry::with_defaults(index.clone());
        create_router(ExtenderState::new(
            Arc::new(registry),
            index.readiness(),
            ExtenderConfig {
                max_body_bytes,
                ..ExtenderConfig::default()
            },
        ))
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = router(1024)
            .oneshot(Request::get("/scheduler").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn callbacks_reject_get() {
        let response = router(1024)
            .oneshot(
                Request::get("/scheduler/predicates/always_true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let body = format!(r#"{{"PodName": "{}"}}"#, "x".repeat(256));
        let response = router(64)
            .oneshot(
                Request::post("/scheduler/bind")
                    .header("content-type", "application/json")
                    .header("content-length", body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
