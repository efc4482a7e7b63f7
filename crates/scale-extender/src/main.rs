//! Scale Extender - Kubernetes scheduler extender
//!
//! This is the main entry point for the extender service. It watches pods
//! into a local index, waits for the first full listing, and then serves the
//! scheduler's extender callbacks.
//!
//! # Configuration
//!
//! - `LISTEN_ADDR` - Listen address (default: `0.0.0.0:80`)
//! - `MAX_BODY_BYTES` - Request body limit
//! - `LOG_LEVEL` - `TRACE`, `DEBUG`, `INFO`, `WARNING`, `ERROR` or `ALERT`
//! - `RUST_LOG` - Full filter directives, overrides `LOG_LEVEL`
//! - `WATCH_NAMESPACE`, `WATCH_FIELD_SELECTOR`, `WATCH_LABEL_SELECTOR`,
//!   `RESYNC_INTERVAL_SECS` - Pod watch settings

use std::sync::Arc;

use scale_extender::{
    create_router, init_tracing, ExtenderConfig, ExtenderState, LogLevel, VERSION,
};
use scale_extender_index::{IndexConfig, PodNodeIndex, PodWatcher};
use scale_extender_policy::PolicyRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========================================================================
    // Configuration & Tracing
    // ========================================================================

    let config = ExtenderConfig::from_env();
    let parsed_level = config.log_level.parse::<LogLevel>();
    let log_level = parsed_level.as_ref().copied().unwrap_or_default();
    init_tracing(log_level);

    if let Err(e) = &parsed_level {
        tracing::warn!(error = %e, "Falling back to INFO");
    }

    tracing::info!(
        version = VERSION,
        log_level = %log_level,
        listen_addr = %config.listen_addr,
        max_body_bytes = config.max_body_bytes,
        "Starting Scale Extender"
    );

    // ========================================================================
    // Pod Index
    // ========================================================================

    let index_config = IndexConfig::from_env();
    let index = Arc::new(PodNodeIndex::new());

    let watcher = PodWatcher::try_default(index_config, Arc::clone(&index))
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to create Kubernetes client"))?;
    tracing::info!("Kubernetes client initialized");

    tokio::spawn(async move { watcher.run().await });

    tracing::info!("Waiting for initial pod sync");
    index.await_initial_sync().await;
    tracing::info!(
        pods = index.len(),
        nodes = index.node_count(),
        "Initial pod sync complete"
    );

    // ========================================================================
    // HTTP Server
    // ========================================================================

    let registry = PolicyRegistry::with_defaults(index.clone());
    tracing::info!(
        predicates = ?registry.predicate_names(),
        priorities = ?registry.priority_names(),
        "Policies registered"
    );

    let listen_addr = config.listen_addr.clone();
    let state = ExtenderState::new(Arc::new(registry), index.readiness(), config);
    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
