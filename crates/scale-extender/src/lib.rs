//! HTTP front end of the scale-extender scheduler extension.
//!
//! The kube-scheduler calls this service at three decision points. Each
//! callback is decoded, routed by name to a policy in the
//! [`PolicyRegistry`](scale_extender_policy::PolicyRegistry), and the answer
//! is encoded back into the extender envelope:
//!
//! - `POST /scheduler/predicates/:name` filters candidate nodes
//! - `POST /scheduler/priorities/:name` scores candidate nodes
//! - `POST /scheduler/bind` declines to bind
//!
//! Policy failures travel inside the envelope with status 200, the way the
//! scheduler expects them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      kube-scheduler                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ extender callbacks (JSON)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      scale-extender                          │
//! │   Router + Handlers ──▶ PolicyRegistry ──▶ PodNodeIndex      │
//! └─────────────────────────────────────────────────────────────┘
//!                                                  ▲
//!                                                  │ list + watch pods
//!                                        Kubernetes API server
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scale_extender::{create_router, ExtenderConfig, ExtenderState};
//! use scale_extender_index::{IndexConfig, PodNodeIndex, PodWatcher};
//! use scale_extender_policy::PolicyRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = Arc::new(PodNodeIndex::new());
//! let watcher = PodWatcher::try_default(IndexConfig::default(), Arc::clone(&index)).await?;
//! tokio::spawn(async move { watcher.run().await });
//! index.await_initial_sync().await;
//!
//! let registry = Arc::new(PolicyRegistry::with_defaults(index.clone()));
//! let state = ExtenderState::new(registry, index.readiness(), ExtenderConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, create_router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod state;

pub use config::ExtenderConfig;
pub use error::ApiError;
pub use handlers::version::VERSION;
pub use logging::{init_tracing, LogLevel};
pub use routes::create_router;
pub use state::ExtenderState;
