//! Watch-fed pod-to-node index for the scale-extender scheduler extension.
//!
//! This crate keeps a local, continuously updated view of which active pods
//! run on which node, so that scheduler callbacks can be answered without
//! calling the Kubernetes API. It handles:
//!
//! - The [`PodNodeIndex`] itself, safe for one writer and many readers
//! - Feeding the index from a pod watch with periodic full resync
//! - A one-shot [`ReadinessGate`] that opens once the first listing is applied
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Kubernetes API Server                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │ list + watch pods
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PodWatcher                                │
//! │   decode ──▶ IndexFeeder ──▶ upsert / remove / replace_all      │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       PodNodeIndex                               │
//! │          node name ──▶ { active pods on that node }              │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │ PodLookup::node_pods
//!                              ▼
//!                     predicate / priority callbacks
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scale_extender_index::{IndexConfig, PodNodeIndex, PodWatcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = Arc::new(PodNodeIndex::new());
//! let watcher = PodWatcher::try_default(IndexConfig::from_env(), Arc::clone(&index)).await?;
//!
//! tokio::spawn(async move { watcher.run().await });
//! index.await_initial_sync().await;
//!
//! let pods = index.pods_on_node("worker-1");
//! println!("{} pods on worker-1", pods.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod gate;
pub mod index;
pub mod types;
pub mod watch;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{IndexError, Result};
pub use gate::ReadinessGate;
pub use index::{IndexChange, PodLookup, PodNodeIndex};
pub use types::{assigned_node, is_active, IndexConfig, PodPhase};
pub use watch::{decode_pod, feed_index, IndexFeeder, PodWatcher};
