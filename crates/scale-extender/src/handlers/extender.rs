//! Scheduler extender callbacks.
//!
//! Every callback decodes an extender envelope, hands it to the policy
//! registry and encodes the answer. Policy failures are embedded in the
//! response envelope with status 200; only a body that does not decode is
//! rejected outright (by the `Json` extractor, with 400).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use scale_extender_core::{
    ExtenderArgs, ExtenderBindingArgs, ExtenderBindingResult, ExtenderFilterResult,
    HostPriorityList,
};

use crate::error::ApiError;
use crate::state::ExtenderState;

/// Filter candidate nodes with the named predicate.
///
/// POST /scheduler/predicates/:name
pub async fn filter(
    State(state): State<Arc<ExtenderState>>,
    Path(name): Path<String>,
    Json(args): Json<ExtenderArgs>,
) -> Json<ExtenderFilterResult> {
    let result = state.registry.filter(&name, &args);

    if result.error.is_empty() {
        tracing::debug!(
            predicate = %name,
            passed = result.passed_node_names().len(),
            "Answered filter callback"
        );
    } else {
        tracing::warn!(predicate = %name, error = %result.error, "Filter callback failed");
    }

    Json(result)
}

/// Score candidate nodes with the named priority.
///
/// POST /scheduler/priorities/:name
///
/// The priority envelope has no error slot, so an unknown priority is a 404
/// and a request without a pod is a 400.
pub async fn prioritize(
    State(state): State<Arc<ExtenderState>>,
    Path(name): Path<String>,
    Json(args): Json<ExtenderArgs>,
) -> Result<Json<HostPriorityList>, ApiError> {
    let priorities = state.registry.prioritize(&name, &args).map_err(|e| {
        tracing::warn!(priority = %name, error = %e, "Prioritize callback failed");
        ApiError::from(e)
    })?;

    tracing::debug!(
        priority = %name,
        nodes = priorities.len(),
        "Answered prioritize callback"
    );
    Ok(Json(priorities))
}

/// Answer a bind callback. Binding is always declined.
///
/// POST /scheduler/bind
pub async fn bind(
    State(state): State<Arc<ExtenderState>>,
    Json(args): Json<ExtenderBindingArgs>,
) -> Json<ExtenderBindingResult> {
    Json(state.registry.bind(&args))
}

/// Reserved preemption callback.
///
/// POST /scheduler/preemption
pub async fn preemption() -> ApiError {
    ApiError::NotImplemented("preemption is not served by this extender".to_string())
}
