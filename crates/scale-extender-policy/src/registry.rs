//! Name-keyed policy registry used by the callback handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use scale_extender_core::protocol::node_name;
use scale_extender_core::{
    ExtenderArgs, ExtenderBindingArgs, ExtenderBindingResult, ExtenderFilterResult,
    HostPriorityList, NodeList,
};
use scale_extender_index::PodLookup;
use tracing::{debug, warn};

use crate::bind::BindPolicy;
use crate::error::{PolicyError, Result};
use crate::predicate::PredicatePolicy;
use crate::priority::PriorityPolicy;

/// Policies available to the extender, looked up by the name in the callback
/// path.
///
/// Built once at startup and shared read-only between request handlers.
pub struct PolicyRegistry {
    lookup: Arc<dyn PodLookup>,
    predicates: HashMap<String, PredicatePolicy>,
    priorities: HashMap<String, PriorityPolicy>,
    bind: BindPolicy,
}

impl PolicyRegistry {
    /// Create an empty registry reading pods through `lookup`.
    #[must_use]
    pub fn new(lookup: Arc<dyn PodLookup>) -> Self {
        Self {
            lookup,
            predicates: HashMap::new(),
            priorities: HashMap::new(),
            bind: BindPolicy::default(),
        }
    }

    /// Create a registry with every built-in policy registered.
    #[must_use]
    pub fn with_defaults(lookup: Arc<dyn PodLookup>) -> Self {
        let mut registry = Self::new(lookup);
        for predicate in PredicatePolicy::ALL {
            registry.register_predicate(predicate);
        }
        for priority in PriorityPolicy::ALL {
            registry.register_priority(priority);
        }
        registry
    }

    /// Serve `predicate` under its name.
    pub fn register_predicate(&mut self, predicate: PredicatePolicy) {
        self.predicates.insert(predicate.name().to_string(), predicate);
    }

    /// Serve `priority` under its name.
    pub fn register_priority(&mut self, priority: PriorityPolicy) {
        self.priorities.insert(priority.name().to_string(), priority);
    }

    /// Registered predicate names, sorted.
    #[must_use]
    pub fn predicate_names(&self) -> Vec<&str> {
        sorted_keys(&self.predicates)
    }

    /// Registered priority names, sorted.
    #[must_use]
    pub fn priority_names(&self) -> Vec<&str> {
        sorted_keys(&self.priorities)
    }

    /// Run the named predicate over every candidate node.
    ///
    /// Failures are reported inside the result, never as an error: an
    /// unknown predicate or a missing pod fills `Error`, and a node that is
    /// rejected or cannot be evaluated lands in `FailedNodes`. The passed
    /// nodes come back in the form the request used.
    #[must_use]
    pub fn filter(&self, name: &str, args: &ExtenderArgs) -> ExtenderFilterResult {
        let Some(predicate) = self.predicates.get(name).copied() else {
            warn!(predicate = name, "Unknown predicate requested");
            return ExtenderFilterResult::from_error(PolicyError::UnknownPredicate(
                name.to_string(),
            ));
        };
        let Some(pod) = args.pod.as_ref() else {
            return ExtenderFilterResult::from_error(PolicyError::MissingPod);
        };

        let mut passed = Vec::new();
        let mut failed_nodes = BTreeMap::new();

        for node in args.candidate_nodes() {
            match predicate.evaluate(self.lookup.as_ref(), pod, &node) {
                Ok(true) => passed.push(node),
                Ok(false) => {
                    failed_nodes.insert(
                        node_name(&node).to_string(),
                        format!("node rejected by predicate {}", predicate.name()),
                    );
                }
                Err(e) => {
                    warn!(
                        predicate = name,
                        node = node_name(&node),
                        error = %e,
                        "Predicate failed"
                    );
                    failed_nodes.insert(node_name(&node).to_string(), e.to_string());
                }
            }
        }

        debug!(
            predicate = name,
            passed = passed.len(),
            failed = failed_nodes.len(),
            "Filtered nodes"
        );

        let mut result = ExtenderFilterResult {
            failed_nodes,
            ..ExtenderFilterResult::default()
        };
        if args.names_only() {
            result.node_names = Some(passed.iter().map(|n| node_name(n).to_string()).collect());
        } else {
            result.nodes = Some(NodeList::new(passed));
        }
        result
    }

    /// Run the named priority over every candidate node.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownPriority`] for an unregistered name and
    /// [`PolicyError::MissingPod`] when the request carries no pod.
    pub fn prioritize(&self, name: &str, args: &ExtenderArgs) -> Result<HostPriorityList> {
        let priority = self
            .priorities
            .get(name)
            .copied()
            .ok_or_else(|| PolicyError::UnknownPriority(name.to_string()))?;
        let pod = args.pod.as_ref().ok_or(PolicyError::MissingPod)?;

        priority.prioritize(self.lookup.as_ref(), pod, &args.candidate_nodes())
    }

    /// Answer a bind callback.
    #[must_use]
    pub fn bind(&self, args: &ExtenderBindingArgs) -> ExtenderBindingResult {
        match self.bind.bind(args) {
            Ok(()) => ExtenderBindingResult::default(),
            Err(e) => ExtenderBindingResult {
                error: e.to_string(),
            },
        }
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
