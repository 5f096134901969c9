//! Batch evaluation: one loader call, N in-memory decisions.

use crate::evaluate::PolicyEvaluator;
use indexmap::IndexMap;
use std::sync::Arc;
use warden_core::{Action, Effect, EngineError, Policy, PolicyLoader, Resource, Subject};

/// Collapses N authorization queries into a single policy fetch.
///
/// The loader is asked once, with the full resource list; every decision
/// after that is in-memory. Resources the loader omits are evaluated against
/// the empty policy and therefore deny.
#[derive(Clone)]
pub struct BatchPolicyEvaluator {
    evaluator: PolicyEvaluator,
    loader: Arc<dyn PolicyLoader>,
}

impl BatchPolicyEvaluator {
    /// A batch evaluator over `evaluator`, fetching policies from `loader`.
    pub fn new(evaluator: PolicyEvaluator, loader: Arc<dyn PolicyLoader>) -> Self {
        Self { evaluator, loader }
    }

    /// Decide `action` for `subject` on every resource.
    ///
    /// The result holds exactly one entry per input resource, keyed by
    /// resource id, in input order.
    pub fn evaluate_batch(
        &self,
        subject: &Subject,
        resources: &[Resource],
        action: &Action,
    ) -> Result<IndexMap<String, Effect>, EngineError> {
        let policies = self.loader.policies_for_batch(subject, resources)?;
        let empty = Policy::new();
        let mut out = IndexMap::with_capacity(resources.len());
        for resource in resources {
            let policy = policies.get(&resource.id).unwrap_or(&empty);
            let effect =
                self.evaluator.evaluate_phase("batch", policy, subject, resource, action);
            out.insert(resource.id.clone(), effect);
        }
        Ok(out)
    }
}
