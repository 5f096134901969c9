//! Side-effect-free, timed what-if evaluation.

use crate::evaluate::PolicyEvaluator;
use crate::resolve::resolve_effect;
use serde::Serialize;
use std::time::Instant;
use warden_core::{Action, ConditionalPolicyRule, Effect, Policy, Resource, Subject};

/// The full record of one simulated decision.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// The decision the real evaluator would have made.
    pub effect: Effect,
    /// The policy evaluated.
    pub policy: Policy,
    /// The simulated subject.
    pub subject: Subject,
    /// The simulated resource.
    pub resource: Resource,
    /// The simulated action.
    pub action: Action,
    /// Wall-clock evaluation time, sub-millisecond resolution.
    pub execution_time_ms: f64,
    /// The rules that matched, in policy order.
    pub matched_rules: Vec<ConditionalPolicyRule>,
}

/// Runs what-if evaluations that touch nothing.
///
/// No loader, no observer, no audit record — the only side effect is the
/// clock read ABAC conditions may perform. Safe to run concurrently;
/// repeated runs on the same inputs yield the same effect.
#[derive(Clone)]
pub struct Simulator {
    evaluator: PolicyEvaluator,
}

impl Simulator {
    /// A simulator wrapping `evaluator`.
    pub fn new(evaluator: PolicyEvaluator) -> Self {
        Self { evaluator }
    }

    /// Evaluate and time the request without committing anything.
    pub fn simulate(
        &self,
        policy: &Policy,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> SimulationResult {
        let started = Instant::now();
        let matched: Vec<ConditionalPolicyRule> = self
            .evaluator
            .matching_rules(policy, subject, resource, action)
            .into_iter()
            .cloned()
            .collect();
        let effect = resolve_effect(matched.iter());
        let execution_time_ms = started.elapsed().as_secs_f64() * 1_000.0;
        SimulationResult {
            effect,
            policy: policy.clone(),
            subject: subject.clone(),
            resource: resource.clone(),
            action: action.clone(),
            execution_time_ms,
            matched_rules: matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher::AclMatcher;
    use std::sync::Arc;
    use warden_core::PolicyRule;

    #[test]
    fn simulation_reports_matches_and_timing() {
        let sim = Simulator::new(PolicyEvaluator::new(Arc::new(AclMatcher)));
        let policy = Policy::from_rules(vec![PolicyRule::new(
            "u",
            Some("doc:1"),
            "read",
            Effect::Allow,
        )]);
        let result = sim.simulate(
            &policy,
            &Subject::new("u"),
            &Resource::from_id("doc:1"),
            &Action::new("read"),
        );
        assert_eq!(result.effect, Effect::Allow);
        assert_eq!(result.matched_rules.len(), 1);
        assert!(result.execution_time_ms >= 0.0);
    }

    #[test]
    fn repeated_runs_agree() {
        let sim = Simulator::new(PolicyEvaluator::new(Arc::new(AclMatcher)));
        let policy = Policy::from_rules(vec![
            PolicyRule::new("u", Some("doc:1"), "read", Effect::Allow),
            PolicyRule::new("u", Some("doc:1"), "read", Effect::Deny).with_priority(5),
        ]);
        let subject = Subject::new("u");
        let resource = Resource::from_id("doc:1");
        let action = Action::new("read");
        let first = sim.simulate(&policy, &subject, &resource, &action);
        for _ in 0..10 {
            assert_eq!(sim.simulate(&policy, &subject, &resource, &action).effect, first.effect);
        }
        assert_eq!(first.effect, Effect::Deny);
    }
}
