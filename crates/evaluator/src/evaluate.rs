//! The single-decision orchestrator.

use crate::observe::{self, Decision};
use crate::resolve::{by_priority_desc, resolve_effect};
use matcher::RuleMatcher;
use std::sync::Arc;
use warden_core::{Action, ConditionalPolicyRule, Effect, Policy, Resource, Subject};

/// Walks a policy's rules through a matcher and resolves the matches under
/// deny-override.
///
/// Cheap to clone (the matcher is shared); safe to use from multiple threads
/// concurrently, including on the same policy.
#[derive(Clone)]
pub struct PolicyEvaluator {
    matcher: Arc<dyn RuleMatcher>,
}

impl PolicyEvaluator {
    /// An evaluator over `matcher`.
    pub fn new(matcher: Arc<dyn RuleMatcher>) -> Self {
        Self { matcher }
    }

    /// The rules of `policy` that apply to the request, in policy order.
    pub fn matching_rules<'p>(
        &self,
        policy: &'p Policy,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> Vec<&'p ConditionalPolicyRule> {
        policy
            .rules()
            .iter()
            .filter(|rule| self.matcher.matches(rule, subject, resource, action))
            .collect()
    }

    /// Decide the request and report it to the in-process observers.
    pub fn evaluate(
        &self,
        policy: &Policy,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> Effect {
        self.evaluate_phase("evaluate", policy, subject, resource, action)
    }

    pub(crate) fn evaluate_phase(
        &self,
        phase: &str,
        policy: &Policy,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> Effect {
        let matched = self.matching_rules(policy, subject, resource, action);
        let effect = resolve_effect(matched.iter().copied());
        let decision =
            Decision { effect, matched: matched.len(), deciding_rule: deciding_rule(&matched) };
        observe::notify(phase, &decision);
        effect
    }

}

/// The rule that settled the outcome: first deny in priority order, else
/// first allow.
fn deciding_rule(matched: &[&ConditionalPolicyRule]) -> Option<String> {
    let ordered = by_priority_desc(matched);
    ordered
        .iter()
        .find(|rule| rule.effect == Effect::Deny)
        .or_else(|| ordered.first())
        .map(|rule| rule.signature())
}
