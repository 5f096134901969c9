//! Delegation-aware evaluation: additive merge with direct permissions.

use crate::manager::DelegationManager;
use evaluator::PolicyEvaluator;
use std::sync::Arc;
use warden_core::{Action, Effect, EngineError, Policy, Resource, Subject};

/// Wraps the base evaluator with a delegation fallback.
///
/// The direct policy is always asked first. A direct allow is final (the
/// fast path — no delegation work happens). A direct *explicit* deny is also
/// final: a matching deny rule can never be revived by a delegation. Only a
/// default deny — silence — falls through to the subject's active
/// delegations, projected into allow rules and evaluated the same way.
pub struct DelegationAwareEvaluator {
    base: PolicyEvaluator,
    manager: Arc<DelegationManager>,
}

impl DelegationAwareEvaluator {
    /// A delegation-aware wrapper over `base`.
    pub fn new(base: PolicyEvaluator, manager: Arc<DelegationManager>) -> Self {
        Self { base, manager }
    }

    /// Decide the request, consulting delegations on a default deny.
    pub fn evaluate(
        &self,
        policy: &Policy,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> Result<Effect, EngineError> {
        let direct = self.base.evaluate(policy, subject, resource, action);
        if direct.is_allow() {
            return Ok(direct);
        }
        let matched = self.base.matching_rules(policy, subject, resource, action);
        if matched.iter().any(|rule| rule.effect == Effect::Deny) {
            // Explicit deny: delegations contribute only allows and never
            // override it.
            return Ok(Effect::Deny);
        }
        let delegated_rules = self.manager.to_policy_rules(subject)?;
        if delegated_rules.is_empty() {
            return Ok(direct);
        }
        let delegated_policy: Policy = delegated_rules.into_iter().collect();
        let delegated = self.base.evaluate(&delegated_policy, subject, resource, action);
        Ok(if delegated.is_allow() { Effect::Allow } else { direct })
    }
}
