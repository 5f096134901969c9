//! Attribute-based matching.

use crate::expr::{evaluate_condition, AttributeProvider, ConditionContext};
use crate::rbac::RbacMatcher;
use crate::RuleMatcher;
use std::sync::Arc;
use warden_core::{Action, Clock, ConditionalPolicyRule, Resource, Subject};

/// Matches rules structurally like RBAC, then evaluates the rule's condition
/// expression against the subject and resource.
///
/// A rule without a condition matches on the structural test alone. A
/// condition that fails to parse, references a missing attribute, or has
/// type-incompatible operands makes the rule non-matching — errors narrow
/// access, never widen it.
pub struct AbacMatcher {
    clock: Arc<dyn Clock>,
    provider: Option<Arc<dyn AttributeProvider>>,
}

impl AbacMatcher {
    /// An ABAC matcher reading `request.time` from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, provider: None }
    }

    /// Install a custom attribute source, consuming and returning the
    /// matcher.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn AttributeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }
}

impl RuleMatcher for AbacMatcher {
    fn matches(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> bool {
        if !RbacMatcher.matches(rule, subject, resource, action) {
            return false;
        }
        match rule.condition.as_deref() {
            None => true,
            Some(condition) => {
                let ctx = ConditionContext {
                    subject,
                    resource,
                    clock: self.clock.as_ref(),
                    provider: self.provider.as_deref(),
                };
                evaluate_condition(condition, &ctx)
            }
        }
    }
}
