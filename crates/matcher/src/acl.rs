//! Identity (access-control-list) matching.

use crate::{action_applies, resource_applies, RuleMatcher};
use warden_core::{Action, ConditionalPolicyRule, Resource, Subject};

/// Matches rules by direct subject identity.
///
/// A rule subject of `"*"` is not universal here: it applies only to
/// subjects carrying `superuser: true`. Plain subjects need a rule naming
/// their exact id.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclMatcher;

impl AclMatcher {
    pub(crate) fn subject_applies(rule_subject: &str, subject: &Subject) -> bool {
        if rule_subject == "*" {
            return subject.is_superuser();
        }
        rule_subject == subject.id
    }
}

impl RuleMatcher for AclMatcher {
    fn matches(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> bool {
        Self::subject_applies(&rule.subject, subject)
            && resource_applies(rule.resource.as_deref(), resource)
            && action_applies(&rule.action, action)
    }
}
