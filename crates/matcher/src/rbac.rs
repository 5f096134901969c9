//! Role-based matching.

use crate::acl::AclMatcher;
use crate::{action_applies, resource_applies, RuleMatcher};
use warden_core::{Action, ConditionalPolicyRule, Resource, Subject};

/// Matches rules by identity or by role.
///
/// Everything the ACL strategy accepts, plus rules whose subject names a
/// role present in `subject.attributes["roles"]`. Role strings are compared
/// verbatim — `role:editor` and `Role:Editor` are different roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacMatcher;

impl RbacMatcher {
    pub(crate) fn subject_applies(rule_subject: &str, subject: &Subject) -> bool {
        AclMatcher::subject_applies(rule_subject, subject) || subject.has_role(rule_subject)
    }
}

impl RuleMatcher for RbacMatcher {
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
