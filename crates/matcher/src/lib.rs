//! Rule match strategies.
//!
//! A matcher answers one question: does this rule apply to this
//! `(subject, resource, action)` triple? Four strategies ship:
//!
//! - [`AclMatcher`] — direct identity matches, `"*"` reserved for superusers;
//! - [`RbacMatcher`] — ACL plus role names from `subject.attributes["roles"]`;
//! - [`AbacMatcher`] — RBAC plus a string condition evaluated over attributes;
//! - [`RestfulMatcher`] — URL-pattern matching for `METHOD /path` actions,
//!   delegating everything else to a fallback matcher.
//!
//! [`IndexedMatcher`] wraps any of them with subject-keyed candidate pruning
//! and an optional short-circuit deny fast path. Indexing is an accelerator:
//! decisions are identical with and without it.

#![deny(unsafe_code)]

use std::sync::Arc;
use warden_core::{Action, Clock, ConditionalPolicyRule, EngineError, Resource, Subject};

pub mod abac;
pub mod acl;
pub mod expr;
pub mod index;
pub mod rbac;
pub mod restful;

pub use abac::AbacMatcher;
pub use acl::AclMatcher;
pub use expr::{evaluate_condition, AttributeProvider, ConditionContext, EntityRef};
pub use index::IndexedMatcher;
pub use rbac::RbacMatcher;
pub use restful::RestfulMatcher;

/// Decides whether a single rule applies to a request triple.
///
/// Implementations are side-effect-free (ABAC conditions may read the clock)
/// and safe to call concurrently.
pub trait RuleMatcher: Send + Sync {
    /// Does `rule` apply to `(subject, resource, action)`?
    fn matches(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> bool;
}

impl<M: RuleMatcher + ?Sized> RuleMatcher for Arc<M> {
    fn matches(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> bool {
        (**self).matches(rule, subject, resource, action)
    }
}

/// The configured match strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    /// Identity matching.
    Acl,
    /// Identity plus role matching.
    Rbac,
    /// Role matching plus condition expressions.
    Abac,
    /// URL-pattern matching with an ACL fallback.
    Restful,
}

impl MatcherKind {
    /// Parse a configuration name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "acl" => Ok(Self::Acl),
            "rbac" => Ok(Self::Rbac),
            "abac" => Ok(Self::Abac),
            "restful" => Ok(Self::Restful),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown matcher '{other}'; valid: acl|rbac|abac|restful"
            ))),
        }
    }

    /// Build the matcher this kind names.
    ///
    /// The clock is consumed by ABAC conditions reading `request.time`;
    /// RESTful falls back to ACL for non-HTTP actions.
    pub fn build(self, clock: Arc<dyn Clock>) -> Box<dyn RuleMatcher> {
        match self {
            Self::Acl => Box::new(AclMatcher),
            Self::Rbac => Box::new(RbacMatcher),
            Self::Abac => Box::new(AbacMatcher::new(clock)),
            Self::Restful => Box::new(RestfulMatcher::new(Box::new(AclMatcher))),
        }
    }
}

/// Resource pattern test shared by the ACL and RBAC strategies.
///
/// `None` and `"*"` match anything; `type:*` matches every resource of that
/// type; anything else must equal the resource id exactly.
pub(crate) fn resource_applies(pattern: Option<&str>, resource: &Resource) -> bool {
    match pattern {
        None | Some("*") => true,
        Some(p) => match p.strip_suffix(":*") {
            Some(kind) => resource.kind == kind,
            None => p == resource.id,
        },
    }
}

/// Action pattern test shared by the ACL and RBAC strategies.
pub(crate) fn action_applies(pattern: &str, action: &Action) -> bool {
    pattern == "*" || pattern == action.name
}
