//! Policy rules, effects, and priorities.

use crate::entity::Domain;
use serde::{Deserialize, Serialize};

/// The outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Access granted.
    Allow,
    /// Access refused. The default in the absence of matching rules, and the
    /// winner whenever both effects apply (deny-override).
    Deny,
}

impl Effect {
    /// Whether this effect grants access.
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Rule strength. Higher values are visited first; the default is `1`.
///
/// Priority orders rule traversal for observers and short-circuiting — it
/// never lets an `Allow` outrank a matching `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority(pub u32);

impl Priority {
    /// The default rule priority.
    pub const DEFAULT: Self = Self(1);

    /// Construct a priority.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Separator for rule signatures. A unit separator cannot appear in sane
/// subject/resource/action strings, so joined signatures stay unambiguous.
const SIGNATURE_SEP: char = '\u{1f}';

fn join_signature(subject: &str, resource: Option<&str>, action: &str) -> String {
    format!(
        "{subject}{SIGNATURE_SEP}{}{SIGNATURE_SEP}{action}",
        resource.unwrap_or("*")
    )
}

/// A single declarative authorization rule.
///
/// The `subject`, `resource`, and `action` fields may hold literals,
/// wildcards (`*`), or patterns (`type:*`, `/api/x/:id`); which of those a
/// matcher honors depends on the matcher strategy. A `None` resource means
/// the rule has no resource target and applies to any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Subject pattern: literal id, `*`, or (RBAC) a role name.
    pub subject: String,
    /// Resource pattern, or `None` for no-target rules.
    pub resource: Option<String>,
    /// Action pattern: literal, `*`, or `METHOD /path`.
    pub action: String,
    /// Granted or refused.
    pub effect: Effect,
    /// Traversal strength.
    #[serde(default)]
    pub priority: Priority,
    /// Optional tenant partition.
    #[serde(default)]
    pub domain: Option<Domain>,
}

impl PolicyRule {
    /// Construct a rule with the default priority and no domain.
    pub fn new(
        subject: impl Into<String>,
        resource: Option<&str>,
        action: impl Into<String>,
        effect: Effect,
    ) -> Self {
        Self {
            subject: subject.into(),
            resource: resource.map(str::to_owned),
            action: action.into(),
            effect,
            priority: Priority::DEFAULT,
            domain: None,
        }
    }

    /// Set the priority, consuming and returning the rule.
    #[must_use]
    pub const fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Priority(priority);
        self
    }

    /// Set the domain, consuming and returning the rule.
    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Attach an ABAC condition, upgrading to a [`ConditionalPolicyRule`].
    #[must_use]
    pub fn with_condition(self, condition: impl Into<String>) -> ConditionalPolicyRule {
        ConditionalPolicyRule { condition: Some(condition.into()), ..self.into() }
    }

    /// The diff identity of this rule: `(subject, resource ?? "*", action)`.
    ///
    /// Effect, priority, and domain are deliberately not part of identity.
    pub fn signature(&self) -> String {
        join_signature(&self.subject, self.resource.as_deref(), &self.action)
    }
}

/// A [`PolicyRule`] extended with an optional ABAC condition expression.
///
/// Conditions are source strings, not closures: they stay serializable,
/// auditable, and diffable. A missing condition is vacuously true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalPolicyRule {
    /// Subject pattern.
    pub subject: String,
    /// Resource pattern, or `None` for no-target rules.
    pub resource: Option<String>,
    /// Action pattern.
    pub action: String,
    /// Granted or refused.
    pub effect: Effect,
    /// Traversal strength.
    #[serde(default)]
    pub priority: Priority,
    /// Optional tenant partition.
    #[serde(default)]
    pub domain: Option<Domain>,
    /// ABAC condition source, evaluated against subject and resource.
    #[serde(default)]
    pub condition: Option<String>,
}

impl ConditionalPolicyRule {
    /// Strip the condition, leaving the plain rule.
    pub fn to_policy_rule(&self) -> PolicyRule {
        PolicyRule {
            subject: self.subject.clone(),
            resource: self.resource.clone(),
            action: self.action.clone(),
            effect: self.effect,
            priority: self.priority,
            domain: self.domain.clone(),
        }
    }

    /// The diff identity of this rule; identical to the plain rule's.
    pub fn signature(&self) -> String {
        join_signature(&self.subject, self.resource.as_deref(), &self.action)
    }
}

impl From<PolicyRule> for ConditionalPolicyRule {
    fn from(rule: PolicyRule) -> Self {
        Self {
            subject: rule.subject,
            resource: rule.resource,
            action: rule.action,
            effect: rule.effect,
            priority: rule.priority,
            domain: rule.domain,
            condition: None,
        }
    }
}
