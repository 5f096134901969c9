//! Policies: ordered rule sequences with optional named inheritance.

use crate::rule::{ConditionalPolicyRule, PolicyRule};
use serde::{Deserialize, Serialize};

/// An ordered sequence of rules, optionally named, optionally extending a
/// base policy by name.
///
/// Policies are immutable: [`Policy::add_rule`] and friends return a new
/// policy rather than mutating the receiver. Rule order is the declaration
/// order and is preserved by every transformation except
/// [`Policy::sorted_by_priority`], which reorders stably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Optional policy name, referenced by `extends` on derived policies.
    #[serde(default)]
    pub name: Option<String>,
    /// Name of a base policy whose rules this policy inherits.
    #[serde(default)]
    pub extends: Option<String>,
    rules: Vec<ConditionalPolicyRule>,
}

impl Policy {
    /// An empty, unnamed policy. Evaluating it denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty policy with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    /// Build a policy from rules, keeping their order.
    pub fn from_rules<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ConditionalPolicyRule>,
    {
        Self { rules: rules.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Declare the base policy this one extends, consuming and returning it.
    #[must_use]
    pub fn with_extends(mut self, base: impl Into<String>) -> Self {
        self.extends = Some(base.into());
        self
    }

    /// Return a new policy with `rule` appended.
    #[must_use]
    pub fn add_rule(&self, rule: impl Into<ConditionalPolicyRule>) -> Self {
        let mut next = self.clone();
        next.rules.push(rule.into());
        next
    }

    /// The rules, in declaration order.
    pub fn rules(&self) -> &[ConditionalPolicyRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the policy has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Return a new policy with rules ordered by descending priority.
    ///
    /// The sort is stable: rules of equal priority keep declaration order.
    #[must_use]
    pub fn sorted_by_priority(&self) -> Self {
        let mut next = self.clone();
        next.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        next
    }

    /// Named inheritance: a new policy holding `base`'s rules followed by
    /// this policy's own, preserving this policy's `name` and `extends`.
    ///
    /// Multi-level chains are resolved by the caller walking `extends`
    /// bottom-up and folding with this method.
    #[must_use]
    pub fn inherit_from(&self, base: &Self) -> Self {
        let mut rules = base.rules.clone();
        rules.extend(self.rules.iter().cloned());
        Self { name: self.name.clone(), extends: self.extends.clone(), rules }
    }
}

impl FromIterator<PolicyRule> for Policy {
    fn from_iter<I: IntoIterator<Item = PolicyRule>>(iter: I) -> Self {
        Self::from_rules(iter)
    }
}

impl FromIterator<ConditionalPolicyRule> for Policy {
    fn from_iter<I: IntoIterator<Item = ConditionalPolicyRule>>(iter: I) -> Self {
        Self::from_rules(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Effect, Priority};

    fn rule(subject: &str, priority: u32) -> PolicyRule {
        PolicyRule::new(subject, None, "read", Effect::Allow).with_priority(priority)
    }

    #[test]
    fn add_rule_leaves_original_untouched() {
        let p = Policy::new();
        let q = p.add_rule(rule("a", 1));
        assert!(p.is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn priority_sort_is_stable_and_descending() {
        let p = Policy::from_rules(vec![rule("a", 1), rule("b", 9), rule("c", 9), rule("d", 3)]);
        let sorted = p.sorted_by_priority();
        let order: Vec<&str> = sorted.rules().iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(order, ["b", "c", "d", "a"]);
        assert_eq!(sorted.rules()[0].priority, Priority(9));
    }

    #[test]
    fn inherit_prepends_base_rules() {
        let base = Policy::named("base").add_rule(rule("base-rule", 1));
        let derived =
            Policy::named("derived").with_extends("base").add_rule(rule("derived-rule", 1));
        let merged = derived.inherit_from(&base);
        assert_eq!(merged.name.as_deref(), Some("derived"));
        assert_eq!(merged.extends.as_deref(), Some("base"));
        let order: Vec<&str> = merged.rules().iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(order, ["base-rule", "derived-rule"]);
    }
}
