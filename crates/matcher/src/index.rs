//! Indexed fast-path matching.

use crate::RuleMatcher;
use std::cmp::Reverse;
use std::collections::HashMap;
use warden_core::{Action, ConditionalPolicyRule, Effect, Resource, Subject};

/// Bucket key for rules with no resource target.
const NO_RESOURCE: &str = "\u{0}";

/// Wraps a base matcher with subject/resource/action hash indexes and an
/// optional short-circuit deny fast path.
///
/// Candidate pruning currently uses the subject index (the subject-id bucket
/// unioned with the `"*"` bucket); the resource and action indexes are built
/// for future refinement. Indexing is purely an accelerator — an un-indexed
/// matcher walks every rule and produces identical decisions.
///
/// Re-indexing requires `&mut self` (single writer); queries on a frozen
/// index are concurrent-safe.
pub struct IndexedMatcher<M> {
    base: M,
    short_circuit: bool,
    rules: Vec<ConditionalPolicyRule>,
    by_subject: HashMap<String, Vec<usize>>,
    by_resource: HashMap<String, Vec<usize>>,
    by_action: HashMap<String, Vec<usize>>,
    indexed: bool,
}

impl<M: RuleMatcher> IndexedMatcher<M> {
    /// An empty, un-indexed matcher over `base`.
    pub fn new(base: M) -> Self {
        Self {
            base,
            short_circuit: false,
            rules: Vec::new(),
            by_subject: HashMap::new(),
            by_resource: HashMap::new(),
            by_action: HashMap::new(),
            indexed: false,
        }
    }

    /// Enable or disable the short-circuit deny fast path, consuming and
    /// returning the matcher.
    #[must_use]
    pub fn with_short_circuit(mut self, enabled: bool) -> Self {
        self.short_circuit = enabled;
        self
    }

    /// Replace the rule set without building indexes. Queries fall back to a
    /// full scan until [`IndexedMatcher::index`] runs.
    pub fn set_rules(&mut self, rules: impl Into<Vec<ConditionalPolicyRule>>) {
        self.rules = rules.into();
        self.by_subject.clear();
        self.by_resource.clear();
        self.by_action.clear();
        self.indexed = false;
    }

    /// Build the subject/resource/action indexes over the current rules.
    /// Call again after every rule-set change; stale indexes are never
    /// consulted because `set_rules` clears them.
    pub fn index(&mut self) {
        self.by_subject.clear();
        self.by_resource.clear();
        self.by_action.clear();
        for (i, rule) in self.rules.iter().enumerate() {
            self.by_subject.entry(rule.subject.clone()).or_default().push(i);
            let resource_key = rule.resource.clone().unwrap_or_else(|| NO_RESOURCE.to_owned());
            self.by_resource.entry(resource_key).or_default().push(i);
            self.by_action.entry(rule.action.clone()).or_default().push(i);
        }
        self.indexed = true;
    }

    /// Replace the rule set and index it in one step.
    pub fn index_rules(&mut self, rules: impl Into<Vec<ConditionalPolicyRule>>) {
        self.set_rules(rules);
        self.index();
    }

    /// The candidate rules for `subject`, in declaration order.
    ///
    /// Indexed: the union of the subject-id bucket and the `"*"` bucket.
    /// Un-indexed: every rule.
    pub fn candidate_rules(&self, subject: &Subject) -> Vec<&ConditionalPolicyRule> {
        self.candidate_indexes(subject).into_iter().map(|i| &self.rules[i]).collect()
    }

    fn candidate_indexes(&self, subject: &Subject) -> Vec<usize> {
        if !self.indexed {
            return (0..self.rules.len()).collect();
        }
        let own = self.by_subject.get(&subject.id).map(Vec::as_slice).unwrap_or_default();
        let star = self.by_subject.get("*").map(Vec::as_slice).unwrap_or_default();
        // Both buckets are ascending; merge keeps declaration order.
        let mut merged = Vec::with_capacity(own.len() + star.len());
        let (mut a, mut b) = (0, 0);
        while a < own.len() || b < star.len() {
            match (own.get(a), star.get(b)) {
                (Some(&x), Some(&y)) if x <= y => {
                    merged.push(x);
                    a += 1;
                }
                (Some(_), Some(&y)) => {
                    merged.push(y);
                    b += 1;
                }
                (Some(&x), None) => {
                    merged.push(x);
                    a += 1;
                }
                (None, Some(&y)) => {
                    merged.push(y);
                    b += 1;
                }
                (None, None) => break,
            }
        }
        merged
    }

    /// Candidates that actually match, filtered through the base matcher, in
    /// declaration order.
    pub fn matching_rules(
        &self,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> Vec<&ConditionalPolicyRule> {
        self.candidate_rules(subject)
            .into_iter()
            .filter(|rule| self.base.matches(rule, subject, resource, action))
            .collect()
    }

    /// Match one rule, reporting its effect so callers can fast-exit.
    ///
    /// `Some(Deny)` means a matching deny — with short-circuiting enabled the
    /// caller should stop immediately, since deny-override makes the final
    /// answer `Deny` regardless of the remaining rules.
    pub fn matches_with_short_circuit(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> Option<Effect> {
        self.base.matches(rule, subject, resource, action).then_some(rule.effect)
    }

    /// Decide the request over the current rule set.
    ///
    /// Candidates are visited in descending priority (stable); with
    /// short-circuiting enabled the first matching deny returns immediately.
    /// No matches is a deny, any matching deny is a deny, otherwise allow.
    pub fn decide(&self, subject: &Subject, resource: &Resource, action: &Action) -> Effect {
        let mut candidates = self.candidate_indexes(subject);
        candidates.sort_by_key(|&i| Reverse(self.rules[i].priority));

        let mut matched_any = false;
        let mut denied = false;
        for i in candidates {
            match self.matches_with_short_circuit(&self.rules[i], subject, resource, action) {
                Some(Effect::Deny) => {
                    if self.short_circuit {
                        return Effect::Deny;
                    }
                    matched_any = true;
                    denied = true;
                }
                Some(Effect::Allow) => matched_any = true,
                None => {}
            }
        }
        if !matched_any || denied {
            Effect::Deny
        } else {
            Effect::Allow
        }
    }
}

impl<M: RuleMatcher> RuleMatcher for IndexedMatcher<M> {
    fn matches(
        &self,
        rule: &ConditionalPolicyRule,
        subject: &Subject,
        resource: &Resource,
        action: &Action,
    ) -> bool {
        self.base.matches(rule, subject, resource, action)
    }
}
