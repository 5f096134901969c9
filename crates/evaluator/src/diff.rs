//! Signature-based policy diffing.

use std::collections::HashSet;
use warden_core::{ConditionalPolicyRule, Policy};

/// The difference between two policies, classified by rule signature.
///
/// A rule's signature is `(subject, resource ?? "*", action)`; effect,
/// priority, and domain are not part of identity, so a rule whose effect
/// flipped still counts as unchanged.
#[derive(Debug, Clone)]
pub struct PolicyDiff {
    /// The baseline policy.
    pub old_policy: Policy,
    /// The candidate policy.
    pub new_policy: Policy,
    /// Signatures present only in the new policy.
    pub added: Vec<ConditionalPolicyRule>,
    /// Signatures present only in the old policy.
    pub removed: Vec<ConditionalPolicyRule>,
    /// Signatures present in both (the new policy's copies).
    pub unchanged: Vec<ConditionalPolicyRule>,
}

impl PolicyDiff {
    /// Whether the two policies cover the same signatures.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Number of signature additions plus removals.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

/// Diff two policies in `O(N + M)` by signature.
pub fn compare(old: &Policy, new: &Policy) -> PolicyDiff {
    let old_signatures: HashSet<String> =
        old.rules().iter().map(ConditionalPolicyRule::signature).collect();
    let new_signatures: HashSet<String> =
        new.rules().iter().map(ConditionalPolicyRule::signature).collect();

    let mut added = Vec::new();
    let mut unchanged = Vec::new();
    let mut classified: HashSet<String> = HashSet::new();
    for rule in new.rules() {
        let signature = rule.signature();
        if !classified.insert(signature.clone()) {
            continue;
        }
        if old_signatures.contains(&signature) {
            unchanged.push(rule.clone());
        } else {
            added.push(rule.clone());
        }
    }

    let mut removed = Vec::new();
    let mut seen_removed: HashSet<String> = HashSet::new();
    for rule in old.rules() {
        let signature = rule.signature();
        if !new_signatures.contains(&signature) && seen_removed.insert(signature) {
            removed.push(rule.clone());
        }
    }

    PolicyDiff { old_policy: old.clone(), new_policy: new.clone(), added, removed, unchanged }
}
