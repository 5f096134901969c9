//! Effect resolution under the deny-override discipline.

use std::cmp::Reverse;
use warden_core::{ConditionalPolicyRule, Effect};

/// Collapse a set of matching rules into one effect.
///
/// No matches is a deny (default-deny). Any matching deny is a deny,
/// regardless of priority — priority orders traversal for observers and
/// short-circuiting, never the outcome. Otherwise allow.
pub fn resolve_effect<'a, I>(matched: I) -> Effect
where
    I: IntoIterator<Item = &'a ConditionalPolicyRule>,
{
    let mut any = false;
    for rule in matched {
        if rule.effect == Effect::Deny {
            return Effect::Deny;
        }
        any = true;
    }
    if any {
        Effect::Allow
    } else {
        Effect::Deny
    }
}

/// Order rules by descending priority, stable with respect to the input
/// order. This is the visit order observers see and short-circuit
/// implementations exploit (the first deny they meet settles the outcome).
pub fn by_priority_desc<'a>(rules: &[&'a ConditionalPolicyRule]) -> Vec<&'a ConditionalPolicyRule> {
    let mut ordered = rules.to_vec();
    ordered.sort_by_key(|rule| Reverse(rule.priority));
    ordered
}
